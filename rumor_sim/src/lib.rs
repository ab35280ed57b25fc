//! Rumor Spreading Simulation Harness
//!
//! Runs the rumor model from `rumor_core` as reproducible experiments:
//! every scenario (control, liars, truth-tellers, or custom mixes) is run on
//! the same scale-free network from the same initiator, repeated over
//! several trials and averaged.
//!
//! # Determinism
//!
//! All randomness is derived from a single 64-bit seed. Graph growth,
//! initiator choice and each scenario run draw from separate ChaCha8
//! streams, so any run is reproducible from its seed and scenarios do not
//! perturb each other.
//!
//! # Usage
//!
//! ```ignore
//! use rumor_sim::{ExperimentRunner, SimConfig, ScenarioId, ScenarioSpec};
//!
//! let config = SimConfig { seed: 7, trials: 5, ..Default::default() };
//! let specs: Vec<ScenarioSpec> = ScenarioId::all().into_iter().map(Into::into).collect();
//!
//! let result = ExperimentRunner::new(config)?.run(&specs)?;
//! for outcome in &result.outcomes {
//!     println!("{}: {:.3} bits", outcome.scenario.name, outcome.final_mean_entropy());
//! }
//! ```

mod config;
mod context;
mod error;
pub mod exporter;
mod runner;
pub mod scenarios;
pub mod spreading;

pub use config::SimConfig;
pub use context::{SimContext, Stream};
pub use error::SimError;
pub use exporter::{GraphFile, ScenarioSeries, SimExport};
pub use runner::{ExperimentResult, ExperimentRunner, ScenarioOutcome, TrialSummary};
pub use scenarios::{ScenarioId, ScenarioSpec};
pub use spreading::{
    DotDirectory, FrameSink, NoFrames, Population, SpeakPolicy, SpreadMetrics, SpreadingEngine,
};
