//! JSON export of experiment results and networks.
//!
//! Exports the per-round entropy series and the opinion-fragmentation
//! matrix of every scenario, so they can be plotted outside the simulator.

use crate::config::SimConfig;
use crate::error::SimError;
use crate::runner::{ExperimentResult, ScenarioOutcome};
use rumor_core::{Rumor, SocialGraph};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Share of the population holding one opinion, per round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentationRow {
    pub opinion: Rumor,
    pub shares: Vec<f64>,
}

/// Averaged series of one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSeries {
    /// Scenario name
    pub scenario: String,

    pub liars: usize,
    pub truth_tellers: usize,

    /// Mean node entropy per round (bits)
    pub mean_entropy: Vec<f64>,

    /// Population variance of node entropy per round
    pub variance_entropy: Vec<f64>,

    /// Largest node entropy per round
    pub max_entropy: Vec<f64>,

    /// Smallest node entropy per round
    pub min_entropy: Vec<f64>,

    /// One row per rumor, in numeric order
    pub fragmentation: Vec<FragmentationRow>,

    /// Dominant opinion after the last round
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_dominant: Option<Rumor>,
}

impl ScenarioSeries {
    /// Extracts the series of one scenario outcome.
    pub fn from_outcome(outcome: &ScenarioOutcome) -> Self {
        let stats = &outcome.averaged;
        let fragmentation = Rumor::all()
            .zip(stats.fragmentation_matrix())
            .map(|(opinion, shares)| FragmentationRow { opinion, shares })
            .collect();

        Self {
            scenario: outcome.scenario.name.clone(),
            liars: outcome.scenario.liars,
            truth_tellers: outcome.scenario.truth_tellers,
            mean_entropy: stats.entropy.iter().map(|e| e.mean).collect(),
            variance_entropy: stats.entropy.iter().map(|e| e.variance).collect(),
            max_entropy: stats.entropy.iter().map(|e| e.max).collect(),
            min_entropy: stats.entropy.iter().map(|e| e.min).collect(),
            fragmentation,
            final_dominant: outcome.dominant_opinion().map(|(r, _)| r),
        }
    }
}

/// Complete experiment export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Seed used
    pub seed: u64,

    /// Trials averaged
    pub trials: usize,

    /// Rounds per run
    pub rounds: usize,

    /// Configuration the experiment ran with
    pub config: SimConfig,

    /// One entry per scenario
    pub scenarios: Vec<ScenarioSeries>,
}

impl SimExport {
    /// Builds an export from experiment results.
    pub fn from_result(result: &ExperimentResult, config: &SimConfig) -> Self {
        Self {
            seed: result.seed,
            trials: result.trials,
            rounds: config.rounds,
            config: config.clone(),
            scenarios: result.outcomes.iter().map(ScenarioSeries::from_outcome).collect(),
        }
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Persists networks so experiments can be repeated on the same topology.
pub struct GraphFile;

impl GraphFile {
    /// Writes `graph` as JSON.
    pub fn save(graph: &SocialGraph, path: impl AsRef<Path>) -> Result<(), SimError> {
        let json = graph.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reads a graph written by [`GraphFile::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<SocialGraph, SimError> {
        let json = std::fs::read_to_string(path)?;
        Ok(SocialGraph::from_json(&json)?)
    }
}
