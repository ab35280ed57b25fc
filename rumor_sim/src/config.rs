//! Experiment configuration.

use crate::error::SimError;
use crate::spreading::SpeakPolicy;
use rumor_core::{DistortionModel, ScaleFreeParams, RUMOR_BITS};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for an experiment (one or more trials of every scenario).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Independent trials (fresh graph and initiator each) to average over
    pub trials: usize,

    /// Spreading rounds per run
    pub rounds: usize,

    /// Rumor instances each node remembers (L)
    pub memory_capacity: usize,

    /// Largest possible memory entropy in bits (H_max)
    pub max_entropy: f64,

    /// Conservation factor K: resistance to distortion
    pub conservation: f64,

    /// Confidence factor beta: preference for well-connected sources
    pub confidence: f64,

    /// Scale-free network growth parameters
    pub graph: ScaleFreeParams,

    /// How ordinary nodes pick what to retell
    pub speak_policy: SpeakPolicy,

    /// Export one Graphviz frame per round (first trial only)
    pub frames: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            trials: 1,
            rounds: 200,
            memory_capacity: 320,
            max_entropy: RUMOR_BITS as f64,
            conservation: 1.0,
            confidence: 1.0,
            graph: ScaleFreeParams::default(),
            speak_policy: SpeakPolicy::MostCommon,
            frames: false,
        }
    }
}

impl SimConfig {
    /// Loads a config from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        let config: SimConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Distortion parameters derived from this config.
    pub fn distortion(&self) -> DistortionModel {
        DistortionModel {
            conservation: self.conservation,
            max_entropy: self.max_entropy,
        }
    }

    /// Rejects configurations that cannot run.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.trials == 0 {
            return Err(SimError::config("trials must be at least 1"));
        }
        if self.rounds == 0 {
            return Err(SimError::config("rounds must be at least 1"));
        }
        if self.memory_capacity == 0 {
            return Err(SimError::config("memory capacity must be at least 1"));
        }
        if !(self.confidence.is_finite() && self.confidence >= 0.0) {
            return Err(SimError::config(format!(
                "confidence factor must be >= 0, got {}",
                self.confidence
            )));
        }
        self.distortion().validate()?;
        self.graph.validate()?;
        Ok(())
    }
}
