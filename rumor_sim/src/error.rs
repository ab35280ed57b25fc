//! Error types for the simulation harness.

use rumor_core::ModelError;
use thiserror::Error;

/// Errors that can occur while configuring or running experiments.
#[derive(Debug, Error)]
pub enum SimError {
    /// Model construction or update failed
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Configuration rejected
    #[error("Config error: {0}")]
    Config(String),

    /// More consistent actors requested than the graph can hold
    #[error("Cannot place {requested} consistent actors: only {available} non-initiator nodes")]
    TooManyActors { requested: usize, available: usize },

    /// Scenario name not recognised
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    /// File I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SimError {
    /// Creates a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
