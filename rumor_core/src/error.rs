//! Error types for the rumor model.

use thiserror::Error;

/// Errors raised while building or querying the model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Rumor value does not fit in the rumor bit width
    #[error("Invalid rumor: {0}")]
    InvalidRumor(String),

    /// Bit index outside the rumor bit width
    #[error("Invalid bit index {0} (rumors have {1} bits)")]
    InvalidBit(usize, usize),

    /// Graph construction failed (bad parameters, self-loops, etc.)
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    /// Model parameter outside its allowed range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Node index does not exist in the graph
    #[error("Node {0} out of range (graph has {1} nodes)")]
    NodeOutOfRange(usize, usize),
}

impl ModelError {
    /// Creates a graph error.
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::InvalidGraph(msg.into())
    }

    /// Creates a parameter error.
    pub fn parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
