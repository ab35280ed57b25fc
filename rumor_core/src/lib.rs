//! Rumor Core - Rumor Spreading with Consistent Actors
//!
//! A rumor made of five independent details travels over a scale-free
//! social network. Every retelling may garble one detail, and nodes that
//! have heard many conflicting versions garble more often. Against this
//! drift stand **consistent actors**: liars who always tell the fully false
//! version and truth-tellers who always tell the true one, and who never
//! listen to anybody.
//!
//! The library provides the model pieces:
//! 1. **Rumors and memory**: 5-bit rumors, bounded FIFO memories, entropy
//! 2. **Topology and trust**: Barabási–Albert graphs, degree-based credibility
//! 3. **Distortion**: entropy-driven bit flips controlled by a conservation factor
//! 4. **Observation**: per-round entropy and opinion-fragmentation statistics,
//!    Graphviz frames

pub mod actor;
pub mod distortion;
pub mod error;
pub mod graph;
pub mod memory;
pub mod render;
pub mod rumor;
pub mod stats;
pub mod trust;

// Re-export key types for convenience
pub use actor::Role;
pub use distortion::{distortion_probability, DistortionModel};
pub use error::ModelError;
pub use graph::{ScaleFreeParams, SocialGraph};
pub use memory::Memory;
pub use render::{fill_color, DotFrame, NodeView};
pub use rumor::{Rumor, RUMOR_BITS, RUMOR_SPACE};
pub use stats::{EntropySummary, OpinionHistogram, RunStatistics};
pub use trust::TrustMatrix;
