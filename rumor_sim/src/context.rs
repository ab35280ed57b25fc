//! Deterministic randomness for experiments.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Independent random streams within one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Scale-free graph growth
    Graph,

    /// Choice of the node that starts the rumor
    Initiator,

    /// One scenario run (actor placement and spreading), keyed by
    /// [`ScenarioSpec::stream_key`](crate::ScenarioSpec::stream_key)
    Scenario(u64),

    /// Tie-breaking for rendered frames of one scenario
    Render(u64),
}

impl Stream {
    fn id(self) -> u64 {
        match self {
            Stream::Graph => 1,
            Stream::Initiator => 2,
            Stream::Scenario(key) => key.rotate_left(1) ^ 0x1000,
            Stream::Render(key) => key.rotate_left(17) ^ 0x2000,
        }
    }
}

/// Derives every RNG of an experiment from one master seed.
///
/// Streams are independent: adding a scenario or turning frames on does not
/// change the graph, the initiator or any other scenario's run.
#[derive(Debug, Clone, Copy)]
pub struct SimContext {
    seed: u64,
}

impl SimContext {
    /// Creates a context for the given master seed.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Master seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Seed of `stream` in `trial`.
    pub fn derive_seed(&self, trial: usize, stream: Stream) -> u64 {
        let trial_seed = self
            .seed
            .wrapping_add(trial as u64)
            .wrapping_mul(0x9e3779b97f4a7c15);
        trial_seed ^ stream.id().wrapping_mul(0x517cc1b727220a95)
    }

    /// Fresh RNG for `stream` in `trial`.
    pub fn rng(&self, trial: usize, stream: Stream) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.derive_seed(trial, stream))
    }
}
