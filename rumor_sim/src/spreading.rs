//! The spreading engine - runs rounds of rumor exchange over a network.
//!
//! One round:
//! 1. Every informed node, in index order, picks a rumor to tell. Ordinary
//!    nodes may distort it first, rewriting their own memory; consistent
//!    actors repeat their fixed rumor.
//! 2. The rumor is offered to every neighbour. Consistent actors refuse it,
//!    ordinary listeners accept it with their trust in the speaker.
//! 3. Accepted rumors are delivered only after everybody has spoken, so a
//!    rumor travels at most one hop per round.
//! 4. Entropy and opinion statistics are recorded.

use crate::error::SimError;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rumor_core::{
    DistortionModel, DotFrame, EntropySummary, Memory, NodeView, OpinionHistogram, Role, Rumor,
    RunStatistics, SocialGraph, TrustMatrix,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// How an ordinary node chooses what to retell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakPolicy {
    /// Always the most common rumor in memory
    #[default]
    MostCommon,

    /// A rumor drawn in proportion to how often it was heard
    Proportional,
}

/// Roles and memories of every node.
#[derive(Debug, Clone)]
pub struct Population {
    roles: Vec<Role>,
    memories: Vec<Memory>,
    initiator: usize,
}

impl Population {
    /// Places consistent actors and the initiator on `node_count` nodes.
    ///
    /// Liars are drawn from all non-initiator nodes, truth-tellers from the
    /// remaining ones. Consistent actors start out holding their fixed
    /// rumor; the initiator starts out holding the truth.
    pub fn place<R: Rng + ?Sized>(
        node_count: usize,
        initiator: usize,
        liars: usize,
        truth_tellers: usize,
        memory_capacity: usize,
        rng: &mut R,
    ) -> Result<Self, SimError> {
        if initiator >= node_count {
            return Err(rumor_core::ModelError::NodeOutOfRange(initiator, node_count).into());
        }

        let available = node_count - 1;
        if liars + truth_tellers > available {
            return Err(SimError::TooManyActors {
                requested: liars + truth_tellers,
                available,
            });
        }

        let mut roles = vec![Role::Ordinary; node_count];

        let candidates: Vec<usize> = (0..node_count).filter(|&i| i != initiator).collect();
        for pick in index::sample(rng, candidates.len(), liars) {
            roles[candidates[pick]] = Role::Liar;
        }

        let candidates: Vec<usize> = (0..node_count)
            .filter(|&i| i != initiator && roles[i] == Role::Ordinary)
            .collect();
        for pick in index::sample(rng, candidates.len(), truth_tellers) {
            roles[candidates[pick]] = Role::TruthTeller;
        }

        let mut memories = vec![Memory::new(memory_capacity); node_count];
        for (memory, role) in memories.iter_mut().zip(&roles) {
            if let Some(fixed) = role.fixed_rumor() {
                memory.seed(fixed);
            }
        }
        memories[initiator].seed(Rumor::TRUE);

        Ok(Self {
            roles,
            memories,
            initiator,
        })
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// True if there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// The node that started the rumor.
    pub fn initiator(&self) -> usize {
        self.initiator
    }

    /// Role of a node.
    pub fn role(&self, node: usize) -> Role {
        self.roles.get(node).copied().unwrap_or_default()
    }

    /// Memory of a node.
    pub fn memory(&self, node: usize) -> Option<&Memory> {
        self.memories.get(node)
    }

    /// Nodes holding `role`.
    pub fn nodes_with(&self, role: Role) -> Vec<usize> {
        (0..self.roles.len()).filter(|&i| self.roles[i] == role).collect()
    }

    /// Number of nodes that have heard anything.
    pub fn informed(&self) -> usize {
        self.memories.iter().filter(|m| !m.is_empty()).count()
    }
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadMetrics {
    /// Rumors offered to ordinary listeners
    pub offered: u64,

    /// Offers that were believed and delivered
    pub accepted: u64,

    /// Retellings that flipped a bit
    pub distortions: u64,
}

/// Outcome of a single round.
#[derive(Debug, Clone)]
pub struct RoundRecord {
    pub round: usize,
    pub entropy: EntropySummary,
    pub opinions: OpinionHistogram,
}

/// Receives a rendered frame before each round.
pub trait FrameSink {
    /// Whether frames should be captured at all.
    fn enabled(&self) -> bool {
        true
    }

    /// Handles one frame.
    fn on_frame(&mut self, frame: &DotFrame) -> Result<(), SimError>;
}

/// Discards frames.
pub struct NoFrames;

impl FrameSink for NoFrames {
    fn enabled(&self) -> bool {
        false
    }

    fn on_frame(&mut self, _frame: &DotFrame) -> Result<(), SimError> {
        Ok(())
    }
}

/// Writes each frame as `<dir>/<prefix>_<round>.dot`.
pub struct DotDirectory {
    dir: PathBuf,
    prefix: String,
    written: usize,
}

impl DotDirectory {
    /// Creates the target directory if needed.
    pub fn create(dir: impl Into<PathBuf>, prefix: &str) -> Result<Self, SimError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            prefix: prefix.to_string(),
            written: 0,
        })
    }

    /// Number of frames written so far.
    pub fn written(&self) -> usize {
        self.written
    }
}

impl FrameSink for DotDirectory {
    fn on_frame(&mut self, frame: &DotFrame) -> Result<(), SimError> {
        let path = self.dir.join(format!("{}_{}.dot", self.prefix, frame.round));
        std::fs::write(path, frame.to_dot())?;
        self.written += 1;
        Ok(())
    }
}

/// Runs the spreading process on one population.
pub struct SpreadingEngine<'a> {
    graph: &'a SocialGraph,
    trust: &'a TrustMatrix,
    distortion: DistortionModel,
    policy: SpeakPolicy,
    population: Population,

    /// Last computed memory entropy per node
    entropy: Vec<f64>,

    /// Rounds completed
    round: usize,

    /// Tie-breaking for frames, kept apart from the spreading stream
    render_rng: ChaCha8Rng,

    metrics: SpreadMetrics,
}

impl<'a> SpreadingEngine<'a> {
    /// Creates an engine. The trust matrix must belong to `graph`.
    pub fn new(
        graph: &'a SocialGraph,
        trust: &'a TrustMatrix,
        population: Population,
        distortion: DistortionModel,
    ) -> Result<Self, SimError> {
        let n = graph.node_count();
        if trust.node_count() != n || population.len() != n {
            return Err(SimError::config(format!(
                "size mismatch: graph has {} nodes, trust matrix {}, population {}",
                n,
                trust.node_count(),
                population.len()
            )));
        }
        distortion.validate()?;

        Ok(Self {
            graph,
            trust,
            distortion,
            policy: SpeakPolicy::MostCommon,
            population,
            entropy: vec![0.0; n],
            round: 0,
            render_rng: ChaCha8Rng::seed_from_u64(0),
            metrics: SpreadMetrics::default(),
        })
    }

    /// Sets the speak policy for ordinary nodes.
    pub fn with_policy(mut self, policy: SpeakPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Seeds the RNG used to resolve opinion ties in rendered frames.
    pub fn with_render_seed(mut self, seed: u64) -> Self {
        self.render_rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    /// Current population state.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Rounds completed so far.
    pub fn round(&self) -> usize {
        self.round
    }

    /// Counters accumulated so far.
    pub fn metrics(&self) -> SpreadMetrics {
        self.metrics
    }

    /// Last computed entropy of every node.
    pub fn entropies(&self) -> &[f64] {
        &self.entropy
    }

    /// Advances the simulation by one round.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<RoundRecord, SimError> {
        let n = self.graph.node_count();
        let mut inbox: Vec<Vec<Rumor>> = vec![Vec::new(); n];

        for speaker in 0..n {
            let Some(rumor) = self.choose_and_distort(speaker, rng)? else {
                continue;
            };

            for &listener in self.graph.neighbors(speaker) {
                if self.population.roles[listener].is_consistent() {
                    continue;
                }

                self.metrics.offered += 1;
                let p = self.trust.eta(listener, speaker).clamp(0.0, 1.0);
                if rng.gen_bool(p) {
                    inbox[listener].push(rumor);
                    self.metrics.accepted += 1;
                }
            }
        }

        for (memory, heard) in self.population.memories.iter_mut().zip(inbox) {
            for rumor in heard {
                memory.hear(rumor);
            }
        }

        let entropy = EntropySummary::from_values(&self.entropy);
        let opinions = OpinionHistogram::from_opinions(
            self.population
                .memories
                .iter()
                .filter_map(|m| m.most_common(&mut *rng))
                .collect::<Vec<_>>(),
            n,
        );

        let record = RoundRecord {
            round: self.round,
            entropy,
            opinions,
        };
        self.round += 1;
        Ok(record)
    }

    /// Picks what `speaker` says this round, distorting it if it is ordinary.
    ///
    /// Returns `None` for nodes that have not heard anything.
    fn choose_and_distort<R: Rng + ?Sized>(
        &mut self,
        speaker: usize,
        rng: &mut R,
    ) -> Result<Option<Rumor>, SimError> {
        let memory = &mut self.population.memories[speaker];
        if memory.is_empty() {
            return Ok(None);
        }

        if self.population.roles[speaker].is_consistent() {
            return Ok(memory.most_common(rng));
        }

        let chosen = match self.policy {
            SpeakPolicy::MostCommon => memory.most_common(rng),
            SpeakPolicy::Proportional => memory.sample_proportional(rng),
        };
        let Some(rumor) = chosen else {
            return Ok(None);
        };

        let h = memory.entropy();
        self.entropy[speaker] = h;

        match self.distortion.maybe_distort(rumor, h, rng)? {
            Some(distorted) => {
                memory.replace_oldest(rumor, distorted);
                self.metrics.distortions += 1;
                Ok(Some(distorted))
            }
            None => Ok(Some(rumor)),
        }
    }

    /// Renders the current state of every node.
    pub fn capture_frame(&mut self) -> DotFrame {
        let nodes = self
            .population
            .roles
            .iter()
            .zip(&self.population.memories)
            .map(|(&role, memory)| NodeView {
                role,
                opinion: memory.most_common(&mut self.render_rng),
            })
            .collect();

        DotFrame::capture(self.round, self.graph, nodes)
    }

    /// Runs `rounds` rounds, handing a frame to `sink` before each one.
    pub fn run<R, S>(
        &mut self,
        rounds: usize,
        rng: &mut R,
        sink: &mut S,
    ) -> Result<RunStatistics, SimError>
    where
        R: Rng + ?Sized,
        S: FrameSink + ?Sized,
    {
        let mut stats = RunStatistics::with_rounds(rounds);

        for _ in 0..rounds {
            if sink.enabled() {
                let frame = self.capture_frame();
                sink.on_frame(&frame)?;
            }

            let record = self.step(rng)?;

            if record.round % 25 == 0 {
                debug!(
                    "  round {:>4} | informed={} | mean H={:.3} | max H={:.3}",
                    record.round,
                    self.population.informed(),
                    record.entropy.mean,
                    record.entropy.max
                );
            }

            stats.record(record.entropy, record.opinions);
        }

        Ok(stats)
    }
}
