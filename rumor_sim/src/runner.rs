//! Experiment runner - executes every scenario over one or more trials.
//!
//! Each trial grows a fresh scale-free network and picks one initiator.
//! Every scenario of that trial runs on the same network from the same
//! initiator, so differences between scenarios come from the consistent
//! actors alone. Statistics are averaged over trials.

use crate::config::SimConfig;
use crate::context::{SimContext, Stream};
use crate::error::SimError;
use crate::scenarios::ScenarioSpec;
use crate::spreading::{DotDirectory, FrameSink, NoFrames, Population, SpreadMetrics, SpreadingEngine};

use rand::Rng;
use rumor_core::{EntropySummary, Rumor, RunStatistics, SocialGraph, TrustMatrix};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Final state of one scenario in one trial.
#[derive(Debug, Clone)]
pub struct TrialSummary {
    /// Trial index
    pub trial: usize,

    /// Node that started the rumor
    pub initiator: usize,

    /// Entropy summary of the last round
    pub final_entropy: EntropySummary,

    /// Most widely held opinion after the last round, with its share
    pub dominant_opinion: Option<(Rumor, f64)>,

    /// Counters collected during the run
    pub metrics: SpreadMetrics,
}

/// Averaged results of one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub scenario: ScenarioSpec,

    /// Per-round statistics averaged over trials
    pub averaged: RunStatistics,

    /// One summary per trial
    pub trials: Vec<TrialSummary>,
}

impl ScenarioOutcome {
    /// Mean entropy in the last round, averaged over trials.
    pub fn final_mean_entropy(&self) -> f64 {
        self.averaged.final_entropy().map(|e| e.mean).unwrap_or(0.0)
    }

    /// Dominant opinion of the averaged last-round histogram.
    pub fn dominant_opinion(&self) -> Option<(Rumor, f64)> {
        self.averaged.final_opinions().and_then(|h| h.dominant())
    }
}

/// Results of a full experiment.
#[derive(Debug, Clone)]
pub struct ExperimentResult {
    /// Master seed used
    pub seed: u64,

    /// Number of trials run
    pub trials: usize,

    /// One outcome per scenario, in the order given
    pub outcomes: Vec<ScenarioOutcome>,

    /// Network of the first trial
    pub first_graph: Option<SocialGraph>,
}

impl ExperimentResult {
    /// Looks up an outcome by scenario name.
    pub fn outcome(&self, name: &str) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|o| o.scenario.name == name)
    }
}

/// Runs experiments described by a [`SimConfig`].
pub struct ExperimentRunner {
    config: SimConfig,
    context: SimContext,

    /// Directory receiving frame folders
    output_dir: PathBuf,

    /// Fixed network used for every trial instead of growing new ones
    fixed_graph: Option<SocialGraph>,
}

impl ExperimentRunner {
    /// Creates a runner after validating the config.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let context = SimContext::new(config.seed);
        Ok(Self {
            config,
            context,
            output_dir: PathBuf::from("."),
            fixed_graph: None,
        })
    }

    /// Sets the directory frames are written under.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Runs every trial on `graph` instead of growing a new network.
    pub fn with_graph(mut self, graph: SocialGraph) -> Result<Self, SimError> {
        if graph.node_count() < 2 {
            return Err(SimError::config("a loaded network needs at least 2 nodes"));
        }
        self.fixed_graph = Some(graph);
        Ok(self)
    }

    /// The configuration in use.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Runs all scenarios for all trials.
    pub fn run(&self, scenarios: &[ScenarioSpec]) -> Result<ExperimentResult, SimError> {
        if scenarios.is_empty() {
            return Err(SimError::config("no scenarios selected"));
        }

        let trials = self.config.trials;
        let weight = 1.0 / trials as f64;

        let mut outcomes: Vec<ScenarioOutcome> = scenarios
            .iter()
            .map(|spec| ScenarioOutcome {
                scenario: spec.clone(),
                averaged: RunStatistics::zeroed(self.config.rounds),
                trials: Vec::with_capacity(trials),
            })
            .collect();
        let mut first_graph = None;

        for trial in 0..trials {
            info!("Trial {}/{} (seed={})", trial + 1, trials, self.context.seed());

            let graph = self.network_for(trial)?;
            let trust = TrustMatrix::from_graph(&graph, self.config.confidence)?;
            let initiator = self
                .context
                .rng(trial, Stream::Initiator)
                .gen_range(0..graph.node_count());

            debug!(
                "  network: {} nodes, {} edges | initiator={}",
                graph.node_count(),
                graph.edge_count(),
                initiator
            );

            for outcome in outcomes.iter_mut() {
                let (stats, summary) =
                    self.run_scenario(trial, &outcome.scenario, &graph, &trust, initiator)?;

                outcome.averaged.accumulate(&stats, weight);
                outcome.trials.push(summary);
            }

            if trial == 0 {
                first_graph = Some(graph);
            }
        }

        Ok(ExperimentResult {
            seed: self.context.seed(),
            trials,
            outcomes,
            first_graph,
        })
    }

    /// Network for `trial`: the fixed one if set, otherwise freshly grown.
    fn network_for(&self, trial: usize) -> Result<SocialGraph, SimError> {
        match &self.fixed_graph {
            Some(graph) => Ok(graph.clone()),
            None => {
                let mut rng = self.context.rng(trial, Stream::Graph);
                Ok(SocialGraph::barabasi_albert(&self.config.graph, &mut rng)?)
            }
        }
    }

    fn run_scenario(
        &self,
        trial: usize,
        spec: &ScenarioSpec,
        graph: &SocialGraph,
        trust: &TrustMatrix,
        initiator: usize,
    ) -> Result<(RunStatistics, TrialSummary), SimError> {
        info!(
            "  Scenario: {} (liars={}, truth_tellers={})",
            spec.name, spec.liars, spec.truth_tellers
        );

        let key = spec.stream_key();
        let mut rng = self.context.rng(trial, Stream::Scenario(key));
        let population = Population::place(
            graph.node_count(),
            initiator,
            spec.liars,
            spec.truth_tellers,
            self.config.memory_capacity,
            &mut rng,
        )?;

        let mut engine = SpreadingEngine::new(graph, trust, population, self.config.distortion())?
            .with_policy(self.config.speak_policy)
            .with_render_seed(self.context.derive_seed(trial, Stream::Render(key)));

        let mut sink: Box<dyn FrameSink> = if self.config.frames && trial == 0 {
            let dir = self.output_dir.join(format!("{}_frames", spec.name));
            Box::new(DotDirectory::create(dir, &spec.name)?)
        } else {
            Box::new(NoFrames)
        };

        let stats = engine.run(self.config.rounds, &mut rng, sink.as_mut())?;

        let final_entropy = stats.final_entropy().copied().unwrap_or_default();
        let dominant_opinion = stats.final_opinions().and_then(|h| h.dominant());
        let metrics = engine.metrics();

        match dominant_opinion {
            Some((rumor, share)) => info!(
                "  ✓ {} done: mean H={:.3} bits, dominant opinion {} held by {:.1}%",
                spec.name,
                final_entropy.mean,
                rumor,
                share * 100.0
            ),
            None => warn!("  {} done: nobody holds an opinion", spec.name),
        }
        debug!(
            "  offered={} accepted={} distortions={}",
            metrics.offered, metrics.accepted, metrics.distortions
        );

        Ok((
            stats,
            TrialSummary {
                trial,
                initiator,
                final_entropy,
                dominant_opinion,
                metrics,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::ScenarioId;
    use rumor_core::ScaleFreeParams;

    fn small_config() -> SimConfig {
        SimConfig {
            seed: 42,
            trials: 2,
            rounds: 30,
            memory_capacity: 40,
            graph: ScaleFreeParams { m0: 5, m: 2, growth: 45 },
            ..Default::default()
        }
    }

    fn all_specs() -> Vec<ScenarioSpec> {
        ScenarioId::all().into_iter().map(ScenarioSpec::from).collect()
    }

    #[test]
    fn test_runner_produces_all_scenarios() {
        let runner = ExperimentRunner::new(small_config()).unwrap();
        let result = runner.run(&all_specs()).unwrap();

        assert_eq!(result.trials, 2);
        assert_eq!(result.outcomes.len(), 4);
        for outcome in &result.outcomes {
            assert_eq!(outcome.averaged.rounds(), 30);
            assert_eq!(outcome.trials.len(), 2);
        }
        assert_eq!(result.first_graph.as_ref().unwrap().node_count(), 50);
        assert!(result.outcome("one_each").is_some());
    }

    #[test]
    fn test_scenarios_share_initiator_within_trial() {
        let runner = ExperimentRunner::new(small_config()).unwrap();
        let result = runner.run(&all_specs()).unwrap();

        for trial in 0..2 {
            let initiators: Vec<usize> = result
                .outcomes
                .iter()
                .map(|o| o.trials[trial].initiator)
                .collect();
            assert!(initiators.windows(2).all(|w| w[0] == w[1]));
        }
    }

    #[test]
    fn test_runs_are_reproducible() {
        let specs = all_specs();
        let a = ExperimentRunner::new(small_config()).unwrap().run(&specs).unwrap();
        let b = ExperimentRunner::new(small_config()).unwrap().run(&specs).unwrap();

        for (x, y) in a.outcomes.iter().zip(&b.outcomes) {
            assert_eq!(x.averaged, y.averaged);
        }
    }

    #[test]
    fn test_scenario_result_independent_of_selection() {
        let only_control = vec![ScenarioSpec::from(ScenarioId::Control)];
        let config = small_config();

        let alone = ExperimentRunner::new(config.clone()).unwrap().run(&only_control).unwrap();
        let together = ExperimentRunner::new(config).unwrap().run(&all_specs()).unwrap();

        assert_eq!(
            alone.outcomes[0].averaged,
            together.outcome("control").unwrap().averaged
        );
    }

    #[test]
    fn test_scenario_result_independent_of_position() {
        let config = small_config();
        let alone = ExperimentRunner::new(config.clone())
            .unwrap()
            .run(&[ScenarioSpec::from(ScenarioId::OneEach)])
            .unwrap();
        let after_control = ExperimentRunner::new(config)
            .unwrap()
            .run(&[ScenarioId::Control.into(), ScenarioId::OneEach.into()])
            .unwrap();

        let a = alone.outcome("one_each").unwrap();
        let b = after_control.outcome("one_each").unwrap();
        assert_eq!(a.averaged, b.averaged);
        for (x, y) in a.trials.iter().zip(&b.trials) {
            assert_eq!(x.metrics, y.metrics);
        }
    }

    #[test]
    fn test_frames_do_not_depend_on_position() {
        let base = std::env::temp_dir().join(format!("rumor_runner_pos_{}", std::process::id()));
        let config = SimConfig {
            frames: true,
            rounds: 3,
            ..small_config()
        };

        let first = base.join("alone");
        ExperimentRunner::new(config.clone())
            .unwrap()
            .with_output_dir(&first)
            .run(&[ScenarioSpec::from(ScenarioId::OneEach)])
            .unwrap();
        let second = base.join("together");
        ExperimentRunner::new(config)
            .unwrap()
            .with_output_dir(&second)
            .run(&[ScenarioId::Control.into(), ScenarioId::OneEach.into()])
            .unwrap();

        for round in 0..3 {
            let name = format!("one_each_frames/one_each_{}.dot", round);
            let a = std::fs::read_to_string(first.join(&name)).unwrap();
            let b = std::fs::read_to_string(second.join(&name)).unwrap();
            assert_eq!(a, b);
        }

        std::fs::remove_dir_all(&base).ok();
    }

    #[test]
    fn test_fixed_graph_is_used() {
        let graph = SocialGraph::from_edges(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]).unwrap();
        let runner = ExperimentRunner::new(small_config())
            .unwrap()
            .with_graph(graph.clone())
            .unwrap();

        let result = runner.run(&[ScenarioSpec::from(ScenarioId::OneEach)]).unwrap();
        assert_eq!(result.first_graph, Some(graph));
    }

    #[test]
    fn test_too_many_actors_fails() {
        let graph = SocialGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let runner = ExperimentRunner::new(small_config())
            .unwrap()
            .with_graph(graph)
            .unwrap();

        let err = runner.run(&[ScenarioSpec::custom(2, 1)]).unwrap_err();
        assert!(matches!(err, SimError::TooManyActors { .. }));
    }

    #[test]
    fn test_empty_scenarios_rejected() {
        let runner = ExperimentRunner::new(small_config()).unwrap();
        assert!(runner.run(&[]).is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimConfig { rounds: 0, ..small_config() };
        assert!(ExperimentRunner::new(config).is_err());
    }

    #[test]
    fn test_frames_written_for_first_trial() {
        let dir = std::env::temp_dir().join(format!("rumor_runner_frames_{}", std::process::id()));
        let config = SimConfig {
            frames: true,
            rounds: 4,
            ..small_config()
        };

        let runner = ExperimentRunner::new(config).unwrap().with_output_dir(&dir);
        runner.run(&[ScenarioSpec::from(ScenarioId::Control)]).unwrap();

        let frame_dir = dir.join("control_frames");
        let count = std::fs::read_dir(&frame_dir).unwrap().count();
        assert_eq!(count, 4);
        assert!(frame_dir.join("control_3.dot").exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
