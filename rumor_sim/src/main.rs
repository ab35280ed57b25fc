//! Rumor spreading simulator CLI
//!
//! Runs consistent-actor scenarios on scale-free networks and reports how
//! entropy and opinions evolve.

use anyhow::{Context, Result};
use clap::Parser;
use rumor_core::SocialGraph;
use rumor_sim::{
    ExperimentRunner, GraphFile, ScenarioId, ScenarioSpec, SimConfig, SimExport, SpeakPolicy,
};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Rumor spreading with consistent actors
#[derive(Parser, Debug)]
#[command(name = "rumor-sim")]
#[command(about = "Simulate rumor spreading with liars and truth-tellers on scale-free networks", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Independent trials to average over
    #[arg(short, long)]
    trials: Option<usize>,

    /// Spreading rounds per run
    #[arg(short, long)]
    rounds: Option<usize>,

    /// Scenarios to run, comma separated (control, one_each, lone_liar, lone_truth_teller, all)
    #[arg(short = 'S', long, default_value = "control,one_each")]
    scenario: String,

    /// Liars in an additional custom scenario
    #[arg(long)]
    liars: Option<usize>,

    /// Truth-tellers in an additional custom scenario
    #[arg(long)]
    truth_tellers: Option<usize>,

    /// Nodes added to the seed network by preferential attachment
    #[arg(long)]
    nodes_added: Option<usize>,

    /// Rumor instances each node remembers
    #[arg(long)]
    capacity: Option<usize>,

    /// Conservation factor K (resistance to distortion)
    #[arg(long)]
    conservation: Option<f64>,

    /// Confidence factor beta (trust in well-connected sources)
    #[arg(long)]
    confidence: Option<f64>,

    /// Retell a rumor drawn in proportion to memory instead of the most common one
    #[arg(long)]
    proportional: bool,

    /// Write one Graphviz frame per round (first trial)
    #[arg(long)]
    frames: bool,

    /// Directory for frame folders
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// JSON config file (flags override its values)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Export averaged series to a JSON file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Save the first trial's network to a JSON file
    #[arg(long)]
    save_graph: Option<PathBuf>,

    /// Run every trial on a network loaded from a JSON file
    #[arg(long)]
    load_graph: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON summary on stdout for scripting
    #[arg(long)]
    json: bool,
}

impl Args {
    /// Builds the effective config: file (or defaults), then flag overrides.
    fn to_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => SimConfig::default(),
        };

        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(trials) = self.trials {
            config.trials = trials;
        }
        if let Some(rounds) = self.rounds {
            config.rounds = rounds;
        }
        if let Some(growth) = self.nodes_added {
            config.graph.growth = growth;
        }
        if let Some(capacity) = self.capacity {
            config.memory_capacity = capacity;
        }
        if let Some(k) = self.conservation {
            config.conservation = k;
        }
        if let Some(beta) = self.confidence {
            config.confidence = beta;
        }
        if self.proportional {
            config.speak_policy = SpeakPolicy::Proportional;
        }
        if self.frames {
            config.frames = true;
        }

        if config.seed == 0 {
            config.seed = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .context("system clock before 1970")?
                .as_nanos() as u64;
        }

        Ok(config)
    }

    fn scenarios(&self) -> Result<Vec<ScenarioSpec>> {
        let mut specs: Vec<ScenarioSpec> = ScenarioId::parse_list(&self.scenario)
            .context("Available scenarios: control, one_each, lone_liar, lone_truth_teller, all")?
            .into_iter()
            .map(ScenarioSpec::from)
            .collect();

        if self.liars.is_some() || self.truth_tellers.is_some() {
            specs.push(ScenarioSpec::custom(
                self.liars.unwrap_or(0),
                self.truth_tellers.unwrap_or(0),
            ));
        }

        Ok(specs)
    }
}

/// Nodes the experiment runs on: the loaded network's, else the grown one's.
fn network_size(config: &SimConfig, loaded: Option<&SocialGraph>) -> usize {
    loaded.map_or(config.graph.node_count(), SocialGraph::node_count)
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging (stderr, so --json output stays clean)
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let config = args.to_config()?;
    let scenarios = args.scenarios()?;

    let loaded = match &args.load_graph {
        Some(path) => Some(
            GraphFile::load(path)
                .with_context(|| format!("failed to load network {}", path.display()))?,
        ),
        None => None,
    };
    let nodes = network_size(&config, loaded.as_ref());

    if !args.json {
        info!("Rumor Spreading Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        info!(
            "seed={} trials={} rounds={} nodes={} L={} K={} beta={}",
            config.seed,
            config.trials,
            config.rounds,
            nodes,
            config.memory_capacity,
            config.conservation,
            config.confidence
        );
    }

    let mut runner = ExperimentRunner::new(config.clone())
        .context("invalid configuration")?
        .with_output_dir(&args.out);

    if let (Some(graph), Some(path)) = (loaded, &args.load_graph) {
        info!("Loaded network with {} nodes from {}", graph.node_count(), path.display());
        runner = runner.with_graph(graph)?;
    }

    let result = match runner.run(&scenarios) {
        Ok(result) => result,
        Err(e) => {
            error!("✗ Experiment failed: {}", e);
            return Err(e.into());
        }
    };

    if let Some(path) = &args.save_graph {
        match &result.first_graph {
            Some(graph) => {
                GraphFile::save(graph, path)
                    .with_context(|| format!("failed to save network {}", path.display()))?;
                info!("Saved network to {}", path.display());
            }
            None => warn!("No network to save"),
        }
    }

    if let Some(path) = &args.export {
        SimExport::from_result(&result, &config)
            .write_to_file(path)
            .with_context(|| format!("failed to write export {}", path.display()))?;
        info!("Exported {} scenarios to {}", result.outcomes.len(), path.display());
    }

    if args.json {
        let summary = serde_json::json!({
            "seed": result.seed,
            "trials": result.trials,
            "rounds": config.rounds,
            "scenarios": result.outcomes.iter().map(|o| {
                let final_entropy = o.averaged.final_entropy().copied().unwrap_or_default();
                let dominant = o.dominant_opinion();
                serde_json::json!({
                    "scenario": o.scenario.name,
                    "liars": o.scenario.liars,
                    "truth_tellers": o.scenario.truth_tellers,
                    "final_mean_entropy": final_entropy.mean,
                    "final_entropy_std": final_entropy.std_dev(),
                    "final_max_entropy": final_entropy.max,
                    "dominant_opinion": dominant.map(|(r, _)| r.to_string()),
                    "dominant_share": dominant.map(|(_, s)| s),
                })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        for outcome in &result.outcomes {
            match outcome.dominant_opinion() {
                Some((rumor, share)) => info!(
                    "{:<20} mean H={:.3} bits | dominant {} ({:.1}% of nodes)",
                    outcome.scenario.name,
                    outcome.final_mean_entropy(),
                    rumor,
                    share * 100.0
                ),
                None => info!(
                    "{:<20} mean H={:.3} bits | no opinions formed",
                    outcome.scenario.name,
                    outcome.final_mean_entropy()
                ),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_size_prefers_loaded_graph() {
        let config = SimConfig::default();
        assert_eq!(network_size(&config, None), 300);

        let graph = SocialGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        assert_eq!(network_size(&config, Some(&graph)), 4);
    }

    #[test]
    fn test_custom_scenario_appended() {
        let args = Args::parse_from(["rumor-sim", "-S", "control", "--liars", "2"]);
        let names: Vec<String> = args.scenarios().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["control", "custom_l2_t0"]);
    }
}
