//! Consistent-actor scenarios.

use crate::error::SimError;
use serde::{Deserialize, Serialize};

/// Built-in scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScenarioId {
    /// No consistent actors: free drift of the rumor
    Control,

    /// One liar and one truth-teller compete
    OneEach,

    /// A single liar
    LoneLiar,

    /// A single truth-teller
    LoneTruthTeller,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Control,
            ScenarioId::OneEach,
            ScenarioId::LoneLiar,
            ScenarioId::LoneTruthTeller,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Control => "control",
            ScenarioId::OneEach => "one_each",
            ScenarioId::LoneLiar => "lone_liar",
            ScenarioId::LoneTruthTeller => "lone_truth_teller",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Control => "No consistent actors, the rumor drifts freely",
            ScenarioId::OneEach => "One consistent liar and one consistent truth-teller",
            ScenarioId::LoneLiar => "One consistent liar pushing 11111",
            ScenarioId::LoneTruthTeller => "One consistent truth-teller pushing 00000",
        }
    }

    /// Number of liars placed.
    pub fn liars(&self) -> usize {
        match self {
            ScenarioId::OneEach | ScenarioId::LoneLiar => 1,
            _ => 0,
        }
    }

    /// Number of truth-tellers placed.
    pub fn truth_tellers(&self) -> usize {
        match self {
            ScenarioId::OneEach | ScenarioId::LoneTruthTeller => 1,
            _ => 0,
        }
    }

    /// Parses a scenario list; `all` expands to every scenario.
    pub fn parse_list(s: &str) -> Result<Vec<ScenarioId>, SimError> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }
        s.split(',')
            .map(|part| part.trim().parse())
            .collect()
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "control" | "baseline" => Ok(ScenarioId::Control),
            "one_each" | "oneeach" | "experimental" => Ok(ScenarioId::OneEach),
            "lone_liar" | "loneliar" | "liar" => Ok(ScenarioId::LoneLiar),
            "lone_truth_teller" | "lonetruthteller" | "truth_teller" | "truth" => {
                Ok(ScenarioId::LoneTruthTeller)
            }
            _ => Err(SimError::UnknownScenario(s.to_string())),
        }
    }
}

/// A concrete scenario: how many consistent actors of each kind to place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub name: String,
    pub liars: usize,
    pub truth_tellers: usize,
}

impl ScenarioSpec {
    /// Custom scenario with explicit actor counts.
    pub fn custom(liars: usize, truth_tellers: usize) -> Self {
        Self {
            name: format!("custom_l{}_t{}", liars, truth_tellers),
            liars,
            truth_tellers,
        }
    }

    /// Total consistent actors.
    pub fn consistent_actors(&self) -> usize {
        self.liars + self.truth_tellers
    }

    /// Stable key identifying this scenario's random streams.
    ///
    /// FNV-1a over the name and actor counts, so the key does not depend on
    /// where the scenario sits in a selection or on the toolchain's hasher.
    pub fn stream_key(&self) -> u64 {
        const OFFSET: u64 = 0xcbf29ce484222325;
        const PRIME: u64 = 0x100000001b3;

        self.name
            .bytes()
            .chain([0xff])
            .chain((self.liars as u64).to_le_bytes())
            .chain((self.truth_tellers as u64).to_le_bytes())
            .fold(OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(PRIME))
    }
}

impl From<ScenarioId> for ScenarioSpec {
    fn from(id: ScenarioId) -> Self {
        Self {
            name: id.name().to_string(),
            liars: id.liars(),
            truth_tellers: id.truth_tellers(),
        }
    }
}
