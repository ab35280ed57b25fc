//! Node roles.

use crate::rumor::Rumor;
use serde::{Deserialize, Serialize};

/// How a node takes part in spreading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Listens, remembers, distorts and retells
    #[default]
    Ordinary,

    /// Consistent actor that always tells the fully false rumor
    Liar,

    /// Consistent actor that always tells the truth
    TruthTeller,
}

impl Role {
    /// The rumor a consistent actor is fixed to.
    pub fn fixed_rumor(self) -> Option<Rumor> {
        match self {
            Role::Ordinary => None,
            Role::Liar => Some(Rumor::FALSE),
            Role::TruthTeller => Some(Rumor::TRUE),
        }
    }

    /// True for liars and truth-tellers.
    pub fn is_consistent(self) -> bool {
        !matches!(self, Role::Ordinary)
    }

    /// Short node label used in rendered frames.
    pub fn label(self) -> &'static str {
        match self {
            Role::Ordinary => "",
            Role::Liar => "L",
            Role::TruthTeller => "T",
        }
    }
}
