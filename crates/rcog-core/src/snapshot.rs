//! The read-only record handed to presentation-layer consumers.

use serde::{Deserialize, Serialize};

use crate::dna::AgenticDna;
use crate::graph::KnowledgeNode;
use crate::token::FluidToken;

/// Value copy of an orchestrator's state after a step. Never a live view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecursiveState {
    pub iteration: u64,
    pub resonance_level: f64,
    pub symbolic_sequence: String,
    pub cognitive_state: Vec<f64>,
    pub active_tokens: Vec<FluidToken>,
    pub active_dna: Vec<AgenticDna>,
    pub knowledge_nodes: Vec<KnowledgeNode>,
}

impl RecursiveState {
    pub fn emergence(&self) -> EmergenceState {
        EmergenceState::from_level(self.resonance_level)
    }
}

/// Five-bucket label for an emergence scalar, 0.2 wide each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmergenceState {
    Chaos,
    Emergence,
    Coherence,
    Consciousness,
    Transcendence,
}

impl EmergenceState {
    /// Values below 0 land in `Chaos`, values at or above 0.8 in
    /// `Transcendence`. NaN is `Chaos`.
    pub fn from_level(level: f64) -> Self {
        match level {
            l if l >= 0.8 => Self::Transcendence,
            l if l >= 0.6 => Self::Consciousness,
            l if l >= 0.4 => Self::Coherence,
            l if l >= 0.2 => Self::Emergence,
            _ => Self::Chaos,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chaos => "chaos",
            Self::Emergence => "emergence",
            Self::Coherence => "coherence",
            Self::Consciousness => "consciousness",
            Self::Transcendence => "transcendence",
        }
    }
}

impl std::fmt::Display for EmergenceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}
