//! Challenge catalog and resonance scoring for symbolic input/output pairs.
//!
//! "Training" here assigns a resonance to a pair from the holographic phase at
//! `time_scale`; no weights are learned and the pair's text is never read.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DIMENSIONS, DEFAULT_GROWTH_FACTOR, PHI};
use crate::error::Result;
use crate::golden::{GoldenRatioTransform, SymbolicMode};
use crate::holographic::HolographicTransform;

/// Closed catalog of `(input, output)` challenges.
pub const CHALLENGES: [(&str, &str); 3] = [
    (
        "(∇·∇)(iħ) ⊕ (E × B) → (τ ⊗ λ)",
        "Integration of quantum field dynamics with temporal-spatial harmonics",
    ),
    (
        "Λ(ΣH) ↔ ∇(ΠAI) : ε0 ∘ ∞",
        "Bidirectional mapping between human consciousness and artificial intelligence patterns",
    ),
    (
        "Ω(∑L) → Δ(ΣS) : {0,1} ↔ π",
        "Transformation of logical structures into quantum-symbolic representations",
    ),
];

/// Width of the seed vector `r·[1, φ, π, e]` fed to the golden transform.
const SEED_WIDTH: usize = 4;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingSequence {
    pub input: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resonance: Option<f64>,
}

impl TrainingSequence {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            resonance: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SequenceTrainer {
    golden: GoldenRatioTransform,
    holo: HolographicTransform,
    sequences: Vec<TrainingSequence>,
}

impl Default for SequenceTrainer {
    fn default() -> Self {
        Self::new(SymbolicMode::default())
    }
}

impl SequenceTrainer {
    pub fn new(mode: SymbolicMode) -> Self {
        Self {
            golden: GoldenRatioTransform::new(SEED_WIDTH, DEFAULT_GROWTH_FACTOR, mode),
            holo: HolographicTransform::new(DEFAULT_DIMENSIONS),
            sequences: Vec::new(),
        }
    }

    pub fn add_sequence(&mut self, sequence: TrainingSequence) {
        self.sequences.push(sequence);
    }

    pub fn sequences(&self) -> &[TrainingSequence] {
        &self.sequences
    }

    /// Uniform pick from [`CHALLENGES`].
    pub fn generate_challenge(&self, rng: &mut impl Rng) -> TrainingSequence {
        let (input, output) = CHALLENGES[rng.random_range(0..CHALLENGES.len())];
        TrainingSequence::new(input, output)
    }

    /// Copy of `sequence` carrying the first golden output of the phase
    /// pattern at `time_scale`. Signed: it follows the phase through zero.
    pub fn train_on_sequence(
        &self,
        sequence: &TrainingSequence,
        time_scale: f64,
    ) -> Result<TrainingSequence> {
        let r = self.holo.generate_resonance(time_scale);
        let seed = [r, r * PHI, r * std::f64::consts::PI, r * std::f64::consts::E];
        let transformed = self.golden.transform(&seed)?;
        Ok(TrainingSequence {
            resonance: transformed.first().copied(),
            ..sequence.clone()
        })
    }

    /// `|holo(t)|`. Independent of the sequence's content.
    pub fn evaluate(&self, time_scale: f64) -> f64 {
        self.holo.generate_resonance(time_scale).abs()
    }
}
