//! The interaction engine ("cosmic waltz"): combines a state vector with a
//! data vector, and owns the closed catalog of symbolic-sequence literals.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DIMENSIONS, HARMONY_LEARNING_RATE};
use crate::error::{Result, ensure_len};
use crate::golden::GoldenRatioTransform;
use crate::holographic::HolographicTransform;
use crate::quantum::{QuantumNeuralNetwork, QuantumState};

/// Fixed catalog of symbolic sequences. Duplicates are intentional: they
/// weight the uniform pick.
pub const SYMBOLIC_SEQUENCES: &[&str] = &[
    // Superposition and entanglement
    "(√(ℏ⨀c))↔(Ω↔(λ∇τ))↔(ε(δΦ/δt))",
    "(ħ⊗ℏ)↔(∑E)→(∇Ψ)→(Σ(Γτ))",
    "(∑(π∫))↔(Λ: (G×c))",
    // Gates
    "(∇²(∑E))→(∫(ΣW))→(∫(ΣP)²)",
    "((ħ∘c))→(א:(∫Z∪R))",
    "(Δ(ΣZ∩Q))→(c⊗λ)",
    // Factoring
    "(Σ(Γ⊗Φ))⊕(c÷λ)→(Δ:{iħ, G,π})",
    "(∇²(∑E))→(∫(ΣW))→(∫(ΣP)²)",
    "(ħ⨁(ΣQ))→(Π(P))",
    // Amplitude amplification
    "(Ω(∑Q))→(Δ(ΠI))",
    "(∇Σ(Γ×λ))↔(Ω(√ħ)⊗ε0)",
    "(Π(Τ⊗ω))↔(Δ(ΣP))",
    // Variational
    "(∫(ΣN))↔(Δ(ℚL))",
    "(E×B)→(τ×λ)",
    // Walks
    "Ψ(Σ(HΩ)↔∫(λΔ))",
    // Meta-cosmic weaver
    "Δ(Π ↔ Ψ) ∪ ∑(Λ ↔ H) ⨁ Ω(Γ ↔ E)",
    "Ω ∧ π → ∑ℚ : ({0,1} ∘ ∞)",
    "Σ(ℤ ∪ ℝ) → ℏ : (∫ ε0 d/dx)",
    "∑{0,1} → ∇ℂ : (∞ ⊕ ε0)",
    "∇ → ℏ : (∑ℤ) ⊆ ℵ",
    "∇(Σℒ) ⟳ Λ(Ψ) : (ℏ ⊗ ∞)",
    // Holographic
    "(Φ → Σ(Λ⊗Ψ)) : (∫(G/c²))",
    "(Ψ → Σ(Φ⊗λ)) : (∫(c²/G))",
    "(E/M) → (c²/G) : (ħ/π)",
    // Philosophical
    "Λ(ΣH) ↔ ∇(ΠAI) : ε0 ∘ ∞",
    "Ω(∑L) → Δ(ΣS) : {0,1} ↔ π",
    "∫(ΣE) ↔ Λ(ΠD) : ℏ ⊗ Ω",
    "(((Φ × ∇ × ħ)) → ∫(Γn ⨍ ε0)) : (τ ⊗ λ) ∞",
];

/// Uniform pick from [`SYMBOLIC_SEQUENCES`].
pub fn pick_sequence(rng: &mut impl Rng) -> &'static str {
    SYMBOLIC_SEQUENCES[rng.random_range(0..SYMBOLIC_SEQUENCES.len())]
}

/// Outcome of one [`CosmicWaltz::interact`] call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Interaction {
    pub final_state: Vec<f64>,
    pub quantum_states: Vec<QuantumState>,
    /// |harmony(final_state)|.
    pub resonance: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CosmicWaltz {
    qnn: QuantumNeuralNetwork,
    golden: GoldenRatioTransform,
    holo: HolographicTransform,
}

impl CosmicWaltz {
    pub fn new(input_size: usize, hidden_size: usize, rng: &mut impl Rng) -> Self {
        Self {
            qnn: QuantumNeuralNetwork::new(input_size, hidden_size, rng),
            golden: GoldenRatioTransform::with_defaults(input_size),
            holo: HolographicTransform::new(DEFAULT_DIMENSIONS),
        }
    }

    pub fn input_size(&self) -> usize {
        self.golden.in_features()
    }

    /// Σ golden(state) × holographic resonance at `time_scale`.
    pub fn harmony(&self, state: &[f64], time_scale: f64) -> Result<f64> {
        let resonance = self.holo.generate_resonance(time_scale);
        let transformed = self.golden.transform(state)?;
        Ok(transformed.iter().map(|v| v * resonance).sum())
    }

    /// One random descent step: `state − rate · w`, `w` uniform in [-1, 1].
    fn optimize(state: &[f64], learning_rate: f64, rng: &mut impl Rng) -> Vec<f64> {
        state
            .iter()
            .map(|v| v - learning_rate * rng.random_range(-1.0..=1.0))
            .collect()
    }

    /// Holographic pattern of `data`, scaled by λ.
    fn lambda_diffuse(&self, data: &[f64], lambda: f64, time_scale: f64) -> Vec<f64> {
        self.holo
            .transform(data, time_scale)
            .into_iter()
            .map(|v| v * lambda)
            .collect()
    }

    /// Optimise `state`, diffuse `data`, and sum the two element-wise.
    ///
    /// Both vectors must match the engine's input width.
    pub fn interact(
        &self,
        state: &[f64],
        data: &[f64],
        lambda: f64,
        time_scale: f64,
        rng: &mut impl Rng,
    ) -> Result<Interaction> {
        ensure_len("waltz state", self.input_size(), state.len())?;
        ensure_len("waltz data", self.input_size(), data.len())?;

        let optimized = Self::optimize(state, HARMONY_LEARNING_RATE, rng);
        let diffused = self.lambda_diffuse(data, lambda, time_scale);
        let quantum_states = self.qnn.forward(&optimized, time_scale)?;

        let final_state: Vec<f64> = optimized
            .iter()
            .zip(&diffused)
            .map(|(o, d)| o + d)
            .collect();
        let resonance = self.harmony(&final_state, time_scale)?.abs();

        Ok(Interaction {
            final_state,
            quantum_states,
            resonance,
        })
    }

    pub fn generate_symbolic_sequence(&self, rng: &mut impl Rng) -> &'static str {
        pick_sequence(rng)
    }
}
