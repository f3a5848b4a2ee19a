//! Fluid tokens: minted units pairing a resonance scalar, a symbolic
//! sequence and a cognitive-state vector.
//!
//! Tokens are never deleted. Resonance is not clamped: evolution multiplies
//! it by a phase in [-1, 1] (sign stripped) and transfers move it freely.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DIMENSIONS, DEFAULT_GROWTH_FACTOR, PHI};
use crate::error::{EngineError, Result};
use crate::golden::{GoldenRatioTransform, SymbolicMode};
use crate::holographic::HolographicTransform;
use crate::id;

/// Width of the vector a token's cognitive state is grown from:
/// `[resonance, φ, π, e]`.
pub const SEED_WIDTH: usize = 4;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FluidToken {
    pub id: String,
    pub resonance: f64,
    pub symbolic_sequence: String,
    pub cognitive_state: Vec<f64>,
}

#[derive(Clone, Debug)]
pub struct TokenRegistry {
    tokens: Vec<FluidToken>,
    index: HashMap<String, usize>,
    /// `[r, φ, π, e]` → cognitive state.
    mint_transform: GoldenRatioTransform,
    /// Cognitive state → cognitive state, same width.
    evolve_transform: GoldenRatioTransform,
    holo: HolographicTransform,
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_GROWTH_FACTOR, SymbolicMode::default(), DEFAULT_DIMENSIONS)
    }
}

impl TokenRegistry {
    pub fn new(growth_factor: f64, mode: SymbolicMode, holographic_dimensions: usize) -> Self {
        let mint_transform = GoldenRatioTransform::new(SEED_WIDTH, growth_factor, mode);
        let state_width = mint_transform.out_features();
        Self {
            tokens: Vec::new(),
            index: HashMap::new(),
            evolve_transform: GoldenRatioTransform::new(state_width, 1.0, mode),
            mint_transform,
            holo: HolographicTransform::new(holographic_dimensions),
        }
    }

    /// Width of every token's cognitive state.
    pub fn state_width(&self) -> usize {
        self.mint_transform.out_features()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FluidToken> {
        self.index.get(id).map(|&i| &self.tokens[i])
    }

    pub fn tokens(&self) -> &[FluidToken] {
        &self.tokens
    }

    fn slot(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| EngineError::not_found("token", id))
    }

    /// Mint a token for `symbolic_sequence` at `time_scale`.
    pub fn mint(
        &mut self,
        symbolic_sequence: &str,
        time_scale: f64,
        rng: &mut impl Rng,
    ) -> Result<&FluidToken> {
        let phase = self.holo.generate_resonance(time_scale);
        let seed = [phase, PHI, std::f64::consts::PI, std::f64::consts::E];
        let cognitive_state = self.mint_transform.transform(&seed)?;

        let token = FluidToken {
            id: id::generate("fluid", rng),
            resonance: phase.abs(),
            symbolic_sequence: symbolic_sequence.to_string(),
            cognitive_state,
        };
        let slot = self.tokens.len();
        self.index.insert(token.id.clone(), slot);
        self.tokens.push(token);
        Ok(&self.tokens[slot])
    }

    /// `resonance ← |holo(t) · resonance|`, `state ← golden(state)`.
    ///
    /// The token is left untouched if its state cannot be transformed.
    pub fn evolve(&mut self, id: &str, time_scale: f64) -> Result<&FluidToken> {
        let slot = self.slot(id)?;
        let phase = self.holo.generate_resonance(time_scale);
        let next_state = self
            .evolve_transform
            .transform(&self.tokens[slot].cognitive_state)?;

        let token = &mut self.tokens[slot];
        token.resonance = (phase * token.resonance).abs();
        token.cognitive_state = next_state;
        Ok(token)
    }

    /// Move `amount` of resonance from one token to another.
    ///
    /// All-or-nothing: on any error neither token changes. Transferring to
    /// self succeeds without effect once the balance check passes.
    pub fn transfer(&mut self, from_id: &str, to_id: &str, amount: f64) -> Result<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(EngineError::InvalidAmount(amount));
        }
        let from = self.slot(from_id)?;
        let to = self.slot(to_id)?;

        let available = self.tokens[from].resonance;
        if available < amount {
            return Err(EngineError::InsufficientResonance {
                available,
                requested: amount,
            });
        }
        if from == to {
            return Ok(());
        }

        self.tokens[from].resonance -= amount;
        self.tokens[to].resonance += amount;
        Ok(())
    }
}
