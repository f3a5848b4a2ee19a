//! Fuzzy inference over normalized [0, 1] inputs.
//!
//! Three fixed rules each pair an antecedent (a t-norm, t-conorm or mean over
//! the fuzzified inputs) with a consequent vector. Consequents are clipped by
//! their antecedent strength, max-aggregated, then defuzzified back into the
//! caller's bounds.

use rand::Rng;

use crate::constants::{DEFAULT_LAMBDA, PHI};
use crate::error::{Result, ensure_len};
use crate::quantum::FeedforwardNetwork;
use crate::waltz::CosmicWaltz;

/// Membership degree in [0, 1].
pub type FuzzyValue = f64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FuzzyRule {
    /// min(inputs) → feed-forward network output.
    Superposition,
    /// max(inputs) → waltz interaction with the complemented inputs.
    Entanglement,
    /// mean(inputs) → (sin(v·φ·π) + 1) / 2 per input.
    QuantumWalk,
}

pub const RULES: [FuzzyRule; 3] = [
    FuzzyRule::Superposition,
    FuzzyRule::Entanglement,
    FuzzyRule::QuantumWalk,
];

impl FuzzyRule {
    pub fn antecedent(&self, inputs: &[FuzzyValue]) -> FuzzyValue {
        match self {
            Self::Superposition => inputs.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Entanglement => inputs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::QuantumWalk => inputs.iter().sum::<f64>() / inputs.len().max(1) as f64,
        }
    }
}

fn unit_clamp(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

#[derive(Clone, Debug)]
pub struct FuzzyEngine {
    width: usize,
    network: FeedforwardNetwork,
    waltz: CosmicWaltz,
}

impl FuzzyEngine {
    /// `width` inputs and outputs; `hidden_size` units in both the
    /// feed-forward network and the waltz.
    pub fn new(width: usize, hidden_size: usize, rng: &mut impl Rng) -> Self {
        Self {
            width,
            network: FeedforwardNetwork::new(width, hidden_size, width, rng),
            waltz: CosmicWaltz::new(width, hidden_size, rng),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Linear membership of `input` in `[min, max]`, clamped. A degenerate
    /// range (`max <= min`) has no members.
    pub fn fuzzify(input: f64, min: f64, max: f64) -> FuzzyValue {
        if max <= min {
            return 0.0;
        }
        unit_clamp((input - min) / (max - min))
    }

    pub fn defuzzify(values: &[FuzzyValue], mins: &[f64], maxes: &[f64]) -> Vec<f64> {
        values
            .iter()
            .zip(mins.iter().zip(maxes))
            .map(|(fv, (min, max))| min + fv * (max - min))
            .collect()
    }

    fn consequent(
        &self,
        rule: FuzzyRule,
        inputs: &[FuzzyValue],
        time_scale: f64,
        rng: &mut impl Rng,
    ) -> Result<Vec<FuzzyValue>> {
        let values = match rule {
            FuzzyRule::Superposition => self.network.forward(inputs, time_scale)?,
            FuzzyRule::Entanglement => {
                let complement: Vec<f64> = inputs.iter().map(|v| 1.0 - v).collect();
                self.waltz
                    .interact(inputs, &complement, DEFAULT_LAMBDA, time_scale, rng)?
                    .final_state
            }
            FuzzyRule::QuantumWalk => inputs
                .iter()
                .map(|v| ((v * PHI * std::f64::consts::PI).sin() + 1.0) / 2.0)
                .collect(),
        };
        Ok(values.into_iter().map(unit_clamp).collect())
    }

    /// Fuzzify → fire every rule → max-aggregate → defuzzify.
    pub fn process(
        &self,
        inputs: &[f64],
        mins: &[f64],
        maxes: &[f64],
        time_scale: f64,
        rng: &mut impl Rng,
    ) -> Result<Vec<f64>> {
        ensure_len("fuzzy inputs", self.width, inputs.len())?;
        ensure_len("fuzzy lower bounds", self.width, mins.len())?;
        ensure_len("fuzzy upper bounds", self.width, maxes.len())?;

        let fuzzy_inputs: Vec<FuzzyValue> = inputs
            .iter()
            .zip(mins.iter().zip(maxes))
            .map(|(x, (min, max))| Self::fuzzify(*x, *min, *max))
            .collect();

        let mut aggregated = vec![0.0_f64; self.width];
        for rule in RULES {
            let strength = rule.antecedent(&fuzzy_inputs);
            let consequent = self.consequent(rule, &fuzzy_inputs, time_scale, rng)?;
            for (slot, v) in aggregated.iter_mut().zip(consequent) {
                *slot = slot.max(v.min(strength));
            }
        }

        Ok(Self::defuzzify(&aggregated, mins, maxes))
    }
}
