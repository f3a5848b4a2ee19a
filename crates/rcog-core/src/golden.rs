use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_GROWTH_FACTOR, PHI};
use crate::error::{EngineError, Result, ensure_len};

/// Nonlinear post-transform applied to every output of a [`GoldenRatioTransform`].
///
/// Each mode is named after the symbolic sequence it was derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SymbolicMode {
    /// `∑ → ∞`: convergent-series squashing, v / (1 + |v|).
    Convergent,
    /// `√(Ω ⊕ ε₀)`: φ-scaled exponential stabilization, v·φ·(1 − e^(−|v|)).
    #[default]
    Stabilized,
    /// `Φ ⊗ H`: harmonic oscillation, v·sin(v·φ).
    Harmonic,
    /// Any other sequence: pass-through.
    Identity,
}

impl SymbolicMode {
    pub fn sequence(&self) -> &'static str {
        match self {
            Self::Convergent => "∑ → ∞",
            Self::Stabilized => "√(Ω ⊕ ε₀)",
            Self::Harmonic => "Φ ⊗ H",
            Self::Identity => "Ψ ∇ Φ",
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Self::Convergent => value / (1.0 + value.abs()),
            Self::Stabilized => value * PHI * (1.0 - (-value.abs()).exp()),
            Self::Harmonic => value * (value * PHI).sin(),
            Self::Identity => value,
        }
    }
}

/// Harmonic weight for output row `i`, input column `j`.
fn harmonic_weight(i: usize, j: usize) -> f64 {
    let (i, j) = (i as f64, j as f64);
    ((i + j) * PHI).sin() * (i * PHI + j).cos() / 2.0
}

/// Linear map from `n` inputs to `⌊n·g⌋` outputs with golden-ratio harmonic
/// weights, followed by a fixed [`SymbolicMode`] nonlinearity.
///
/// Construction is fully deterministic: the same `(n, g, mode)` always yields
/// the same weights.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GoldenRatioTransform {
    in_features: usize,
    growth_factor: f64,
    mode: SymbolicMode,
    weights: Vec<Vec<f64>>,
}

impl GoldenRatioTransform {
    pub fn new(in_features: usize, growth_factor: f64, mode: SymbolicMode) -> Self {
        let out_features = (in_features as f64 * growth_factor).floor().max(0.0) as usize;
        let weights = (0..out_features)
            .map(|i| (0..in_features).map(|j| harmonic_weight(i, j)).collect())
            .collect();
        Self {
            in_features,
            growth_factor,
            mode,
            weights,
        }
    }

    /// `n` inputs, growth 1.618, stabilized mode.
    pub fn with_defaults(in_features: usize) -> Self {
        Self::new(in_features, DEFAULT_GROWTH_FACTOR, SymbolicMode::default())
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.weights.len()
    }

    pub fn growth_factor(&self) -> f64 {
        self.growth_factor
    }

    pub fn mode(&self) -> SymbolicMode {
        self.mode
    }

    pub fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    /// Matrix-vector product scaled by the growth factor, then the symbolic
    /// post-transform.
    pub fn transform(&self, input: &[f64]) -> Result<Vec<f64>> {
        ensure_len("golden transform", self.in_features, input.len())?;
        Ok(self
            .weights
            .iter()
            .map(|row| {
                let sum: f64 = row.iter().zip(input).map(|(w, x)| w * x).sum();
                self.mode.apply(sum * self.growth_factor)
            })
            .collect())
    }

    /// Harmonic gradient step: `w -= mode(rate · sin(φ) · grad)`.
    ///
    /// `gradient` must be `out_features × in_features`.
    pub fn update_weights(&mut self, learning_rate: f64, gradient: &[Vec<f64>]) -> Result<()> {
        ensure_len("golden gradient rows", self.out_features(), gradient.len())?;
        if let Some(row) = gradient.iter().find(|r| r.len() != self.in_features) {
            return Err(EngineError::shape(
                "golden gradient columns",
                self.in_features,
                row.len(),
            ));
        }

        let harmonic_rate = learning_rate * PHI.sin();
        for (row, grad_row) in self.weights.iter_mut().zip(gradient) {
            for (w, g) in row.iter_mut().zip(grad_row) {
                *w -= self.mode.apply(harmonic_rate * g);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_output_width_is_floor_of_growth() {
        assert_eq!(GoldenRatioTransform::with_defaults(4).out_features(), 6);
        assert_eq!(GoldenRatioTransform::with_defaults(6).out_features(), 9);
        assert_eq!(
            GoldenRatioTransform::new(6, 1.0, SymbolicMode::Identity).out_features(),
            6
        );
    }

    #[test]
    fn test_harmonic_weight_formula() {
        let t = GoldenRatioTransform::with_defaults(4);
        let w = t.weights();
        assert_eq!(w[0][0], 0.0);
        let expected = (3.0 * PHI).sin() * (2.0 * PHI + 1.0).cos() / 2.0;
        assert_relative_eq!(w[2][1], expected, epsilon = 1e-15);
    }

    #[test]
    fn test_identity_mode_is_scaled_product() {
        let t = GoldenRatioTransform::new(2, 1.5, SymbolicMode::Identity);
        let input = [1.0, 2.0];
        let out = t.transform(&input).unwrap();
        assert_eq!(out.len(), 3);
        for (i, row) in t.weights().iter().enumerate() {
            let expected = (row[0] * 1.0 + row[1] * 2.0) * 1.5;
            assert_relative_eq!(out[i], expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_symbolic_modes() {
        assert_relative_eq!(SymbolicMode::Convergent.apply(1.0), 0.5);
        assert_relative_eq!(SymbolicMode::Convergent.apply(-3.0), -0.75);
        assert_eq!(SymbolicMode::Stabilized.apply(0.0), 0.0);
        assert_relative_eq!(
            SymbolicMode::Stabilized.apply(1.0),
            PHI * (1.0 - (-1.0f64).exp())
        );
        assert_relative_eq!(SymbolicMode::Harmonic.apply(2.0), 2.0 * (2.0 * PHI).sin());
        assert_eq!(SymbolicMode::Identity.apply(-7.25), -7.25);
    }

    #[test]
    fn test_shape_mismatch_never_truncates() {
        let t = GoldenRatioTransform::with_defaults(4);
        let err = t.transform(&[1.0; 6]).unwrap_err();
        assert_eq!(
            err,
            EngineError::ShapeMismatch {
                context: "golden transform",
                expected: 4,
                actual: 6,
            }
        );
        assert!(t.transform(&[1.0; 3]).is_err());
    }

    #[test]
    fn test_update_weights_moves_against_gradient() {
        let mut t = GoldenRatioTransform::new(2, 1.0, SymbolicMode::Identity);
        let before = t.weights().to_vec();
        let grad = vec![vec![1.0, 0.0], vec![0.0, -1.0]];
        t.update_weights(0.1, &grad).unwrap();
        let step = 0.1 * PHI.sin();
        assert_relative_eq!(t.weights()[0][0], before[0][0] - step, epsilon = 1e-15);
        assert_relative_eq!(t.weights()[0][1], before[0][1], epsilon = 1e-15);
        assert_relative_eq!(t.weights()[1][1], before[1][1] + step, epsilon = 1e-15);
    }

    #[test]
    fn test_update_weights_rejects_bad_gradient() {
        let mut t = GoldenRatioTransform::with_defaults(4);
        assert!(t.update_weights(0.1, &[vec![0.0; 4]]).is_err());
        let ragged = vec![vec![0.0; 3]; 6];
        assert!(t.update_weights(0.1, &ragged).is_err());
    }

    proptest! {
        #[test]
        fn prop_fresh_instances_are_bit_identical(
            input in proptest::collection::vec(-10.0f64..10.0, 5),
            growth in 0.5f64..3.0,
            mode_idx in 0usize..4,
        ) {
            let modes = [
                SymbolicMode::Convergent,
                SymbolicMode::Stabilized,
                SymbolicMode::Harmonic,
                SymbolicMode::Identity,
            ];
            let a = GoldenRatioTransform::new(5, growth, modes[mode_idx]);
            let b = GoldenRatioTransform::new(5, growth, modes[mode_idx]);
            let out_a = a.transform(&input).unwrap();
            let out_b = b.transform(&input).unwrap();
            prop_assert_eq!(out_a.len(), out_b.len());
            for (x, y) in out_a.iter().zip(&out_b) {
                prop_assert_eq!(x.to_bits(), y.to_bits());
            }
        }
    }
}
