//! Quantum-style activation layers built on the golden and holographic
//! transforms.
//!
//! Weights are drawn once at construction from the caller's RNG, uniform in
//! [-1, 1]. Nothing here trains itself: `update_weights` is a capability the
//! engine exposes but never drives from a loss.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DIMENSIONS, PHI};
use crate::error::{EngineError, Result, ensure_len};
use crate::golden::GoldenRatioTransform;
use crate::holographic::HolographicTransform;

/// Amplitude/phase pair produced per call. Never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantumState {
    pub amplitude: f64,
    /// Radians.
    pub phase: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statevector: Option<Vec<f64>>,
}

fn uniform_weight(rng: &mut impl Rng) -> f64 {
    rng.random_range(-1.0..=1.0)
}

/// Hadamard-like pairwise mix of each classical input: (cos πx + sin πx)/√2.
pub fn hadamard(input: &[f64]) -> Vec<f64> {
    input
        .iter()
        .map(|&x| {
            let phase = std::f64::consts::PI * x;
            (phase.cos() + phase.sin()) / std::f64::consts::SQRT_2
        })
        .collect()
}

/// One resonant layer: Hadamard mix → quantum state → holographic →
/// golden → `tanh(w · Σ classical)` per output unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResonantLayer {
    input_size: usize,
    golden: GoldenRatioTransform,
    holo: HolographicTransform,
    weights: Vec<f64>,
}

impl ResonantLayer {
    pub fn new(input_size: usize, output_size: usize, rng: &mut impl Rng) -> Self {
        Self {
            input_size,
            golden: GoldenRatioTransform::with_defaults(input_size),
            holo: HolographicTransform::new(input_size),
            weights: (0..output_size).map(|_| uniform_weight(rng)).collect(),
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Amplitude is the L2 norm of the mixed input, phase is
    /// `atan2(h[1], h[0])` with missing components read as 0 and 1.
    pub fn prepare_state(&self, input: &[f64]) -> Result<QuantumState> {
        ensure_len("resonant layer input", self.input_size, input.len())?;
        let mixed = hadamard(input);
        let amplitude = mixed.iter().map(|x| x * x).sum::<f64>().sqrt();
        let y = mixed.get(1).copied().unwrap_or(0.0);
        let x = mixed.first().copied().unwrap_or(1.0);
        Ok(QuantumState {
            amplitude,
            phase: y.atan2(x),
            statevector: Some(mixed),
        })
    }

    pub fn forward(&self, input: &[f64], time_scale: f64) -> Result<Vec<f64>> {
        let state = self.prepare_state(input)?;
        let statevector = state.statevector.unwrap_or_default();
        let holo_pattern = self.holo.transform(&statevector, time_scale);
        let classical = self.golden.transform(&holo_pattern)?;
        let total: f64 = classical.iter().sum();
        Ok(self.weights.iter().map(|w| (total * w).tanh()).collect())
    }

    /// `w -= rate · grad · sin(φ·w)`.
    pub fn update_weights(&mut self, learning_rate: f64, gradient: &[f64]) -> Result<()> {
        ensure_len("resonant layer gradient", self.weights.len(), gradient.len())?;
        for (w, g) in self.weights.iter_mut().zip(gradient) {
            let quantum_factor = (PHI * *w).sin();
            *w -= learning_rate * g * quantum_factor;
        }
        Ok(())
    }
}

/// Two resonant layers: input → hidden → output.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedforwardNetwork {
    input_layer: ResonantLayer,
    hidden_layer: ResonantLayer,
}

impl FeedforwardNetwork {
    pub fn new(input_size: usize, hidden_size: usize, output_size: usize, rng: &mut impl Rng) -> Self {
        Self {
            input_layer: ResonantLayer::new(input_size, hidden_size, rng),
            hidden_layer: ResonantLayer::new(hidden_size, output_size, rng),
        }
    }

    pub fn input_size(&self) -> usize {
        self.input_layer.input_size()
    }

    pub fn output_size(&self) -> usize {
        self.hidden_layer.output_size()
    }

    pub fn forward(&self, input: &[f64], time_scale: f64) -> Result<Vec<f64>> {
        let hidden = self.input_layer.forward(input, time_scale)?;
        self.hidden_layer.forward(&hidden, time_scale)
    }

    pub fn update_weights(
        &mut self,
        learning_rate: f64,
        input_gradient: &[f64],
        hidden_gradient: &[f64],
    ) -> Result<()> {
        self.input_layer.update_weights(learning_rate, input_gradient)?;
        self.hidden_layer.update_weights(learning_rate, hidden_gradient)
    }
}

/// Holographic → golden projection followed by a dense layer whose units
/// emit [`QuantumState`]s: amplitude `tanh(x)`, phase `sin(x·φ)·π`.
///
/// The weight matrix is `hidden × golden.out_features()` so the projected
/// vector is consumed whole.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuantumNeuralNetwork {
    golden: GoldenRatioTransform,
    holo: HolographicTransform,
    weights: Vec<Vec<f64>>,
}

impl QuantumNeuralNetwork {
    pub fn new(input_size: usize, hidden_size: usize, rng: &mut impl Rng) -> Self {
        let golden = GoldenRatioTransform::with_defaults(input_size);
        let width = golden.out_features();
        let weights = (0..hidden_size)
            .map(|_| (0..width).map(|_| uniform_weight(rng)).collect())
            .collect();
        Self {
            golden,
            holo: HolographicTransform::new(DEFAULT_DIMENSIONS),
            weights,
        }
    }

    pub fn input_size(&self) -> usize {
        self.golden.in_features()
    }

    pub fn hidden_size(&self) -> usize {
        self.weights.len()
    }

    fn activation(x: f64) -> QuantumState {
        QuantumState {
            amplitude: x.tanh(),
            phase: (x * PHI).sin() * std::f64::consts::PI,
            statevector: None,
        }
    }

    pub fn forward(&self, input: &[f64], time_scale: f64) -> Result<Vec<QuantumState>> {
        ensure_len("quantum network input", self.input_size(), input.len())?;
        let holo_pattern = self.holo.transform(input, time_scale);
        let projected = self.golden.transform(&holo_pattern)?;
        Ok(self
            .weights
            .iter()
            .map(|row| {
                let pre: f64 = row.iter().zip(&projected).map(|(w, x)| w * x).sum();
                Self::activation(pre)
            })
            .collect())
    }

    /// `w -= rate · grad · sin(φ·w)` over the full weight matrix.
    pub fn update_weights(&mut self, learning_rate: f64, gradient: &[Vec<f64>]) -> Result<()> {
        ensure_len("quantum network gradient rows", self.weights.len(), gradient.len())?;
        let width = self.golden.out_features();
        if let Some(row) = gradient.iter().find(|r| r.len() != width) {
            return Err(EngineError::shape(
                "quantum network gradient columns",
                width,
                row.len(),
            ));
        }
        for (row, grad_row) in self.weights.iter_mut().zip(gradient) {
            for (w, g) in row.iter_mut().zip(grad_row) {
                let quantum_factor = (PHI * *w).sin();
                *w -= learning_rate * g * quantum_factor;
            }
        }
        Ok(())
    }
}

/// Coherence and resonance summary of a quantum network's states.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternReading {
    pub states: Vec<QuantumState>,
    /// |mean cos(phase)|, in [0, 1].
    pub coherence: f64,
    /// exp(−variance of amplitudes), in (0, 1].
    pub resonance: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternRecognizer {
    network: QuantumNeuralNetwork,
}

impl PatternRecognizer {
    pub fn new(input_size: usize, hidden_size: usize, rng: &mut impl Rng) -> Self {
        Self {
            network: QuantumNeuralNetwork::new(input_size, hidden_size, rng),
        }
    }

    pub fn recognize(&self, input: &[f64], time_scale: f64) -> Result<PatternReading> {
        let states = self.network.forward(input, time_scale)?;
        let coherence = Self::coherence(&states);
        let resonance = Self::resonance(&states);
        Ok(PatternReading {
            states,
            coherence,
            resonance,
        })
    }

    fn coherence(states: &[QuantumState]) -> f64 {
        if states.is_empty() {
            return 0.0;
        }
        let alignment: f64 = states.iter().map(|s| s.phase.cos()).sum::<f64>() / states.len() as f64;
        alignment.abs()
    }

    fn resonance(states: &[QuantumState]) -> f64 {
        if states.is_empty() {
            return 1.0;
        }
        let n = states.len() as f64;
        let mean = states.iter().map(|s| s.amplitude).sum::<f64>() / n;
        let variance = states
            .iter()
            .map(|s| (s.amplitude - mean) * (s.amplitude - mean))
            .sum::<f64>()
            / n;
        (-variance).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn test_hadamard_values() {
        let h = hadamard(&[0.0, 0.5, 1.0]);
        let inv_sqrt2 = 1.0 / std::f64::consts::SQRT_2;
        assert_relative_eq!(h[0], inv_sqrt2, epsilon = 1e-12);
        assert_relative_eq!(h[1], inv_sqrt2, epsilon = 1e-12);
        assert_relative_eq!(h[2], -inv_sqrt2, epsilon = 1e-12);
    }

    #[test]
    fn test_prepare_state() {
        let layer = ResonantLayer::new(4, 3, &mut rng());
        let state = layer.prepare_state(&[0.0; 4]).unwrap();
        // Every mixed component is 1/√2, so the norm of four of them is √2.
        assert_relative_eq!(state.amplitude, std::f64::consts::SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(state.phase, std::f64::consts::FRAC_PI_4, epsilon = 1e-12);
        assert_eq!(state.statevector.as_ref().map(Vec::len), Some(4));
    }

    #[test]
    fn test_layer_forward_in_tanh_range() {
        let layer = ResonantLayer::new(4, 8, &mut rng());
        let out = layer.forward(&[0.1, 0.4, 0.7, 0.9], 10.0).unwrap();
        assert_eq!(out.len(), 8);
        assert!(out.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_layer_rejects_wrong_width() {
        let layer = ResonantLayer::new(4, 8, &mut rng());
        assert!(matches!(
            layer.forward(&[0.1; 5], 1.0),
            Err(EngineError::ShapeMismatch { expected: 4, actual: 5, .. })
        ));
    }

    #[test]
    fn test_layer_weights_in_unit_range() {
        let layer = ResonantLayer::new(4, 64, &mut rng());
        assert!(layer.weights().iter().all(|w| (-1.0..=1.0).contains(w)));
    }

    #[test]
    fn test_layer_update_weights() {
        let mut layer = ResonantLayer::new(2, 2, &mut rng());
        let before = layer.weights().to_vec();
        layer.update_weights(0.5, &[1.0, 0.0]).unwrap();
        let expected = before[0] - 0.5 * (PHI * before[0]).sin();
        assert_relative_eq!(layer.weights()[0], expected, epsilon = 1e-15);
        assert_eq!(layer.weights()[1], before[1]);
        assert!(layer.update_weights(0.5, &[1.0]).is_err());
    }

    #[test]
    fn test_feedforward_shapes() {
        let net = FeedforwardNetwork::new(4, 16, 4, &mut rng());
        assert_eq!(net.input_size(), 4);
        assert_eq!(net.output_size(), 4);
        let out = net.forward(&[0.5; 4], 3.0).unwrap();
        assert_eq!(out.len(), 4);
        assert!(net.forward(&[0.5; 3], 3.0).is_err());
    }

    #[test]
    fn test_feedforward_seeded_repeat() {
        let a = FeedforwardNetwork::new(4, 16, 4, &mut rng());
        let b = FeedforwardNetwork::new(4, 16, 4, &mut rng());
        assert_eq!(
            a.forward(&[0.2, 0.4, 0.6, 0.8], 7.0).unwrap(),
            b.forward(&[0.2, 0.4, 0.6, 0.8], 7.0).unwrap()
        );
    }

    #[test]
    fn test_qnn_states() {
        let qnn = QuantumNeuralNetwork::new(4, 8, &mut rng());
        let states = qnn.forward(&[0.3, 0.1, 0.4, 0.1], 5.0).unwrap();
        assert_eq!(states.len(), 8);
        for s in &states {
            assert!((-1.0..=1.0).contains(&s.amplitude));
            assert!(s.phase.abs() <= std::f64::consts::PI + 1e-12);
            assert!(s.statevector.is_none());
        }
    }

    #[test]
    fn test_qnn_update_weights_shape() {
        let mut qnn = QuantumNeuralNetwork::new(4, 2, &mut rng());
        assert!(qnn.update_weights(0.1, &[vec![0.0; 6], vec![0.0; 6]]).is_ok());
        assert!(qnn.update_weights(0.1, &[vec![0.0; 4], vec![0.0; 4]]).is_err());
    }

    #[test]
    fn test_pattern_reading_ranges() {
        let recognizer = PatternRecognizer::new(4, 8, &mut rng());
        let reading = recognizer.recognize(&[0.5, 0.5, 0.5, 0.5], 42.0).unwrap();
        assert_eq!(reading.states.len(), 8);
        assert!((0.0..=1.0).contains(&reading.coherence));
        assert!(reading.resonance > 0.0 && reading.resonance <= 1.0);
    }

    #[test]
    fn test_resonance_of_uniform_amplitudes_is_one() {
        let states = vec![
            QuantumState {
                amplitude: 0.3,
                phase: 0.0,
                statevector: None,
            };
            4
        ];
        assert_relative_eq!(PatternRecognizer::resonance(&states), 1.0);
        assert_relative_eq!(PatternRecognizer::coherence(&states), 1.0);
    }
}
