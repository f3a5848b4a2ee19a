use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DIMENSIONS, PHI, PLANCK_LENGTH};

/// Phase-interference transform over `d` dimensions.
///
/// Both operations are pure functions of their arguments and `d`; callers
/// supply `time_scale` explicitly (see [`crate::clock`]).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct HolographicTransform {
    dimensions: usize,
}

impl Default for HolographicTransform {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl HolographicTransform {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Element-wise `v·(1 + sin(ħ'·v·π + t·φ)·φ^(d−1))`.
    ///
    /// Each scalar is mapped independently, so any input length is accepted.
    pub fn transform(&self, data: &[f64], time_scale: f64) -> Vec<f64> {
        let dimensional_factor = PHI.powi(self.dimensions as i32 - 1);
        data.iter()
            .map(|&value| {
                let quantum_phase = PLANCK_LENGTH * value * std::f64::consts::PI;
                let interference = (quantum_phase + time_scale * PHI).sin();
                value * (1.0 + interference * dimensional_factor)
            })
            .collect()
    }

    /// Mean of `d` damped phases `sin(t·π·φ/(k+1))`. Range: [-1, 1].
    ///
    /// Take `abs()` where a [0, 1] magnitude is needed. Zero dimensions
    /// resonate at 0.
    pub fn generate_resonance(&self, time_scale: f64) -> f64 {
        if self.dimensions == 0 {
            return 0.0;
        }
        let sum: f64 = (0..self.dimensions)
            .map(|k| (time_scale * std::f64::consts::PI * PHI / (k as f64 + 1.0)).sin())
            .sum();
        sum / self.dimensions as f64
    }
}
