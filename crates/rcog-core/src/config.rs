use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DIMENSIONS, DEFAULT_GROWTH_FACTOR};
use crate::error::{EngineError, Result};
use crate::golden::SymbolicMode;

/// Construction parameters for one [`crate::Orchestrator`].
///
/// Every field has a default, so a partial TOML table deserializes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Width of the orchestrator's cognitive-state vector.
    pub cognitive_width: usize,
    pub growth_factor: f64,
    pub symbolic_mode: SymbolicMode,
    pub holographic_dimensions: usize,
    pub fuzzy_hidden: usize,
    pub waltz_hidden: usize,
    pub recognizer_hidden: usize,
    /// Cap on active knowledge nodes before structural growth stops.
    /// `None` grows without bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_active_entities: Option<usize>,
    /// RNG seed. `None` seeds from the OS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cognitive_width: 4,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            symbolic_mode: SymbolicMode::default(),
            holographic_dimensions: DEFAULT_DIMENSIONS,
            fuzzy_hidden: 16,
            waltz_hidden: 8,
            recognizer_hidden: 8,
            max_active_entities: None,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let widths = [
            ("cognitive_width", self.cognitive_width),
            ("holographic_dimensions", self.holographic_dimensions),
            ("fuzzy_hidden", self.fuzzy_hidden),
            ("waltz_hidden", self.waltz_hidden),
            ("recognizer_hidden", self.recognizer_hidden),
        ];
        if let Some((name, _)) = widths.iter().find(|(_, w)| *w == 0) {
            return Err(EngineError::InvalidConfig(format!("{name} must be at least 1")));
        }
        if !self.growth_factor.is_finite() || self.growth_factor <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "growth_factor must be a positive finite number, got {}",
                self.growth_factor
            )));
        }
        // Tokens grow their state from a 4-wide seed; it must not collapse.
        if (4.0 * self.growth_factor).floor() < 1.0 {
            return Err(EngineError::InvalidConfig(format!(
                "growth_factor {} leaves token state empty",
                self.growth_factor
            )));
        }
        if self.max_active_entities == Some(0) {
            return Err(EngineError::InvalidConfig(
                "max_active_entities must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}
