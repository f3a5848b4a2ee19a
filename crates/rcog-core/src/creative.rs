//! Literary and musical influences blended into a phase-interference pattern.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::PHI;
use crate::error::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfluenceKind {
    /// Sine phase.
    Literary,
    /// Cosine phase.
    Musical,
}

impl InfluenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Literary => "literary",
            Self::Musical => "musical",
        }
    }
}

impl fmt::Display for InfluenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for InfluenceKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "literary" => Ok(Self::Literary),
            "musical" => Ok(Self::Musical),
            other => Err(EngineError::InvalidConfig(format!(
                "unknown influence kind {other:?} (expected literary or musical)"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymbolicInfluence {
    #[serde(rename = "type")]
    pub kind: InfluenceKind,
    pub pattern: String,
    pub resonance: f64,
}

impl SymbolicInfluence {
    pub fn new(kind: InfluenceKind, pattern: impl Into<String>, resonance: f64) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
            resonance,
        }
    }
}

/// Ordered set of influences. Position matters: the `i`-th influence's phase
/// is damped by `1 / (i + 1)`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreativeFoundation {
    influences: Vec<SymbolicInfluence>,
}

impl CreativeFoundation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_influence(&mut self, influence: SymbolicInfluence) {
        self.influences.push(influence);
    }

    pub fn influences(&self) -> &[SymbolicInfluence] {
        &self.influences
    }

    pub fn len(&self) -> usize {
        self.influences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.influences.is_empty()
    }

    /// One value per influence: `wave(t·π·φ/(i+1)) · resonance · φ`, where
    /// the wave is sine for literary and cosine for musical influences.
    pub fn synthesize(&self, time_scale: f64) -> Vec<f64> {
        self.influences
            .iter()
            .enumerate()
            .map(|(i, influence)| {
                let angle = time_scale * std::f64::consts::PI * PHI / (i as f64 + 1.0);
                let wave = match influence.kind {
                    InfluenceKind::Literary => angle.sin(),
                    InfluenceKind::Musical => angle.cos(),
                };
                wave * influence.resonance * PHI
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_synthesizes_nothing() {
        assert!(CreativeFoundation::new().synthesize(3.0).is_empty());
    }

    #[test]
    fn test_at_time_zero() {
        let mut creative = CreativeFoundation::new();
        creative.add_influence(SymbolicInfluence::new(InfluenceKind::Literary, "verse", 0.8));
        creative.add_influence(SymbolicInfluence::new(InfluenceKind::Musical, "chord", 0.5));
        let pattern = creative.synthesize(0.0);
        assert_eq!(pattern.len(), 2);
        assert_relative_eq!(pattern[0], 0.0);
        assert_relative_eq!(pattern[1], 0.5 * PHI);
    }

    #[test]
    fn test_position_damps_phase() {
        let mut creative = CreativeFoundation::new();
        for _ in 0..3 {
            creative.add_influence(SymbolicInfluence::new(InfluenceKind::Musical, "", 1.0));
        }
        let t = 0.7;
        let pattern = creative.synthesize(t);
        for (i, v) in pattern.iter().enumerate() {
            let angle = t * std::f64::consts::PI * PHI / (i as f64 + 1.0);
            assert_relative_eq!(*v, angle.cos() * PHI);
        }
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Literary".parse::<InfluenceKind>().unwrap(), InfluenceKind::Literary);
        assert_eq!("musical".parse::<InfluenceKind>().unwrap(), InfluenceKind::Musical);
        assert!(matches!(
            "visual".parse::<InfluenceKind>(),
            Err(EngineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_influence_json_uses_type_key() {
        let influence = SymbolicInfluence::new(InfluenceKind::Musical, "Φ⊗H", 0.3);
        let json = serde_json::to_value(&influence).unwrap();
        assert_eq!(json["type"], "musical");
        assert_eq!(json["pattern"], "Φ⊗H");
    }
}
