//! Agentic DNA: named bundles of symbolic sequences, optionally linked to a
//! fluid token.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::id;
use crate::waltz::pick_sequence;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SequenceType {
    Reasoning,
    Pattern,
    Quantum,
    Symbolic,
}

impl SequenceType {
    /// Display name given to freshly minted sequences of this type.
    pub fn minted_name(&self) -> &'static str {
        match self {
            Self::Reasoning => "Quantum Logic Reasoner",
            Self::Pattern => "Fractal Pattern Detector",
            Self::Quantum => "Quantum Harmonic Oscillator",
            Self::Symbolic => "Symbolic Resonance Amplifier",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DnaSequence {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SequenceType,
    pub sequence: String,
    pub resonance: f64,
}

impl DnaSequence {
    fn seeded(id: &str, name: &str, kind: SequenceType, sequence: &str, resonance: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            sequence: sequence.to_string(),
            resonance,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgenticDna {
    pub id: String,
    pub name: String,
    /// Order matters: ties in "highest resonance" go to the first sequence.
    pub sequences: Vec<DnaSequence>,
    /// Non-owning link to a token id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluid_token_id: Option<String>,
}

impl AgenticDna {
    /// Mean sequence resonance, 0 when there are no sequences.
    pub fn mean_resonance(&self) -> f64 {
        if self.sequences.is_empty() {
            return 0.0;
        }
        self.sequences.iter().map(|s| s.resonance).sum::<f64>() / self.sequences.len() as f64
    }

    /// Highest-resonance sequence, first occurrence on ties.
    pub fn strongest_sequence(&self) -> Option<&DnaSequence> {
        self.sequences
            .iter()
            .reduce(|best, s| if s.resonance > best.resonance { s } else { best })
    }
}

pub const QUANTUM_REASONER: &str = "quantum-reasoner";
pub const PATTERN_EXTRAPOLATOR: &str = "pattern-extrapolator";

fn seeded_bundles() -> [AgenticDna; 2] {
    [
        AgenticDna {
            id: QUANTUM_REASONER.to_string(),
            name: "Quantum Harmonic Reasoner".to_string(),
            sequences: vec![
                DnaSequence::seeded(
                    "qr-1",
                    "Quantum Superposition Logic",
                    SequenceType::Quantum,
                    "(√(ℏ⨀c))↔(Ω↔(λ∇τ))↔(ε(δΦ/δt))",
                    0.85,
                ),
                DnaSequence::seeded(
                    "qr-2",
                    "Entangled Decision Matrix",
                    SequenceType::Reasoning,
                    "(ħ⊗ℏ)↔(∑E)→(∇Ψ)→(Σ(Γτ))",
                    0.92,
                ),
            ],
            fluid_token_id: None,
        },
        AgenticDna {
            id: PATTERN_EXTRAPOLATOR.to_string(),
            name: "Fractal Pattern Extrapolator".to_string(),
            sequences: vec![
                DnaSequence::seeded(
                    "pe-1",
                    "Golden Ratio Pattern Recognition",
                    SequenceType::Pattern,
                    "(∑(π∫))↔(Λ: (G×c))",
                    0.78,
                ),
                DnaSequence::seeded(
                    "pe-2",
                    "Recursive Pattern Amplification",
                    SequenceType::Symbolic,
                    "(∇²(∑E))→(∫(ΣW))→(∫(ΣP)²)",
                    0.81,
                ),
            ],
            fluid_token_id: None,
        },
    ]
}

/// First `n` characters (not bytes) of `s`.
fn prefix_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((byte, _)) => &s[..byte],
        None => s,
    }
}

/// Registry of DNA bundles, pre-seeded with [`QUANTUM_REASONER`] and
/// [`PATTERN_EXTRAPOLATOR`].
#[derive(Clone, Debug)]
pub struct DnaRegistry {
    bundles: Vec<AgenticDna>,
    index: HashMap<String, usize>,
}

impl Default for DnaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DnaRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            bundles: Vec::new(),
            index: HashMap::new(),
        };
        for dna in seeded_bundles() {
            registry.insert(dna);
        }
        registry
    }

    fn insert(&mut self, dna: AgenticDna) -> &AgenticDna {
        let slot = self.bundles.len();
        self.index.insert(dna.id.clone(), slot);
        self.bundles.push(dna);
        &self.bundles[slot]
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn get_dna(&self, id: &str) -> Option<&AgenticDna> {
        self.index.get(id).map(|&i| &self.bundles[i])
    }

    pub fn all_dna(&self) -> &[AgenticDna] {
        &self.bundles
    }

    pub fn create_dna(
        &mut self,
        name: &str,
        sequences: Vec<DnaSequence>,
        rng: &mut impl Rng,
    ) -> &AgenticDna {
        self.insert(AgenticDna {
            id: id::generate("dna", rng),
            name: name.to_string(),
            sequences,
            fluid_token_id: None,
        })
    }

    /// New unregistered sequence drawn from the waltz catalog, resonance
    /// uniform in [0.5, 1.0].
    pub fn mint_dna_sequence(&self, kind: SequenceType, rng: &mut impl Rng) -> DnaSequence {
        DnaSequence {
            id: id::generate("seq", rng),
            name: kind.minted_name().to_string(),
            kind,
            sequence: pick_sequence(rng).to_string(),
            resonance: rng.random_range(0.5..=1.0),
        }
    }

    /// Splice two sequences into a new unregistered one.
    ///
    /// If both contain `→`, the result is `a[0]→b[1]` of the arrow-split
    /// parts; otherwise `(a₁₀⊗b₁₀)` of the first ten characters.
    pub fn combine_sequences(
        &self,
        a: &DnaSequence,
        b: &DnaSequence,
        rng: &mut impl Rng,
    ) -> DnaSequence {
        let first = a.name.split(' ').next().unwrap_or("");
        let second = b.name.split(' ').nth(1).unwrap_or("");
        let name = format!("{first} {second}").trim().to_string();

        let kind = if rng.random::<f64>() > 0.5 { a.kind } else { b.kind };
        let resonance = (a.resonance + b.resonance) / 2.0 + rng.random::<f64>() * 0.1;

        let a_parts: Vec<&str> = a.sequence.split('→').collect();
        let b_parts: Vec<&str> = b.sequence.split('→').collect();
        let sequence = if a_parts.len() > 1 && b_parts.len() > 1 {
            format!("{}→{}", a_parts[0], b_parts[1])
        } else {
            format!(
                "({}⊗{})",
                prefix_chars(&a.sequence, 10),
                prefix_chars(&b.sequence, 10)
            )
        };

        DnaSequence {
            id: id::generate("seq", rng),
            name,
            kind,
            sequence,
            resonance,
        }
    }

    /// Link `token_id` to a bundle, replacing any earlier link. `false` if
    /// the bundle is unknown.
    pub fn attach_fluid_token(&mut self, dna_id: &str, token_id: &str) -> bool {
        match self.index.get(dna_id) {
            Some(&slot) => {
                self.bundles[slot].fluid_token_id = Some(token_id.to_string());
                true
            }
            None => false,
        }
    }
}
