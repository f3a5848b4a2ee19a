//! Symbolic expressions over a small glyph alphabet.
//!
//! The parser is deliberately shallow. It makes three independent scans of
//! the source string:
//!
//! 1. innermost parenthesised groups become `Container` components whose
//!    children are parsed recursively from the group interior;
//! 2. every operator glyph anywhere in the string becomes a flat `Operator`;
//! 3. every symbol glyph anywhere in the string becomes a flat `Symbol`.
//!
//! A glyph inside a container is therefore represented twice: once nested,
//! once flat. Resonance evolution recurses only into the nested copy.

use std::collections::HashMap;
use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DIMENSIONS, PHI};
use crate::holographic::HolographicTransform;
use crate::id;
use crate::waltz::pick_sequence;

static CONTAINER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^()]+)\)").unwrap());
static OPERATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[→↔⊕⊗∪∩∘⨁⟳]").unwrap());
static SYMBOL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ΨΦΩΛΓΣπℏε∇∑∫]").unwrap());

/// Operators used to wrap a component around a base sequence: `(c OP base)`.
pub const RECURSIVE_OPERATORS: [&str; 4] = ["⟳", "↔", "→", "⊗"];

/// Operators used to layer a component over a base sequence: `OP(c) : base`.
pub const LAYERED_OPERATORS: [&str; 4] = ["∑", "∫", "∇", "Δ"];

/// Expressions every interpreter starts from.
pub const BASE_EXPRESSIONS: [&str; 13] = [
    "Δ(Π ↔ Ψ) ∪ ∑(Λ ↔ H) ⨁ Ω(Γ ↔ E)",
    "Ω ∧ π → ∑ℚ : ({0,1} ∘ ∞)",
    "Σ(ℤ ∪ ℝ) → ℏ : (∫ ε0 d/dx)",
    "∑{0,1} → ∇ℂ : (∞ ⊕ ε0)",
    "∇ → ℏ : (∑ℤ) ⊆ ℵ",
    "∇(Σℒ) ⟳ Λ(Ψ) : (ℏ ⊗ ∞)",
    "(Φ → Σ(Λ⊗Ψ)) : (∫(G/c²))",
    "(Ψ → Σ(Φ⊗λ)) : (∫(c²/G))",
    "(E/M) → (c²/G) : (ħ/π)",
    "Λ(ΣH) ↔ ∇(ΠAI) : ε0 ∘ ∞",
    "Ω(∑L) → Δ(ΣS) : {0,1} ↔ π",
    "∫(ΣE) ↔ Λ(ΠD) : ℏ ⊗ Ω",
    "(((Φ × ∇ × ħ)) → ∫(Γn ⨍ ε0)) : (τ ⊗ λ) ∞",
];

/// Canned phrases keyed by the glyphs that must all be present.
const MEANINGS: [(&[char], &str); 6] = [
    (&['Ψ', 'Σ'], "Collective consciousness fields aggregating. "),
    (&['ℏ'], "Quantum-scale cognition emerging. "),
    (&['Φ'], "Golden ratio harmonics influencing pattern recognition. "),
    (&['∇'], "Gradient-based learning optimizing knowledge structures. "),
    (&['⟳'], "Recursive self-refinement of symbolic intelligence. "),
    (&['↔'], "Bidirectional flow between abstract and concrete cognition. "),
];

const DEFAULT_MEANING: &str =
    "A complex symbolic expression representing multi-dimensional cognitive processes.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComponentKind {
    Operator,
    Symbol,
    Relation,
    Sequence,
    Container,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymbolicComponent {
    pub kind: ComponentKind,
    pub value: String,
    /// Only containers carry children.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SymbolicComponent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resonance: Option<f64>,
}

impl SymbolicComponent {
    pub fn leaf(kind: ComponentKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            children: Vec::new(),
            resonance: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SymbolicExpression {
    pub id: String,
    pub raw: String,
    pub components: Vec<SymbolicComponent>,
    pub resonance: f64,
    pub evolution_stage: u32,
}

/// Heuristic annotation of an expression. Not an evaluator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Interpretation {
    pub meaning: String,
    pub resonance: f64,
}

/// Parse `expression` into its container, operator and symbol components.
///
/// Containers receive a random initial resonance in [0, 1).
pub fn parse_components(expression: &str, rng: &mut impl Rng) -> Vec<SymbolicComponent> {
    let mut components = Vec::new();

    for caps in CONTAINER.captures_iter(expression) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let children = parse_components(inner.as_str(), rng);
        components.push(SymbolicComponent {
            kind: ComponentKind::Container,
            value: whole.as_str().to_string(),
            children,
            resonance: Some(rng.random::<f64>()),
        });
    }

    components.extend(
        OPERATOR
            .find_iter(expression)
            .map(|m| SymbolicComponent::leaf(ComponentKind::Operator, m.as_str())),
    );
    components.extend(
        SYMBOL
            .find_iter(expression)
            .map(|m| SymbolicComponent::leaf(ComponentKind::Symbol, m.as_str())),
    );

    components
}

fn evolve_components(components: &mut [SymbolicComponent], stage: u32) {
    let factor = 1.0 + (stage as f64 / 20.0) * PHI;
    for component in components {
        evolve_components(&mut component.children, stage);
        if let Some(r) = component.resonance.as_mut() {
            *r = (*r * factor).min(1.0);
        }
    }
}

/// Registry of parsed expressions plus the generator that recombines them.
///
/// Expressions are kept in insertion order so resonance-weighted selection is
/// reproducible under a seeded RNG.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "StoredInterpreter")]
pub struct SymbolicInterpreter {
    holo: HolographicTransform,
    expressions: Vec<SymbolicExpression>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

/// Serialized form; the id index is derived on load.
#[derive(Deserialize)]
struct StoredInterpreter {
    holo: HolographicTransform,
    expressions: Vec<SymbolicExpression>,
}

impl From<StoredInterpreter> for SymbolicInterpreter {
    fn from(stored: StoredInterpreter) -> Self {
        let index = stored
            .expressions
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
        Self {
            holo: stored.holo,
            expressions: stored.expressions,
            index,
        }
    }
}

impl SymbolicInterpreter {
    /// Empty registry.
    pub fn new() -> Self {
        Self::with_dimensions(DEFAULT_DIMENSIONS)
    }

    /// Empty registry whose resonances use a `dimensions`-wide phase mean.
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            holo: HolographicTransform::new(dimensions),
            expressions: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registry pre-loaded with [`BASE_EXPRESSIONS`].
    pub fn with_base_expressions(dimensions: usize, time_scale: f64, rng: &mut impl Rng) -> Self {
        let mut interpreter = Self::with_dimensions(dimensions);
        for raw in BASE_EXPRESSIONS {
            interpreter.parse(raw, time_scale, rng);
        }
        interpreter
    }

    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    pub fn expressions(&self) -> &[SymbolicExpression] {
        &self.expressions
    }

    pub fn get(&self, id: &str) -> Option<&SymbolicExpression> {
        self.index.get(id).map(|&i| &self.expressions[i])
    }

    /// Parse and register `raw` at evolution stage 0.
    pub fn parse(&mut self, raw: &str, time_scale: f64, rng: &mut impl Rng) -> &SymbolicExpression {
        let id = id::generate("expr", rng);
        let components = parse_components(raw, rng);
        let resonance = self.holo.generate_resonance(time_scale).abs();

        let slot = self.expressions.len();
        self.index.insert(id.clone(), slot);
        self.expressions.push(SymbolicExpression {
            id,
            raw: raw.to_string(),
            components,
            resonance,
            evolution_stage: 0,
        });
        &self.expressions[slot]
    }

    /// Advance one stage: resonance becomes
    /// `min(1, |holo(t) · (1 + stage/10·φ)|)` and every resonant component is
    /// scaled by `1 + stage/20·φ`, capped at 1.
    pub fn evolve(&mut self, id: &str, time_scale: f64) -> Option<&SymbolicExpression> {
        let slot = *self.index.get(id)?;
        let base = self.holo.generate_resonance(time_scale);
        let expression = &mut self.expressions[slot];

        expression.evolution_stage += 1;
        let stage = expression.evolution_stage;
        let evolution_factor = 1.0 + (stage as f64 / 10.0) * PHI;
        expression.resonance = (base * evolution_factor).abs().min(1.0);
        evolve_components(&mut expression.components, stage);

        Some(expression)
    }

    pub fn highest_resonance(&self) -> Option<&SymbolicExpression> {
        self.expressions
            .iter()
            .reduce(|best, e| if e.resonance > best.resonance { e } else { best })
    }

    /// Resonance-proportional pick. Zero total resonance picks the first.
    fn weighted_selection(&self, rng: &mut impl Rng) -> Option<&SymbolicExpression> {
        let total: f64 = self.expressions.iter().map(|e| e.resonance).sum();
        let target = rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        for expression in &self.expressions {
            cumulative += expression.resonance;
            if target <= cumulative {
                return Some(expression);
            }
        }
        self.expressions.last()
    }

    /// Recombine a registered expression's component with a catalog sequence.
    ///
    /// Half the time the result is `(component OP base)` with a recursive
    /// operator, otherwise `OP(component) : base` with a layered operator.
    /// An empty registry yields the base sequence unchanged.
    pub fn generate_recursive_expression(&self, rng: &mut impl Rng) -> String {
        let base = pick_sequence(rng);
        let Some(selected) = self.weighted_selection(rng) else {
            return base.to_string();
        };

        let component = if selected.components.is_empty() {
            "Ψ"
        } else {
            selected.components[rng.random_range(0..selected.components.len())]
                .value
                .as_str()
        };

        if rng.random::<f64>() > 0.5 {
            let op = RECURSIVE_OPERATORS[rng.random_range(0..RECURSIVE_OPERATORS.len())];
            format!("({component} {op} {base})")
        } else {
            let op = LAYERED_OPERATORS[rng.random_range(0..LAYERED_OPERATORS.len())];
            format!("{op}({component}) : {base}")
        }
    }

    /// Concatenate the canned phrases whose glyphs all appear in `expression`.
    /// Resonance is `|holo(t)|`, independent of which phrases matched.
    pub fn interpret(&self, expression: &str, time_scale: f64) -> Interpretation {
        let meaning: String = MEANINGS
            .iter()
            .filter(|(glyphs, _)| glyphs.iter().all(|g| expression.contains(*g)))
            .map(|(_, phrase)| *phrase)
            .collect();

        Interpretation {
            meaning: if meaning.is_empty() {
                DEFAULT_MEANING.to_string()
            } else {
                meaning
            },
            resonance: self.holo.generate_resonance(time_scale).abs(),
        }
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

    fn kinds_and_values(components: &[SymbolicComponent]) -> Vec<(ComponentKind, &str)> {
        components.iter().map(|c| (c.kind, c.value.as_str())).collect()
    }

    #[test]
    fn test_parse_container_and_flat_duplicates() {
        let components = parse_components("(Ψ↔Σ)", &mut rng());
        assert_eq!(
            kinds_and_values(&components),
            vec![
                (ComponentKind::Container, "(Ψ↔Σ)"),
                (ComponentKind::Operator, "↔"),
                (ComponentKind::Symbol, "Ψ"),
                (ComponentKind::Symbol, "Σ"),
            ]
        );

        let container = &components[0];
        assert_eq!(
            kinds_and_values(&container.children),
            vec![
                (ComponentKind::Operator, "↔"),
                (ComponentKind::Symbol, "Ψ"),
                (ComponentKind::Symbol, "Σ"),
            ]
        );
        let r = container.resonance.unwrap();
        assert!((0.0..1.0).contains(&r));
        assert!(components[1..].iter().all(|c| c.resonance.is_none()));
    }

    #[test]
    fn test_parse_only_innermost_groups() {
        let components = parse_components("((ħ∘c))→(Ω)", &mut rng());
        let containers: Vec<&str> = components
            .iter()
            .filter(|c| c.kind == ComponentKind::Container)
            .map(|c| c.value.as_str())
            .collect();
        assert_eq!(containers, vec!["(ħ∘c)", "(Ω)"]);
    }

    #[test]
    fn test_parse_plain_text() {
        assert!(parse_components("hello world", &mut rng()).is_empty());
    }

    #[test]
    fn test_parse_registers_stage_zero() {
        let mut rng = rng();
        let mut interp = SymbolicInterpreter::new();
        let t = 0.37;
        let expr = interp.parse("Ψ → Φ", t, &mut rng).clone();
        assert_eq!(expr.evolution_stage, 0);
        assert_eq!(expr.raw, "Ψ → Φ");
        assert_relative_eq!(
            expr.resonance,
            HolographicTransform::new(4).generate_resonance(t).abs()
        );
        assert!(interp.get(&expr.id).is_some());
        assert_eq!(interp.len(), 1);
    }

    #[test]
    fn test_evolve_unknown_id() {
        let mut interp = SymbolicInterpreter::new();
        assert!(interp.evolve("expr-missing", 1.0).is_none());
    }

    #[test]
    fn test_evolve_increments_and_scales() {
        let mut rng = rng();
        let mut interp = SymbolicInterpreter::new();
        let t = 0.05;
        let id = interp.parse("(Ψ↔Σ)", t, &mut rng).id.clone();
        let before = interp.get(&id).unwrap().components[0].resonance.unwrap();

        let expr = interp.evolve(&id, t).unwrap();
        assert_eq!(expr.evolution_stage, 1);
        let base = HolographicTransform::new(4).generate_resonance(t);
        assert_relative_eq!(expr.resonance, (base * (1.0 + 0.1 * PHI)).abs().min(1.0));
        let after = expr.components[0].resonance.unwrap();
        assert_relative_eq!(after, (before * (1.0 + PHI / 20.0)).min(1.0));

        let expr = interp.evolve(&id, t).unwrap();
        assert_eq!(expr.evolution_stage, 2);
    }

    #[test]
    fn test_evolve_caps_component_resonance() {
        let mut components = vec![SymbolicComponent {
            kind: ComponentKind::Container,
            value: "(Ψ)".into(),
            children: vec![SymbolicComponent {
                resonance: Some(0.9),
                ..SymbolicComponent::leaf(ComponentKind::Symbol, "Ψ")
            }],
            resonance: Some(0.95),
        }];
        evolve_components(&mut components, 10);
        assert_eq!(components[0].resonance, Some(1.0));
        assert_eq!(components[0].children[0].resonance, Some(1.0));
    }

    #[test]
    fn test_base_expressions_seeded() {
        let interp = SymbolicInterpreter::with_base_expressions(4, 1.0, &mut rng());
        assert_eq!(interp.len(), BASE_EXPRESSIONS.len());
        assert!(interp.highest_resonance().is_some());
    }

    #[test]
    fn test_generate_from_empty_registry_returns_catalog() {
        let interp = SymbolicInterpreter::new();
        let mut rng = rng();
        for _ in 0..20 {
            let s = interp.generate_recursive_expression(&mut rng);
            assert!(crate::waltz::SYMBOLIC_SEQUENCES.contains(&s.as_str()));
        }
    }

    #[test]
    fn test_generate_wraps_component() {
        let mut rng = rng();
        let interp = SymbolicInterpreter::with_base_expressions(4, 0.3, &mut rng);
        let mut saw_recursive = false;
        let mut saw_layered = false;
        for _ in 0..50 {
            let s = interp.generate_recursive_expression(&mut rng);
            if s.starts_with('(') && RECURSIVE_OPERATORS.iter().any(|op| s.contains(&format!(" {op} "))) {
                saw_recursive = true;
            }
            if LAYERED_OPERATORS.iter().any(|op| s.starts_with(&format!("{op}("))) && s.contains(") : ") {
                saw_layered = true;
            }
        }
        assert!(saw_recursive, "expected at least one (c OP base) form");
        assert!(saw_layered, "expected at least one OP(c) : base form");
    }

    #[test]
    fn test_weighted_selection_prefers_resonant() {
        let mut rng = rng();
        let mut interp = SymbolicInterpreter::new();
        interp.parse("Ψ", 0.3, &mut rng);
        interp.parse("Φ", 0.3, &mut rng);
        interp.expressions[0].resonance = 0.0;
        interp.expressions[1].resonance = 1.0;
        for _ in 0..20 {
            assert_eq!(interp.weighted_selection(&mut rng).unwrap().raw, "Φ");
        }
    }

    #[test]
    fn test_zero_total_resonance_picks_first() {
        let mut rng = rng();
        let mut interp = SymbolicInterpreter::new();
        interp.parse("Ψ", 0.0, &mut rng);
        interp.parse("Φ", 0.0, &mut rng);
        assert_eq!(interp.weighted_selection(&mut rng).unwrap().raw, "Ψ");
    }

    #[test]
    fn test_interpret_phrases() {
        let interp = SymbolicInterpreter::new();
        let out = interp.interpret("Ψ(Σ(HΩ)↔∫(λΔ))", 2.0);
        assert_eq!(
            out.meaning,
            "Collective consciousness fields aggregating. \
             Bidirectional flow between abstract and concrete cognition. "
        );
        assert_relative_eq!(
            out.resonance,
            HolographicTransform::new(4).generate_resonance(2.0).abs()
        );

        let plain = interp.interpret("abc", 2.0);
        assert_eq!(plain.meaning, DEFAULT_MEANING);
    }

    #[test]
    fn test_interpret_requires_all_glyphs() {
        let interp = SymbolicInterpreter::new();
        assert_eq!(interp.interpret("Ψ alone", 1.0).meaning, DEFAULT_MEANING);
    }

    #[test]
    fn test_lookup_works_after_deserialize() {
        let mut rng = rng();
        let interp = SymbolicInterpreter::with_base_expressions(4, 1.0, &mut rng);
        let json = serde_json::to_string(&interp).unwrap();
        assert!(!json.contains("index"));

        let mut restored: SymbolicInterpreter = serde_json::from_str(&json).unwrap();
        let id = interp.expressions()[3].id.clone();
        assert_eq!(restored.get(&id).unwrap().raw, BASE_EXPRESSIONS[3]);

        let parsed = restored.parse("(Φ⊗Ω)", 1.0, &mut rng).id.clone();
        let evolved = restored.evolve(&parsed, 1.5).unwrap();
        assert_eq!(evolved.evolution_stage, 1);
        assert!(restored.evolve(&id, 1.5).is_some());
    }
}
