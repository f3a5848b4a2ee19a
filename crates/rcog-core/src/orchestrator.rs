//! The step-driven state machine tying every subsystem together.
//!
//! One `Orchestrator` owns its registries, engines, clock and RNG. Nothing is
//! shared between instances, so each session gets one and serializes access
//! to it (`evolve` takes `&mut self`).

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock, TickClock};
use crate::config::EngineConfig;
use crate::constants::{CONNECT_EVERY, GROW_EVERY, RECURSIVE_EXPRESSION_EVERY};
use crate::dna::{DnaRegistry, PATTERN_EXTRAPOLATOR, QUANTUM_REASONER, SequenceType};
use crate::error::{EngineError, Result};
use crate::fuzzy::FuzzyEngine;
use crate::graph::KnowledgeGraph;
use crate::quantum::{PatternReading, PatternRecognizer};
use crate::snapshot::RecursiveState;
use crate::symbolic::{Interpretation, SymbolicExpression, SymbolicInterpreter};
use crate::token::TokenRegistry;
use crate::waltz::CosmicWaltz;

pub const INITIAL_RESONANCE: f64 = 0.5;
pub const INITIAL_SEQUENCE: &str = "Ψ(Σ(HΩ)↔∫(λΔ))";

/// Sequences of the two tokens minted at start-up, one per seeded DNA bundle.
const STARTUP_TOKENS: [(&str, &str); 2] = [
    (QUANTUM_REASONER, "(√(ℏ⨀c))↔(Ω↔(λ∇τ))↔(ε(δΦ/δt))"),
    (PATTERN_EXTRAPOLATOR, "(ħ⊗ℏ)↔(∑E)→(∇Ψ)→(Σ(Γτ))"),
];

pub struct Orchestrator {
    config: EngineConfig,
    clock: Box<dyn Clock>,
    rng: SmallRng,

    tokens: TokenRegistry,
    dna: DnaRegistry,
    graph: KnowledgeGraph,
    fuzzy: FuzzyEngine,
    waltz: CosmicWaltz,
    symbolic: SymbolicInterpreter,
    recognizer: PatternRecognizer,

    iteration: u64,
    resonance_level: f64,
    symbolic_sequence: String,
    cognitive_state: Vec<f64>,
    /// Time scale of the most recent clock read.
    time_scale: f64,

    active_tokens: Vec<String>,
    active_dna: Vec<String>,
    active_nodes: Vec<String>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("iteration", &self.iteration)
            .field("resonance_level", &self.resonance_level)
            .field("symbolic_sequence", &self.symbolic_sequence)
            .field("active_nodes", &self.active_nodes.len())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Wall-clock orchestrator. Seeds from `config.seed` or the OS.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self::with_parts(config, Box::new(SystemClock), rng)
    }

    /// Fully reproducible orchestrator: default config, `seed`, and a clock
    /// scripted by [`TickClock::seeded`].
    pub fn seeded(seed: u64) -> Result<Self> {
        Self::with_parts(
            EngineConfig::with_seed(seed),
            Box::new(TickClock::seeded()),
            SmallRng::seed_from_u64(seed),
        )
    }

    /// Build from explicit parts. `config.seed` is ignored in favour of `rng`.
    pub fn with_parts(config: EngineConfig, clock: Box<dyn Clock>, mut rng: SmallRng) -> Result<Self> {
        config.validate()?;
        let width = config.cognitive_width;
        let time_scale = clock.time_scale();

        let mut orchestrator = Self {
            tokens: TokenRegistry::new(
                config.growth_factor,
                config.symbolic_mode,
                config.holographic_dimensions,
            ),
            dna: DnaRegistry::new(),
            graph: KnowledgeGraph::new(),
            fuzzy: FuzzyEngine::new(width, config.fuzzy_hidden, &mut rng),
            waltz: CosmicWaltz::new(width, config.waltz_hidden, &mut rng),
            symbolic: SymbolicInterpreter::with_base_expressions(
                config.holographic_dimensions,
                time_scale,
                &mut rng,
            ),
            recognizer: PatternRecognizer::new(width, config.recognizer_hidden, &mut rng),
            iteration: 0,
            resonance_level: INITIAL_RESONANCE,
            symbolic_sequence: INITIAL_SEQUENCE.to_string(),
            cognitive_state: vec![0.5; width],
            time_scale,
            active_tokens: Vec::new(),
            active_dna: Vec::new(),
            active_nodes: Vec::new(),
            config,
            clock,
            rng,
        };
        orchestrator.initialize()?;
        Ok(orchestrator)
    }

    /// Mint one token per seeded DNA bundle, link them, give each bundle a
    /// graph node and connect the two nodes.
    fn initialize(&mut self) -> Result<()> {
        for (dna_id, sequence) in STARTUP_TOKENS {
            let token_id = self.tokens.mint(sequence, self.time_scale, &mut self.rng)?.id.clone();
            self.dna.attach_fluid_token(dna_id, &token_id);
            let dna = self
                .dna
                .get_dna(dna_id)
                .ok_or_else(|| EngineError::not_found("dna", dna_id))?;
            let node_id = self.graph.create_node_from_dna(dna, &mut self.rng).id.clone();

            self.active_tokens.push(token_id);
            self.active_dna.push(dna_id.to_string());
            self.active_nodes.push(node_id);
        }
        if let [a, b] = self.active_nodes.as_slice() {
            self.graph.connect_nodes(a, b);
        }
        Ok(())
    }

    /// Advance one step and return a copy of the new state.
    pub fn evolve(&mut self) -> Result<RecursiveState> {
        let t = self.clock.time_scale();
        self.time_scale = t;
        self.iteration += 1;

        for id in &self.active_tokens {
            if let Err(err) = self.tokens.evolve(id, t) {
                warn!(token = %id, error = %err, "token evolution failed, keeping previous state");
            }
        }

        self.symbolic_sequence = if self.iteration % RECURSIVE_EXPRESSION_EVERY == 0 {
            let expression = self.symbolic.generate_recursive_expression(&mut self.rng);
            self.symbolic.parse(&expression, t, &mut self.rng);
            expression
        } else {
            self.waltz.generate_symbolic_sequence(&mut self.rng).to_string()
        };

        self.resonance_level = self.graph.calculate_resonance_field().mean().min(1.0);

        let width = self.cognitive_state.len();
        self.cognitive_state = self.fuzzy.process(
            &self.cognitive_state,
            &vec![0.0; width],
            &vec![1.0; width],
            t,
            &mut self.rng,
        )?;

        if self.iteration % CONNECT_EVERY == 0 && self.active_nodes.len() >= 2 {
            self.connect_random_pair();
        }

        if self.iteration % GROW_EVERY == 0 {
            self.grow(t)?;
        }

        Ok(self.current_state())
    }

    fn connect_random_pair(&mut self) {
        let n = self.active_nodes.len();
        let first = self.rng.random_range(0..n);
        let mut second = self.rng.random_range(0..n);
        while second == first {
            second = self.rng.random_range(0..n);
        }
        self.graph
            .connect_nodes(&self.active_nodes[first], &self.active_nodes[second]);
    }

    /// New Symbolic DNA bundle with its own token and graph node, linked to a
    /// random active node. Skipped once the retention cap is reached.
    fn grow(&mut self, t: f64) -> Result<()> {
        if let Some(cap) = self.config.max_active_entities
            && self.active_nodes.len() >= cap
        {
            debug!(iteration = self.iteration, cap, "retention cap reached, skipping growth");
            return Ok(());
        }

        let sequence = self.dna.mint_dna_sequence(SequenceType::Symbolic, &mut self.rng);
        let symbols = sequence.sequence.clone();
        let name = format!("Evolved DNA {}", self.iteration);
        let dna_id = self.dna.create_dna(&name, vec![sequence], &mut self.rng).id.clone();
        let token_id = self.tokens.mint(&symbols, t, &mut self.rng)?.id.clone();
        self.dna.attach_fluid_token(&dna_id, &token_id);

        let dna = self
            .dna
            .get_dna(&dna_id)
            .ok_or_else(|| EngineError::not_found("dna", &dna_id))?;
        let node_id = self.graph.create_node_from_dna(dna, &mut self.rng).id.clone();

        if !self.active_nodes.is_empty() {
            let anchor = self.rng.random_range(0..self.active_nodes.len());
            self.graph.connect_nodes(&node_id, &self.active_nodes[anchor]);
        }

        debug!(
            iteration = self.iteration,
            dna = %dna_id,
            token = %token_id,
            node = %node_id,
            "grew new DNA bundle"
        );
        self.active_tokens.push(token_id);
        self.active_dna.push(dna_id);
        self.active_nodes.push(node_id);
        Ok(())
    }

    /// Snapshot of the current state, rebuilt from the registries.
    pub fn current_state(&self) -> RecursiveState {
        RecursiveState {
            iteration: self.iteration,
            resonance_level: self.resonance_level,
            symbolic_sequence: self.symbolic_sequence.clone(),
            cognitive_state: self.cognitive_state.clone(),
            active_tokens: self
                .active_tokens
                .iter()
                .filter_map(|id| self.tokens.get(id).cloned())
                .collect(),
            active_dna: self
                .active_dna
                .iter()
                .filter_map(|id| self.dna.get_dna(id).cloned())
                .collect(),
            knowledge_nodes: self
                .active_nodes
                .iter()
                .filter_map(|id| self.graph.get_node(id).cloned())
                .collect(),
        }
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn symbolic_sequence(&self) -> &str {
        &self.symbolic_sequence
    }

    pub fn resonance_level(&self) -> f64 {
        self.resonance_level
    }

    pub fn cognitive_state(&self) -> &[f64] {
        &self.cognitive_state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenRegistry {
        &self.tokens
    }

    pub fn dna(&self) -> &DnaRegistry {
        &self.dna
    }

    pub fn graph(&self) -> &KnowledgeGraph {
        &self.graph
    }

    pub fn expressions(&self) -> &[SymbolicExpression] {
        self.symbolic.expressions()
    }

    /// Run the pattern recognizer over the current cognitive state at the
    /// last step's time scale.
    pub fn recognize_pattern(&self) -> Result<PatternReading> {
        self.recognizer.recognize(&self.cognitive_state, self.time_scale)
    }

    pub fn interpret(&self, expression: &str) -> Interpretation {
        self.symbolic.interpret(expression, self.time_scale)
    }
}
