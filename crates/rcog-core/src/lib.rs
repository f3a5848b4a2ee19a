//! Recursive cognition engine.
//!
//! Evolves a small artificial "cognition" state in discrete steps: numeric
//! vectors pushed through golden-ratio and holographic transforms, symbolic
//! expressions that mutate and recombine, and a knowledge graph whose
//! resonance diffuses along its edges.
//!
//! Zero I/O. Time comes from an injectable [`Clock`] and randomness from one
//! seeded RNG per [`Orchestrator`], so runs are reproducible.

pub mod clock;
pub mod config;
pub mod constants;
pub mod creative;
pub mod dna;
pub mod error;
pub mod fuzzy;
pub mod golden;
pub mod graph;
pub mod holographic;
pub mod id;
pub mod orchestrator;
pub mod quantum;
pub mod snapshot;
pub mod symbolic;
pub mod token;
pub mod trainer;
pub mod waltz;

pub use clock::{Clock, FixedClock, SystemClock, TickClock};
pub use config::EngineConfig;
pub use constants::{DEFAULT_DIMENSIONS, DEFAULT_GROWTH_FACTOR, PHI};
pub use creative::{CreativeFoundation, InfluenceKind, SymbolicInfluence};
pub use dna::{AgenticDna, DnaRegistry, DnaSequence, SequenceType};
pub use error::{EngineError, Result};
pub use fuzzy::{FuzzyEngine, FuzzyRule, FuzzyValue};
pub use golden::{GoldenRatioTransform, SymbolicMode};
pub use graph::{KnowledgeGraph, KnowledgeNode, NewNode, NodeType, ResonanceField};
pub use holographic::HolographicTransform;
pub use orchestrator::Orchestrator;
pub use quantum::{
    FeedforwardNetwork, PatternReading, PatternRecognizer, QuantumNeuralNetwork, QuantumState,
    ResonantLayer,
};
pub use snapshot::{EmergenceState, RecursiveState};
pub use symbolic::{
    ComponentKind, Interpretation, SymbolicComponent, SymbolicExpression, SymbolicInterpreter,
    parse_components,
};
pub use token::{FluidToken, TokenRegistry};
pub use trainer::{CHALLENGES, SequenceTrainer, TrainingSequence};
pub use waltz::{CosmicWaltz, Interaction, SYMBOLIC_SEQUENCES};
