/// Golden ratio: (1 + √5) / 2
pub const PHI: f64 = 1.618_033_988_749_895;

/// Default growth factor of the golden-ratio transform (φ truncated to 3 places).
pub const DEFAULT_GROWTH_FACTOR: f64 = 1.618;

/// Planck constant over c², the "quantum phase" scale of the holographic transform.
pub const PLANCK_LENGTH: f64 = 6.62607e-34 / (299_792.0 * 299_792.0);

/// Default dimension count for holographic transforms and cognitive vectors.
pub const DEFAULT_DIMENSIONS: usize = 4;

/// Synchronous diffusion rounds in the resonance field. Not configurable.
pub const DIFFUSION_ROUNDS: usize = 3;

/// Share of each neighbor's resonance pushed into a node per diffusion round.
pub const DIFFUSION_SHARE: f64 = 0.2;

/// λ used by the interaction engine when diffusing its data vector.
pub const DEFAULT_LAMBDA: f64 = 0.1;

/// Step size of the interaction engine's harmony optimisation.
pub const HARMONY_LEARNING_RATE: f64 = 0.01;

/// Orchestrator cadence: generate a recursive expression every N steps.
pub const RECURSIVE_EXPRESSION_EVERY: u64 = 3;

/// Orchestrator cadence: add a random graph edge every N steps.
pub const CONNECT_EVERY: u64 = 5;

/// Orchestrator cadence: grow a new DNA/token/node triple every N steps.
pub const GROW_EVERY: u64 = 10;
