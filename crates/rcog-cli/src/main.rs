mod config;
mod server;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rcog_core::{
    Clock, CreativeFoundation, Orchestrator, SequenceTrainer, SymbolicInfluence, SymbolicInterpreter,
    SystemClock, TickClock, parse_components,
};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "rcog", about = "Recursive cognition engine CLI and session host")]
struct Cli {
    /// TOML config file (falls back to $RCOG_CONFIG, then defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a fresh engine and print each step
    Run {
        /// Number of steps
        #[arg(long, default_value_t = 10)]
        steps: u64,

        /// Seed the RNG and use a deterministic clock
        #[arg(long)]
        seed: Option<u64>,

        /// Print the final state as JSON instead of per-step lines
        #[arg(long)]
        json: bool,
    },

    /// Parse a symbolic expression into components (JSON)
    Parse {
        /// Expression, e.g. "(Ψ↔Σ)"
        expr: String,
    },

    /// Annotate a symbolic expression with its canned meaning
    Interpret {
        expr: String,
    },

    /// Draw a training challenge and score it
    Challenge {
        /// Seed the RNG and read time from the seeded clock
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Blend literary/musical influences into an interference pattern (JSON)
    Synthesize {
        /// kind:resonance[:pattern], e.g. "literary:0.8:Ψ→Φ" (repeatable)
        #[arg(long = "influence", required = true, value_parser = parse_influence)]
        influences: Vec<SymbolicInfluence>,

        /// Time scale (defaults to the wall clock)
        #[arg(long)]
        time: Option<f64>,
    },

    /// Host engine sessions over HTTP
    Serve {
        /// Listen address (overrides [server].addr)
        #[arg(long)]
        addr: Option<SocketAddr>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run { steps, seed, json } => cmd_run(config, steps, seed, json),
        Commands::Parse { expr } => cmd_parse(&expr),
        Commands::Interpret { expr } => {
            cmd_interpret(&expr);
            Ok(())
        }
        Commands::Challenge { seed } => cmd_challenge(&config, seed),
        Commands::Synthesize { influences, time } => cmd_synthesize(influences, time),
        Commands::Serve { addr } => cmd_serve(config, addr).await,
        Commands::Config => cmd_config(&config),
    }
}

fn build_orchestrator(config: &AppConfig, seed: Option<u64>) -> Result<Orchestrator> {
    let mut engine = config.engine.clone();
    if seed.is_some() {
        engine.seed = seed;
    }
    let orchestrator = match engine.seed {
        Some(seed) => Orchestrator::with_parts(
            engine,
            Box::new(TickClock::seeded()),
            SmallRng::seed_from_u64(seed),
        ),
        None => Orchestrator::new(engine),
    };
    orchestrator.context("failed to build engine")
}

fn cmd_run(config: AppConfig, steps: u64, seed: Option<u64>, json: bool) -> Result<()> {
    let mut orchestrator = build_orchestrator(&config, seed)?;
    let mut state = orchestrator.current_state();

    for _ in 0..steps {
        state = orchestrator
            .evolve()
            .with_context(|| format!("step {} failed", orchestrator.iteration()))?;
        if !json {
            println!(
                "{:>5}  resonance={:.4}  {:<13}  {}",
                state.iteration,
                state.resonance_level,
                state.emergence(),
                state.symbolic_sequence
            );
        }
    }

    if json {
        let text = serde_json::to_string_pretty(&state).context("failed to serialize state")?;
        println!("{text}");
    } else {
        println!(
            "done. tokens={}, dna={}, nodes={}, edges={}",
            state.active_tokens.len(),
            state.active_dna.len(),
            state.knowledge_nodes.len(),
            orchestrator.graph().edge_count()
        );
    }
    Ok(())
}

fn cmd_parse(expr: &str) -> Result<()> {
    let mut rng = SmallRng::from_os_rng();
    let components = parse_components(expr, &mut rng);
    let text = serde_json::to_string_pretty(&components).context("failed to serialize components")?;
    println!("{text}");
    Ok(())
}

fn cmd_interpret(expr: &str) {
    let interpretation = SymbolicInterpreter::new().interpret(expr, SystemClock.time_scale());
    println!("meaning:   {}", interpretation.meaning.trim_end());
    println!("resonance: {:.4}", interpretation.resonance);
}

fn cmd_challenge(config: &AppConfig, seed: Option<u64>) -> Result<()> {
    let trainer = SequenceTrainer::new(config.engine.symbolic_mode);
    let (mut rng, t) = match seed.or(config.engine.seed) {
        Some(seed) => (SmallRng::seed_from_u64(seed), TickClock::seeded().time_scale()),
        None => (SmallRng::from_os_rng(), SystemClock.time_scale()),
    };

    let challenge = trainer.generate_challenge(&mut rng);
    let trained = trainer
        .train_on_sequence(&challenge, t)
        .context("failed to train challenge")?;
    println!("input:     {}", trained.input);
    println!("output:    {}", trained.output);
    println!("resonance: {:.4}", trained.resonance.unwrap_or_default());
    println!("score:     {:.4}", trainer.evaluate(t));
    Ok(())
}

fn parse_influence(s: &str) -> std::result::Result<SymbolicInfluence, String> {
    let mut parts = s.splitn(3, ':');
    let kind = parts
        .next()
        .unwrap_or_default()
        .parse()
        .map_err(|e: rcog_core::EngineError| e.to_string())?;
    let resonance: f64 = parts
        .next()
        .ok_or_else(|| format!("missing resonance in {s:?} (expected kind:resonance[:pattern])"))?
        .parse()
        .map_err(|e| format!("invalid resonance in {s:?}: {e}"))?;
    let pattern = parts.next().unwrap_or_default();
    Ok(SymbolicInfluence::new(kind, pattern, resonance))
}

fn cmd_synthesize(influences: Vec<SymbolicInfluence>, time: Option<f64>) -> Result<()> {
    let mut creative = CreativeFoundation::new();
    for influence in influences {
        creative.add_influence(influence);
    }
    let t = time.unwrap_or_else(|| SystemClock.time_scale());
    let pattern = creative.synthesize(t);
    let text = serde_json::to_string_pretty(&pattern).context("failed to serialize pattern")?;
    println!("{text}");
    Ok(())
}

async fn cmd_serve(mut config: AppConfig, addr: Option<SocketAddr>) -> Result<()> {
    if let Some(addr) = addr {
        config.server.addr = addr;
    }
    server::serve(config).await
}

fn cmd_config(config: &AppConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
