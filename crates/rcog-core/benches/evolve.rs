//! Criterion benchmarks for the orchestrator step.
//!
//! Run with:
//!   cargo bench -p rcog-core
//!
//! Results are saved to target/criterion/

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use rcog_core::{KnowledgeGraph, Orchestrator};

/// Orchestrator already advanced `steps` times, so registries have grown.
fn warmed(steps: u64) -> Orchestrator {
    let mut orch = match Orchestrator::seeded(42) {
        Ok(orch) => orch,
        Err(err) => panic!("default config must build: {err}"),
    };
    for _ in 0..steps {
        if let Err(err) = orch.evolve() {
            panic!("warm-up step failed: {err}");
        }
    }
    orch
}

fn bench_evolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("evolve");
    for warm in [0u64, 100, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(warm), &warm, |b, &warm| {
            let mut orch = warmed(warm);
            b.iter(|| black_box(orch.evolve()));
        });
    }
    group.finish();
}

fn bench_resonance_field(c: &mut Criterion) {
    let orch = warmed(1_000);
    let graph: &KnowledgeGraph = orch.graph();
    c.bench_function("resonance_field_after_1000_steps", |b| {
        b.iter(|| black_box(graph.calculate_resonance_field()))
    });
}

criterion_group!(benches, bench_evolve, bench_resonance_field);
criterion_main!(benches);
