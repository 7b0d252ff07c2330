//! Connectivity and k-core recomputation benchmarks.
//!
//! The adaptive engine recomputes components after every accepted removal,
//! and the k-core policy also recomputes core numbers, so these two passes
//! bound the per-step cost of a run.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use dismantle_benches::{
    error::BenchSetupError,
    params::GraphBenchParams,
    source::{SyntheticConfig, preferential_attachment},
};
use dismantle_core::{Components, CoreNumbers};

const SEED: u64 = 42;

const ATTACHMENT: usize = 3;

const VERTEX_COUNTS: &[usize] = &[1_000, 10_000, 50_000];

fn recompute_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("recompute");
    group.sample_size(20);

    for &vertex_count in VERTEX_COUNTS {
        let graph = preferential_attachment(&SyntheticConfig {
            vertex_count,
            attachment: ATTACHMENT,
            seed: SEED,
        })?;
        let params = GraphBenchParams { vertex_count };

        group.bench_with_input(
            BenchmarkId::new("components", &params),
            &graph,
            |b, graph| {
                b.iter(|| Components::measure(graph).lcc_size());
            },
        );
        group.bench_with_input(
            BenchmarkId::new("core_numbers", &params),
            &graph,
            |b, graph| {
                b.iter(|| CoreNumbers::compute(graph).two_core_size());
            },
        );
    }

    group.finish();
    Ok(())
}

fn recompute(c: &mut Criterion) {
    if let Err(err) = recompute_impl(c) {
        panic!("recompute benchmark setup failed: {err}");
    }
}

criterion_group!(benches, recompute);
criterion_main!(benches);
