//! End-to-end dismantling benchmarks.
//!
//! Runs a degree-ranked attack through the adaptive engine under each
//! stopping policy, and through both bulk engines via the translation
//! adapter. Every iteration dismantles a fresh clone of the graph.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};

use dismantle_benches::{
    error::BenchSetupError,
    params::{GraphBenchParams, RunBenchParams},
    source::{SyntheticConfig, degree_scores, preferential_attachment},
};
use dismantle_core::{
    BulkDismantler, DismantlerBuilder, ExternalDismantler, LccThresholdBulkEngine, PolicyKind,
    RankedCandidates, StaticScores, StopCondition, ThresholdBulkEngine, TranslationCache,
};

const SEED: u64 = 42;

const ATTACHMENT: usize = 2;

const VERTEX_COUNTS: &[usize] = &[500, 2_000];

const THRESHOLD: f64 = 0.1;

fn adaptive_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("adaptive_run");
    group.sample_size(10);

    for &vertex_count in VERTEX_COUNTS {
        let graph = preferential_attachment(&SyntheticConfig {
            vertex_count,
            attachment: ATTACHMENT,
            seed: SEED,
        })?;
        let scores = degree_scores(&graph);

        for policy in PolicyKind::ALL {
            let dismantler = DismantlerBuilder::new()
                .with_policy(policy)
                .with_stop_condition(StopCondition::Fraction(THRESHOLD))
                .build()?;
            let params = RunBenchParams {
                vertex_count,
                policy,
            };
            group.bench_with_input(
                BenchmarkId::from_parameter(&params),
                &(&graph, &scores),
                |b, &(graph, scores)| {
                    b.iter_batched(
                        || {
                            (
                                graph.clone(),
                                RankedCandidates::from_scores("degree", scores.iter().copied()),
                            )
                        },
                        |(mut graph, mut producer)| dismantler.run(&mut graph, &mut producer),
                        BatchSize::LargeInput,
                    );
                },
            );
        }
    }

    group.finish();
    Ok(())
}

fn bulk_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("bulk_run");
    group.sample_size(10);

    for &vertex_count in VERTEX_COUNTS {
        let graph = preferential_attachment(&SyntheticConfig {
            vertex_count,
            attachment: ATTACHMENT,
            seed: SEED,
        })?;
        let scores = degree_scores(&graph);
        let params = GraphBenchParams { vertex_count };
        let stop = StopCondition::Fraction(THRESHOLD);

        bench_engine(&mut group, ThresholdBulkEngine, stop, &params, &graph, &scores)?;
        bench_engine(&mut group, LccThresholdBulkEngine, stop, &params, &graph, &scores)?;
    }

    group.finish();
    Ok(())
}

fn bench_engine<E: BulkDismantler>(
    group: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>,
    engine: E,
    stop: StopCondition,
    params: &GraphBenchParams,
    graph: &dismantle_core::Graph,
    scores: &[(dismantle_core::StaticId, f64)],
) -> Result<(), BenchSetupError> {
    let id = BenchmarkId::new(engine.name().to_owned(), params);
    let adapter = ExternalDismantler::new(engine, stop)?;
    // One warm cache per engine so the measurement excludes translation.
    let mut cache = TranslationCache::default();
    group.bench_function(id, |b| {
        b.iter_batched(
            || StaticScores::new("degree", scores.iter().copied()),
            |mut scorer| adapter.run(graph, &mut scorer, &mut cache),
            BatchSize::SmallInput,
        );
    });
    Ok(())
}

fn adaptive_run(c: &mut Criterion) {
    if let Err(err) = adaptive_impl(c) {
        panic!("adaptive_run benchmark setup failed: {err}");
    }
}

fn bulk_run(c: &mut Criterion) {
    if let Err(err) = bulk_impl(c) {
        panic!("bulk_run benchmark setup failed: {err}");
    }
}

criterion_group!(benches, adaptive_run, bulk_run);
criterion_main!(benches);
