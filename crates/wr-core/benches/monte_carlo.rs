//! Criterion benchmarks for the Monte Carlo paths in `wr-core`.
//!
//! Seeds are fixed so runs are comparable; worker counts vary to show how
//! the chunked runner scales.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wr_core::advisor::StakeAdvisor;
use wr_core::engine::PosteriorEngine;
use wr_core::simulate::SimulationConfig;

fn engine() -> PosteriorEngine {
    let mut engine = PosteriorEngine::default();
    engine
        .update(60, 40)
        .expect("benchmark observations are valid");
    engine
}

fn bench_predictive(c: &mut Criterion) {
    let engine = engine();
    let mut group = c.benchmark_group("predict_next_n");
    group.sample_size(20);

    for workers in [1usize, 4] {
        let sim = SimulationConfig::seeded(42).with_workers(workers);
        group.bench_with_input(
            BenchmarkId::new("100_games_10k_sims", workers),
            &sim,
            |b, sim| {
                b.iter(|| black_box(engine.predict_next_n(100, 10_000, sim)));
            },
        );
    }

    group.finish();
}

fn bench_ruin(c: &mut Criterion) {
    let engine = engine();
    let mut group = c.benchmark_group("risk_assessment");
    group.sample_size(20);

    for workers in [1usize, 4] {
        let advisor = StakeAdvisor::new(&engine)
            .with_simulation(SimulationConfig::seeded(7).with_workers(workers));
        group.bench_with_input(
            BenchmarkId::new("10pct_stake_100_games", workers),
            &advisor,
            |b, advisor| {
                b.iter(|| {
                    black_box(advisor.risk_assessment(
                        black_box(1000.0),
                        black_box(100.0),
                        100,
                    ))
                });
            },
        );
    }

    group.bench_function("investment_report", |b| {
        let advisor =
            StakeAdvisor::new(&engine).with_simulation(SimulationConfig::seeded(7));
        b.iter(|| black_box(advisor.generate_investment_report(1000.0, black_box(2.0))));
    });

    group.finish();
}

criterion_group!(benches, bench_predictive, bench_ruin);
criterion_main!(benches);
