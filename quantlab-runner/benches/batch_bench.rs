//! Criterion benchmarks for runner hot paths.
//!
//! Run with: `cargo bench -p quantlab-runner`
//!
//! - Metrics reduction over a long equity curve
//! - Parameter sweep, cold cache vs warm cache
//! - Comprehensive report

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quantlab_core::engine::{run_simulation, SimulatorConfig};
use quantlab_core::signal::RiskTolerance;
use quantlab_core::Strategy;
use quantlab_runner::batch::{BatchRunner, ParamGrid};
use quantlab_runner::cache::IndicatorCache;
use quantlab_runner::data_loader::{generate_synthetic, SyntheticSpec};
use quantlab_runner::metrics::PerformanceMetrics;
use quantlab_runner::report::comprehensive_report;
use quantlab_runner::runner::BacktestRequest;

fn bars(n: usize) -> Vec<quantlab_core::domain::Bar> {
    generate_synthetic(&SyntheticSpec::new("BENCH", n, 1)).expect("synthetic bars")
}

fn bench_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics");
    for &n in &[252usize, 2520] {
        let bars = bars(n);
        let strategy = Strategy::with_defaults("ma_cross").expect("known strategy");
        let sim = run_simulation(&bars, &strategy, &SimulatorConfig::default()).expect("simulation");
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| PerformanceMetrics::compute(black_box(&sim), 0.02));
        });
    }
    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep_ma_cross_grid");
    group.sample_size(20);
    let bars = bars(1260);
    let grid = ParamGrid::ma_cross_default();
    let base = BacktestRequest::new("ma_cross");

    group.bench_function("cold_cache", |b| {
        b.iter(|| {
            let runner = BatchRunner::default();
            runner.sweep(black_box(&bars), &grid, &base)
        });
    });

    let warm = BatchRunner::new(Arc::new(IndicatorCache::new()));
    let _ = warm.sweep(&bars, &grid, &base);
    group.bench_function("warm_cache", |b| {
        b.iter(|| warm.sweep(black_box(&bars), &grid, &base));
    });

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let bars = bars(500);
    c.bench_function("comprehensive_report_500_bars", |b| {
        b.iter(|| comprehensive_report(black_box(&bars), 5, RiskTolerance::Moderate));
    });
}

criterion_group!(benches, bench_metrics, bench_sweep, bench_report);
criterion_main!(benches);
