//! Criterion benchmarks for ghost synchronization.

use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use halo_bench::{reference_profile, single_rank_field, single_rank_profile, wide_ghost_profile};
use halo_field::FieldConfig;
use halo_test_utils::{fill_global, global_value, run_fields};

fn bench_single_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("ghost_sync/single_rank");
    for side in [64, 256, 1024] {
        let config = single_rank_profile(side);
        let mut field = single_rank_field(&config).unwrap();
        fill_global(&mut field, global_value);
        group.throughput(Throughput::Elements(4 * side as u64));
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            b.iter(|| {
                field.sync_ghosts().unwrap();
                black_box(&field);
            });
        });
    }
    group.finish();
}

/// Time `iters` syncs on every rank and report rank 0's wall time.
fn timed_syncs(config: &FieldConfig, iters: u64) -> Duration {
    let times = run_fields(config, |mut field| {
        fill_global(&mut field, global_value);
        field.sync_ghosts().unwrap();
        let start = Instant::now();
        for _ in 0..iters {
            field.sync_ghosts().unwrap();
        }
        start.elapsed()
    });
    times[0]
}

fn bench_four_ranks(c: &mut Criterion) {
    let mut group = c.benchmark_group("ghost_sync/four_ranks");
    for (name, config) in [
        ("reference", reference_profile()),
        ("wide_ghost", wide_ghost_profile()),
    ] {
        group.bench_function(name, |b| {
            b.iter_custom(|iters| timed_syncs(&config, iters));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_rank, bench_four_ranks);
criterion_main!(benches);
