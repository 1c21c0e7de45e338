//! Criterion micro-benchmarks comparing `ArraySet` with `BTreeSet` and a
//! sorted `Vec`.

use std::collections::BTreeSet;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tidyset_alloc::LinearAllocator;
use tidyset_array::ArraySet;
use tidyset_bench::{random_keys, sorted_keys, SortedVec};

const SIZES: [usize; 3] = [100, 1_000, 10_000];
const SEED: u64 = 42;

/// Benchmark: insert N random keys one at a time into an empty container.
fn bench_insert_random(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_random");
    for n in SIZES {
        let keys = random_keys(n, 4 * n as u64, SEED);

        group.bench_with_input(BenchmarkId::new("array_set", n), &keys, |b, keys| {
            b.iter(|| {
                let mut set = ArraySet::new();
                for &k in keys {
                    set.insert(k).unwrap();
                }
                black_box(set.len());
            });
        });

        group.bench_with_input(BenchmarkId::new("array_set_arena", n), &keys, |b, keys| {
            b.iter(|| {
                // Growth never reuses arena space, so budget for every
                // doubling step.
                let arena = LinearAllocator::new(4 * n * 8).unwrap();
                let mut set = ArraySet::new_in(arena);
                for &k in keys {
                    set.insert(k).unwrap();
                }
                black_box(set.len());
            });
        });

        group.bench_with_input(BenchmarkId::new("btree_set", n), &keys, |b, keys| {
            b.iter(|| {
                let mut set = BTreeSet::new();
                for &k in keys {
                    set.insert(k);
                }
                black_box(set.len());
            });
        });

        group.bench_with_input(BenchmarkId::new("sorted_vec", n), &keys, |b, keys| {
            b.iter(|| {
                let mut set = SortedVec::new();
                for &k in keys {
                    set.insert(k);
                }
                black_box(set.len());
            });
        });
    }
    group.finish();
}

/// Benchmark: look up N random probes (about half of them present).
fn bench_contains(c: &mut Criterion) {
    let mut group = c.benchmark_group("contains");
    for n in SIZES {
        let keys = sorted_keys(n, 2 * n as u64, SEED);
        let probes = random_keys(n, 2 * n as u64, SEED + 1);

        let array_set: ArraySet<u64> = keys.iter().copied().collect();
        let btree_set: BTreeSet<u64> = keys.iter().copied().collect();

        group.bench_with_input(BenchmarkId::new("array_set", n), &probes, |b, probes| {
            b.iter(|| probes.iter().filter(|p| array_set.contains(*p)).count());
        });

        group.bench_with_input(BenchmarkId::new("btree_set", n), &probes, |b, probes| {
            b.iter(|| probes.iter().filter(|p| btree_set.contains(*p)).count());
        });
    }
    group.finish();
}

/// Benchmark: clone a populated set.
fn bench_clone(c: &mut Criterion) {
    let keys = sorted_keys(10_000, 40_000, SEED);
    let set: ArraySet<u64> = keys.iter().copied().collect();
    c.bench_function("array_set_clone_10k", |b| {
        b.iter(|| black_box(set.clone()));
    });
}

criterion_group!(benches, bench_insert_random, bench_contains, bench_clone);
criterion_main!(benches);
