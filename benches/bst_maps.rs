use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use red_black_map::red_black_tree::RedBlackMap;
use std::collections::BTreeMap;
use std::hint::black_box;

const NUM_OF_OPERATIONS: usize = 1_000;

fn random_pairs() -> Vec<(u32, u32)> {
    let mut rng = StdRng::seed_from_u64(1);
    (0..NUM_OF_OPERATIONS).map(|_| (rng.gen(), rng.gen())).collect()
}

fn bench_btreemap_insert(c: &mut Criterion) {
    let pairs = random_pairs();
    c.bench_function("bench btreemap insert", |b| {
        b.iter(|| {
            let mut map = BTreeMap::new();
            for (key, value) in &pairs {
                map.insert(*key, *value);
            }
            map
        })
    });
}

fn bench_btreemap_get(c: &mut Criterion) {
    let pairs = random_pairs();
    let map: BTreeMap<u32, u32> = pairs.iter().cloned().collect();

    c.bench_function("bench btreemap get", |b| {
        b.iter(|| {
            for (key, _) in &pairs {
                black_box(map.get(key));
            }
        })
    });
}

fn bench_red_black_map_insert(c: &mut Criterion) {
    let pairs = random_pairs();
    c.bench_function("bench red_black_map insert", |b| {
        b.iter(|| {
            let mut map = RedBlackMap::new();
            for (key, value) in &pairs {
                map.insert(*key, *value);
            }
            map
        })
    });
}

fn bench_red_black_map_get(c: &mut Criterion) {
    let pairs = random_pairs();
    let map: RedBlackMap<u32, u32> = pairs.iter().cloned().collect();

    c.bench_function("bench red_black_map get", |b| {
        b.iter(|| {
            for (key, _) in &pairs {
                black_box(map.get(key));
            }
        })
    });
}

fn bench_red_black_map_remove(c: &mut Criterion) {
    let pairs = random_pairs();
    let map: RedBlackMap<u32, u32> = pairs.iter().cloned().collect();

    c.bench_function("bench red_black_map remove", |b| {
        b.iter_batched(
            || {
                let mut copy = RedBlackMap::new();
                copy.insert_all(&map);
                copy
            },
            |mut copy| {
                for (key, _) in &pairs {
                    let _ = black_box(copy.remove(key));
                }
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_btreemap_get,
    bench_btreemap_insert,
    bench_red_black_map_get,
    bench_red_black_map_insert,
    bench_red_black_map_remove,
);
criterion_main!(benches);
