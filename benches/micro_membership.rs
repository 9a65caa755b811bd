#![forbid(unsafe_code)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cypher_runtime::memory::EmptyMemoryTracker;
use cypher_runtime::operations::boolean::in_list;
use cypher_runtime::operations::InCache;
use cypher_runtime::{EvalOptions, Value};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const LOOKUPS: usize = 1_024;

fn micro_membership(c: &mut Criterion) {
    let mut group = c.benchmark_group("micro/membership");
    group.sample_size(40);
    group.throughput(Throughput::Elements(LOOKUPS as u64));

    let mut rng = ChaCha8Rng::seed_from_u64(0xC0FFEE);
    for len in [16usize, 256, 4_096] {
        let list = Value::list((0..len as i64).map(Value::Integer));
        let lookups: Vec<Value> = (0..LOOKUPS)
            .map(|_| Value::Integer(rng.gen_range(0..(len as i64 * 2))))
            .collect();

        group.bench_with_input(BenchmarkId::new("uncached", len), &len, |b, _| {
            b.iter(|| {
                for find in &lookups {
                    black_box(in_list(find, &list));
                }
            });
        });

        let tracker = EmptyMemoryTracker;
        let mut cache = InCache::with_options(&EvalOptions::new(), &tracker);
        group.bench_with_input(BenchmarkId::new("cached", len), &len, |b, _| {
            b.iter(|| {
                for find in &lookups {
                    black_box(cache.check(find, &list).expect("unlimited tracker"));
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, micro_membership);
criterion_main!(benches);
