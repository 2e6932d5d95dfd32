//! Eviction map insert/get throughput, comparing replacement policies.

use criterion::{criterion_group, criterion_main, Criterion};
use vkv::testing::FakeHeapSampler;
use vkv::{EvictionMap, EvictionPolicy, HeapReading};

fn never_overflowing<K, V>(policy: EvictionPolicy) -> EvictionMap<K, V, FakeHeapSampler>
where
    K: Eq + std::hash::Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    EvictionMap::with_sampler(
        policy,
        FakeHeapSampler::new(HeapReading { max: 100, free: 100 }),
        0.8,
    )
}

fn bench_put_if_absent(c: &mut Criterion) {
    let mut group = c.benchmark_group("eviction_map");
    for policy in [EvictionPolicy::Fifo, EvictionPolicy::SecondChance, EvictionPolicy::Lru] {
        let map = never_overflowing::<u64, u64>(policy);
        let mut i = 0u64;
        group.bench_function(format!("put_if_absent/{:?}", policy), |b| {
            b.iter(|| {
                map.put_if_absent(i, i);
                i += 1;
            })
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("eviction_map");
    for policy in [EvictionPolicy::Fifo, EvictionPolicy::SecondChance, EvictionPolicy::Lru] {
        let map = never_overflowing::<u64, u64>(policy);
        for i in 0..1000u64 {
            map.put_if_absent(i, i);
        }
        let mut i = 0u64;
        group.bench_function(format!("get/{:?}", policy), |b| {
            b.iter(|| {
                i = (i + 1) % 1000;
                map.get(&i)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_put_if_absent, bench_get);
criterion_main!(benches);
