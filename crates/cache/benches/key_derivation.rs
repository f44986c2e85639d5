//! Key derivation benchmarks
//!
//! Run with: cargo bench -p stash-cache --bench key_derivation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use stash_cache::{encode, make_key_from_object, KeyNamespacer};

fn bench_namespacing(c: &mut Criterion) {
    let mut group = c.benchmark_group("namespacing");

    for store_prefix in ["", "app", "app:"] {
        let keys = KeyNamespacer::new("cache", store_prefix);
        group.bench_with_input(
            BenchmarkId::new("to_key", format!("store_prefix={store_prefix:?}")),
            &keys,
            |b, keys| b.iter(|| keys.to_key(black_box("user:42:profile"))),
        );
    }

    group.finish();
}

fn bench_fingerprints(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprints");

    let small = json!({ "chickens": true });
    let large = json!({
        "where": { "owner": { "in": (0..50).collect::<Vec<_>>() }, "deleted": null },
        "sort": "createdAt DESC",
        "limit": 30,
        "skip": 0,
        "select": ["id", "name", "owner", "createdAt"],
    });

    for (name, criteria) in [("small", &small), ("large", &large)] {
        group.bench_with_input(BenchmarkId::new("make_key_from_object", name), criteria, |b, criteria| {
            b.iter(|| make_key_from_object(black_box("farm"), criteria).unwrap())
        });
    }

    group.finish();
}

fn bench_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("encoding");

    group.bench_function("string", |b| b.iter(|| encode(black_box("hello1")).unwrap()));
    group.bench_function("object", |b| {
        let value = json!({ "name": "old macdonald", "chickens": 12, "tags": ["e", "i", "o"] });
        b.iter(|| encode(black_box(&value)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_namespacing, bench_fingerprints, bench_encoding);
criterion_main!(benches);
