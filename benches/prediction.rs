//! Scoring benchmarks.
//!
//! Covers:
//! - Single request, linear vs quadratic models
//! - Cold vs warm hash caches
//! - Batch scoring, sequential vs rayon
//! - Binary load of an 18-bit table
//!
//! ```bash
//! cargo bench --bench prediction
//! ```

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use vw_slim::data::{Feature, Namespace, Request};
use vw_slim::inference::{predict, predict_batch, predict_into};
use vw_slim::io::{load_binary, write_binary};
use vw_slim::testing::SyntheticModel;
use vw_slim::{Model, Parallelism};

// =============================================================================
// Setup
// =============================================================================

fn bench_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .warm_up_time(Duration::from_secs(1))
        .measurement_time(Duration::from_secs(5))
        .sample_size(20)
}

/// Model with a handful of weights per namespace. Density does not affect
/// scoring cost, only the number of lookups does.
fn build_model(options: &str) -> Model {
    let mut builder = SyntheticModel::new(18, options).unwrap();
    for ns in ["user", "item", "ctx"] {
        for i in 0..16 {
            builder = builder.feature(ns, &format!("f{i}"), 0, 0.01 * i as f32);
        }
    }
    builder.intercept(0, 0.1).build().unwrap()
}

/// Request with `per_ns` features in each of three namespaces.
fn build_request(seed: usize, per_ns: usize) -> Request {
    Request::new(["user", "item", "ctx"].into_iter().enumerate().map(|(n, ns)| {
        Namespace::new(
            ns,
            (0..per_ns).map(|i| Feature::with_value(format!("f{}", (seed + n * 7 + i) % 32), 1.0)),
        )
    }))
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("predict/single");

    for (name, options) in [("linear", ""), ("quadratic", "-q ui -q uc"), ("any_to_any", "-q ::")] {
        let model = build_model(options);
        let request = build_request(0, 10);
        let mut out = model.output_buffer();

        group.bench_function(BenchmarkId::new("warm", name), |b| {
            b.iter(|| predict_into(&model, black_box(&request), &mut out, None))
        });
        group.bench_function(BenchmarkId::new("cold", name), |b| {
            b.iter(|| {
                request.reset_hashes();
                predict_into(&model, black_box(&request), &mut out, None)
            })
        });
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let model = build_model("-q ui");
    let mut group = c.benchmark_group("predict/batch");

    for batch_size in [10usize, 1_000, 10_000] {
        let requests: Vec<Request> = (0..batch_size).map(|i| build_request(i, 8)).collect();
        group.throughput(Throughput::Elements(batch_size as u64));

        group.bench_with_input(BenchmarkId::new("sequential", batch_size), &requests, |b, reqs| {
            b.iter(|| black_box(predict_batch(&model, reqs, Parallelism::Sequential)))
        });
        group.bench_with_input(BenchmarkId::new("parallel", batch_size), &requests, |b, reqs| {
            b.iter(|| black_box(predict_batch(&model, reqs, Parallelism::Parallel)))
        });
    }

    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let bytes = write_binary(&build_model("--oaa 3"));
    let mut group = c.benchmark_group("io/binary");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("load", |b| b.iter(|| load_binary(black_box(&bytes)).unwrap()));
    group.finish();

    let model = build_model("");
    let request = build_request(3, 10);
    c.bench_function("predict/allocating", |b| b.iter(|| predict(&model, black_box(&request))));
}

criterion_group! {
    name = benches;
    config = bench_criterion();
    targets = bench_single, bench_batch, bench_load
}
criterion_main!(benches);
