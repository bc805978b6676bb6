//! Matching benchmarks.
//!
//! Run with: `cargo bench -p daedalus-router`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use daedalus_router::RouteMatcher;
use http::Method;

fn build_matcher(num_routes: usize) -> RouteMatcher {
    let mut matcher = RouteMatcher::new();

    for i in 0..num_routes / 3 {
        matcher
            .insert(Method::GET, &format!("/api/v1/resource{i}"))
            .expect("valid template");
    }

    for i in 0..num_routes / 3 {
        matcher
            .insert(Method::GET, &format!("/api/v1/resource{i}/{{id}}"))
            .expect("valid template");
    }

    for i in 0..num_routes / 3 {
        matcher
            .insert(
                Method::GET,
                &format!("/api/v1/org/{{orgId}}/resource{i}/{{id}}"),
            )
            .expect("valid template");
    }

    matcher
}

fn bench_static_match(c: &mut Criterion) {
    let matcher = build_matcher(100);

    c.bench_function("static_match", |b| {
        b.iter(|| black_box(matcher.match_route(&Method::GET, "/api/v1/resource30")));
    });
}

fn bench_param_match(c: &mut Criterion) {
    let matcher = build_matcher(100);

    c.bench_function("param_match", |b| {
        b.iter(|| black_box(matcher.match_route(&Method::GET, "/api/v1/resource25/12345")));
    });
}

fn bench_miss(c: &mut Criterion) {
    let matcher = build_matcher(100);

    c.bench_function("miss", |b| {
        b.iter(|| black_box(matcher.match_route(&Method::GET, "/nonexistent/path")));
    });
}

fn bench_table_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_size");

    for size in [12, 48, 192] {
        let matcher = build_matcher(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &matcher, |b, m| {
            b.iter(|| black_box(m.match_route(&Method::GET, "/api/v1/org/acme/resource3/9")));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_static_match,
    bench_param_match,
    bench_miss,
    bench_table_size
);
criterion_main!(benches);
