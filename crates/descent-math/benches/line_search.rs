//! Benchmarks for the line-search primitives.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use descent_math::linesearch::{bracket_minimum, brent_minimize, LineSearchConfig};

fn bench_bracket(c: &mut Criterion) {
    c.bench_function("bracket_quadratic", |bench| {
        let f = |t: f64| (t - 3.14) * (t - 3.14);
        bench.iter(|| bracket_minimum(f, black_box(0.0), black_box(1.0), f(0.0)));
    });
}

fn bench_minimize(c: &mut Criterion) {
    let config = LineSearchConfig::default().with_max_iterations(50);

    c.bench_function("minimize_quadratic", |bench| {
        let f = |t: f64| (t - 3.14) * (t - 3.14);
        bench.iter(|| brent_minimize(f, black_box(f(0.0)), &config));
    });

    c.bench_function("minimize_quartic", |bench| {
        let f = |t: f64| (t - 2.0).powi(4) + 0.5 * (t - 2.0) * (t - 2.0);
        bench.iter(|| brent_minimize(f, black_box(f(0.0)), &config));
    });
}

criterion_group!(benches, bench_bracket, bench_minimize);
criterion_main!(benches);
