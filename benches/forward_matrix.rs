use chrono::Duration;
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use volterm::event::{CalendarModel, decompose};
use volterm::matrix::build_forward_vol_matrix;
use volterm::{Date, VarianceTermStructure};

fn trade_date() -> Date {
    Date::from_ymd_opt(2024, 3, 1).unwrap()
}

/// Weekly expiries with a gently rising term structure.
fn weekly_strip(n: usize) -> Vec<(Date, f64)> {
    (1..=n)
        .map(|k| (trade_date() + Duration::days(7 * k as i64), 20.0 + 0.1 * k as f64))
        .collect()
}

fn forward_vol_benchmarks(c: &mut Criterion) {
    let ts = VarianceTermStructure::new(trade_date()).unwrap();
    c.bench_function("forward_vol_pair", |b| {
        b.iter(|| {
            ts.forward_vol(
                black_box(40.0),
                black_box("2024-03-21"),
                black_box(42.0),
                black_box("2024-03-31"),
            )
        })
    });

    let mut group = c.benchmark_group("forward_vol_matrix");
    for n in [8, 32, 128] {
        let strip = weekly_strip(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &strip, |b, strip| {
            b.iter(|| build_forward_vol_matrix(strip.iter().copied(), trade_date()))
        });
    }
    group.finish();

    c.bench_function("event_decompose", |b| {
        b.iter(|| {
            decompose(
                "2024-03-01",
                "2024-03-21",
                "2024-03-10",
                black_box(40.0),
                black_box(3.0),
                &CalendarModel::ExpectedMove,
            )
        })
    });
}

criterion_group!(benches, forward_vol_benchmarks);
criterion_main!(benches);
