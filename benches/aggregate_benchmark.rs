use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use runlog::models::{Aggregate, Run, RunDuration};
use runlog::services::window;

fn synthetic_runs(count: u32) -> Vec<Run> {
    (0..count)
        .map(|i| Run {
            id: u64::from(i) + 1,
            user: 1,
            shoe: None,
            date: NaiveDate::from_ymd_opt(2021, 6, 14).expect("valid date"),
            duration: RunDuration::from_parts(0, 30 + (i % 45), i % 60).expect("valid duration"),
            distance: 3.0 + f64::from(i % 10),
            average_heart_rate: if i % 3 == 0 { None } else { Some(120 + i % 60) },
            calories: Some(300 + i % 400),
            zone: None,
        })
        .collect()
}

fn benchmark_aggregate_fold(c: &mut Criterion) {
    let first = NaiveDate::from_ymd_opt(2021, 6, 14).expect("valid date");
    let last = NaiveDate::from_ymd_opt(2021, 6, 20).expect("valid date");

    let mut group = c.benchmark_group("aggregate_fold");
    for size in [10u32, 1_000, 10_000] {
        let runs = synthetic_runs(size);
        group.bench_function(format!("fold_{}_runs", size), |b| {
            b.iter(|| Aggregate::compute(Some(1), first, last, black_box(&runs)))
        });
    }
    group.finish();
}

fn benchmark_window_generation(c: &mut Criterion) {
    let start = NaiveDate::from_ymd_opt(2021, 6, 16).expect("valid date");

    c.bench_function("trailing_52_weeks", |b| {
        b.iter(|| window::trailing_weeks(black_box(start), 52))
    });
    c.bench_function("trailing_24_months", |b| {
        b.iter(|| window::trailing_months(black_box(start), 24))
    });
}

criterion_group!(
    benches,
    benchmark_aggregate_fold,
    benchmark_window_generation
);
criterion_main!(benches);
