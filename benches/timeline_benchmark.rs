use chrono::{Days, NaiveDate, Weekday};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stride_tracker::services::stats::{bucket_series, Granularity};

/// Three years of synthetic run dates, a handful per week.
fn synthetic_runs(count: usize) -> (Vec<(NaiveDate, f64)>, NaiveDate, NaiveDate) {
    let from = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    let to = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let span = (to - from).num_days() as u64;

    // Small LCG keeps the dataset deterministic across runs
    let mut seed: u64 = 0x5eed_cafe;
    let mut next = move || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        seed >> 33
    };

    let items = (0..count)
        .map(|_| {
            let offset = next() % (span + 1);
            let distance = 3.0 + (next() % 80) as f64 / 10.0;
            (from + Days::new(offset), distance)
        })
        .collect();
    (items, from, to)
}

fn benchmark_bucket_series(c: &mut Criterion) {
    let (items, from, to) = synthetic_runs(5_000);

    let mut group = c.benchmark_group("bucket_series");

    for (name, granularity) in [
        ("daily_3_years", Granularity::Day),
        ("weekly_3_years", Granularity::Week),
        ("monthly_3_years", Granularity::Month),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                bucket_series(
                    black_box(&items),
                    black_box(from),
                    black_box(to),
                    granularity,
                    Weekday::Mon,
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_bucket_series);
criterion_main!(benches);
