//! Criterion benchmarks for the resampler
//!
//! Run with: cargo bench -p noisedp-process
#![allow(missing_docs)]

use chrono::{Duration, NaiveDate};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use noisedp_core::{Resolution, Stage, TimeSeries, Value};
use noisedp_process::{AverageType, Resample, ResampleParams};

const DAYS: &[i64] = &[1, 7, 28];

fn survey(days: i64) -> TimeSeries {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let n = days * 24 * 60;
    let index: Vec<_> = (0..n).map(|i| start + Duration::minutes(i)).collect();
    let level = |i: i64, base: f64| Value::Number(base + ((i * 7919) % 150) as f64 / 10.0);

    let mut series = TimeSeries::new(index).with_resolution(Resolution::minutes(1));
    for (name, base) in [
        ("LAeq_Main", 50.0),
        ("LAmax_Main", 65.0),
        ("LAmin_Main", 35.0),
        ("LA10_Main", 55.0),
        ("LA90_Main", 40.0),
    ] {
        series = series
            .with_column(name, (0..n).map(|i| level(i, base)).collect())
            .unwrap();
    }
    series
}

fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("Resample");

    for &days in DAYS {
        let series = survey(days);
        for avg in [AverageType::Mean, AverageType::Mode] {
            let stage = Resample::new(
                ResampleParams::new(Resolution::minutes(15), 'A', vec![10, 90])
                    .with_max_remove(1)
                    .with_avg_type(avg),
            );
            group.bench_with_input(
                BenchmarkId::new(avg.as_str(), format!("{days}d")),
                &series,
                |b, s| b.iter(|| black_box(stage.apply(black_box(s)).unwrap())),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_resample);
criterion_main!(benches);
