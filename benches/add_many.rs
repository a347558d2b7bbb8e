//! This bench test simulates scheduling many activities on a trip, and loading
//! a large directory of trips.

#![allow(missing_docs)]

use std::path::PathBuf;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use tempfile::TempDir;
use tripplan::{Budget, Directory, ScheduledActivity, TripPlan, domain::text::required};

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Activities every 97 minutes, so most days get several in shuffled order.
fn activities(count: i64) -> Vec<ScheduledActivity> {
    (0..count)
        .map(|i| {
            let offset = (i * 7919) % count;
            ScheduledActivity::new(
                start() + Duration::minutes(offset * 97),
                required("name", &format!("Activity {i}")).unwrap(),
            )
        })
        .collect()
}

fn trip(activities: Vec<ScheduledActivity>) -> TripPlan {
    let mut trip = TripPlan::new(
        required("destination", "Tokyo").unwrap(),
        start().date(),
        start().date() + Duration::days(30),
        Budget::from_cents(500_000),
    );
    for activity in activities {
        trip.add_activity(activity.day(), activity).unwrap();
    }
    trip
}

/// Writes a directory of trips with activities.
fn preseed_directory(path: PathBuf) {
    let mut directory = Directory::new(path).load_all().unwrap();
    for _ in 0..50 {
        directory.add_trip(trip(activities(40))).unwrap();
    }
}

fn add_many(c: &mut Criterion) {
    c.bench_function("add 1000 activities", |b| {
        b.iter_batched(
            || activities(1000),
            trip,
            BatchSize::SmallInput,
        );
    });
}

fn load_all(c: &mut Criterion) {
    let tmp_dir = TempDir::new().unwrap();
    preseed_directory(tmp_dir.path().to_path_buf());

    c.bench_function("load 50 trips", |b| {
        b.iter(|| {
            Directory::new(tmp_dir.path().to_path_buf())
                .load_all()
                .unwrap()
        });
    });
}

criterion_group!(benches, add_many, load_all);
criterion_main!(benches);
