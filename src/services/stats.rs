// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Time-bucket aggregation and run classification.
//!
//! Buckets are aligned, contiguous and zero-filled over the requested range
//! so chart axes stay gap-free. Weekly buckets start on the configured week
//! start (Monday by default, the ISO-8601 convention); shifting the start
//! day moves every week boundary, so the convention lives in one place.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::{ActivityKind, Run};

/// Bucket granularity for time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

/// One time bucket in a series.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Bucket {
    /// First day covered by the bucket
    pub start: NaiveDate,
    /// Display label (`2024-03-15`, `Week of 2024-03-11`, `March 2024`)
    pub label: String,
    /// Records whose date falls inside the bucket
    pub count: u32,
    /// Sum of the per-record weight (distance for runs)
    pub total_distance: f64,
}

/// Align a date onto the start of its bucket.
fn bucket_start(date: NaiveDate, granularity: Granularity, week_start: Weekday) -> NaiveDate {
    match granularity {
        Granularity::Day => date,
        Granularity::Week => {
            let back = date.weekday().days_since(week_start);
            date - Days::new(u64::from(back))
        }
        Granularity::Month => date.with_day(1).unwrap_or(date),
    }
}

/// First day of the bucket after `start`.
fn next_bucket(start: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => start + Days::new(1),
        Granularity::Week => start + Days::new(7),
        Granularity::Month => start + Months::new(1),
    }
}

fn bucket_label(start: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day => start.format("%Y-%m-%d").to_string(),
        Granularity::Week => format!("Week of {}", start.format("%Y-%m-%d")),
        Granularity::Month => start.format("%B %Y").to_string(),
    }
}

/// Partition dated records into contiguous buckets covering `from..=to`.
///
/// Every record inside the range lands in exactly one bucket; records
/// outside it are dropped. Buckets with no records still appear with a
/// zero count. Items are `(date, weight)` pairs; pass a weight of zero
/// when only counts matter.
pub fn bucket_series(
    items: &[(NaiveDate, f64)],
    from: NaiveDate,
    to: NaiveDate,
    granularity: Granularity,
    week_start: Weekday,
) -> Vec<Bucket> {
    if from > to {
        return Vec::new();
    }

    let mut buckets = Vec::new();
    let mut start = bucket_start(from, granularity, week_start);
    while start <= to {
        buckets.push(Bucket {
            start,
            label: bucket_label(start, granularity),
            count: 0,
            total_distance: 0.0,
        });
        start = next_bucket(start, granularity);
    }

    let first = buckets[0].start;
    for &(date, weight) in items {
        if date < from || date > to {
            continue;
        }
        let aligned = bucket_start(date, granularity, week_start);
        // Position by bucket index; alignment is total over the range
        let index = buckets
            .partition_point(|bucket| bucket.start < aligned)
            .min(buckets.len() - 1);
        debug_assert!(aligned >= first);
        buckets[index].count += 1;
        buckets[index].total_distance += weight;
    }

    buckets
}

/// Inclusive bounds of the week containing `date`.
pub fn week_bounds(date: NaiveDate, week_start: Weekday) -> (NaiveDate, NaiveDate) {
    let start = bucket_start(date, Granularity::Week, week_start);
    (start, start + Days::new(6))
}

/// Inclusive bounds of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = bucket_start(date, Granularity::Month, Weekday::Mon);
    (start, start + Months::new(1) - Days::new(1))
}

// ─── Activity counts ─────────────────────────────────────────────

/// Per-kind activity counts for a date window.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct KindCounts {
    pub strength: u32,
    pub abs: u32,
    pub cardio: u32,
    pub other: u32,
}

impl KindCounts {
    pub fn tally(items: &[(NaiveDate, ActivityKind)], from: NaiveDate, to: NaiveDate) -> Self {
        let mut counts = Self::default();
        for &(date, kind) in items {
            if date < from || date > to {
                continue;
            }
            match kind {
                ActivityKind::Strength => counts.strength += 1,
                ActivityKind::Abs => counts.abs += 1,
                ActivityKind::Cardio => counts.cardio += 1,
                ActivityKind::Other => counts.other += 1,
            }
        }
        counts
    }
}

// ─── Distance bands ──────────────────────────────────────────────

/// Range partition of runs over ascending distance breakpoints.
///
/// The thresholds have drifted between revisions of this system, so they
/// are configuration (`DISTANCE_BANDS`, or per request) rather than code.
#[derive(Debug, Clone)]
pub struct DistanceBands {
    breakpoints: Vec<f64>,
}

/// One band in a distance partition.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Band {
    /// Display label (`0 - 4`, `4 - 5`, `> 7`)
    pub label: String,
    pub count: u32,
}

impl DistanceBands {
    /// Breakpoints must be ascending and positive; the caller validates.
    pub fn new(breakpoints: Vec<f64>) -> Self {
        Self { breakpoints }
    }

    /// Index of the band containing `distance`.
    ///
    /// Band `i` holds distances in `(breakpoints[i-1], breakpoints[i]]`;
    /// the final band is everything above the last breakpoint.
    pub fn band_index(&self, distance: f64) -> usize {
        self.breakpoints.partition_point(|bp| distance > *bp)
    }

    /// Count distances per band, including empty bands.
    pub fn partition(&self, distances: impl IntoIterator<Item = f64>) -> Vec<Band> {
        let mut bands: Vec<Band> = (0..=self.breakpoints.len())
            .map(|i| Band {
                label: self.label(i),
                count: 0,
            })
            .collect();
        for distance in distances {
            bands[self.band_index(distance)].count += 1;
        }
        bands
    }

    fn label(&self, index: usize) -> String {
        if index == 0 {
            format!("0 - {}", self.breakpoints[0])
        } else if index == self.breakpoints.len() {
            format!("> {}", self.breakpoints[index - 1])
        } else {
            format!("{} - {}", self.breakpoints[index - 1], self.breakpoints[index])
        }
    }
}

// ─── Run summary ─────────────────────────────────────────────────

/// Totals and averages over a user's runs.
///
/// Averages are means of the per-run values (what the stats page has
/// always shown), not distance-weighted.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total_runs: u32,
    pub total_distance: f64,
    pub average_speed: Option<f64>,
    pub average_pace: Option<f64>,
}

pub fn summarize_runs(runs: &[Run]) -> RunSummary {
    let total_runs = runs.len() as u32;
    let total_distance = runs.iter().map(|run| run.distance).sum();

    let speeds: Vec<f64> = runs.iter().filter_map(Run::speed).collect();
    let paces: Vec<f64> = runs.iter().filter_map(Run::pace).collect();

    let mean = |values: &[f64]| {
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    };

    RunSummary {
        total_runs,
        total_distance,
        average_speed: mean(&speeds),
        average_pace: mean(&paces),
    }
}
