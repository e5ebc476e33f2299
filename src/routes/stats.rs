// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Statistics routes: summaries, time-bucket series, distance bands.

use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::auth::AuthUser;
use crate::models::DistanceUnit;
use crate::routes::activities::merged_for_user;
use crate::services::stats::{
    bucket_series, month_bounds, summarize_runs, week_bounds, Band, Bucket, DistanceBands,
    Granularity, KindCounts,
};
use crate::AppState;

/// Upper bound on buckets per timeline request.
const MAX_BUCKETS: i64 = 1000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/stats/runs", get(run_summary))
        .route("/api/stats/timeline", get(timeline))
        .route("/api/stats/activities", get(activity_counts))
        .route("/api/stats/distance-bands", get(distance_bands))
}

// ─── Run summary ─────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RunSummaryResponse {
    pub total_runs: u32,
    pub total_distance: f64,
    pub average_speed: Option<f64>,
    pub average_pace: Option<f64>,
    pub average_pace_display: Option<String>,
}

/// Totals and averages across the user's runs.
async fn run_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<RunSummaryResponse>> {
    let runs = state.db.runs_for_user(user.user_id);
    let summary = summarize_runs(&runs);

    Ok(Json(RunSummaryResponse {
        total_runs: summary.total_runs,
        total_distance: summary.total_distance,
        average_speed: summary.average_speed,
        average_pace: summary.average_pace,
        // The stats page has always shown paces per kilometre
        average_pace_display: summary
            .average_pace
            .map(|pace| metrics::format_pace(pace, DistanceUnit::Km)),
    }))
}

// ─── Timeline ────────────────────────────────────────────────

fn default_granularity() -> Granularity {
    Granularity::Month
}

#[derive(Deserialize)]
struct TimelineQuery {
    #[serde(default = "default_granularity")]
    granularity: Granularity,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct TimelineResponse {
    pub buckets: Vec<Bucket>,
}

/// Run counts and distance per bucket, zero-filled across the range.
async fn timeline(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<TimelineQuery>,
) -> Result<Json<TimelineResponse>> {
    let (from, to) = match (params.from, params.to) {
        (Some(from), Some(to)) => (from, to),
        _ => {
            return Err(AppError::BadRequest(
                "'from' and 'to' are required (YYYY-MM-DD)".to_string(),
            ))
        }
    };
    if from > to {
        return Err(AppError::BadRequest(
            "'from' must not be after 'to'".to_string(),
        ));
    }

    let span_days = (to - from).num_days() + 1;
    let bucket_estimate = match params.granularity {
        Granularity::Day => span_days,
        Granularity::Week => span_days / 7 + 1,
        Granularity::Month => span_days / 28 + 1,
    };
    if bucket_estimate > MAX_BUCKETS {
        return Err(AppError::BadRequest(
            "Requested range produces too many buckets".to_string(),
        ));
    }

    let items: Vec<(NaiveDate, f64)> = state
        .db
        .runs_for_user(user.user_id)
        .iter()
        .map(|run| (run.date.date_naive(), run.distance))
        .collect();

    let buckets = bucket_series(
        &items,
        from,
        to,
        params.granularity,
        state.config.week_start,
    );
    Ok(Json(TimelineResponse { buckets }))
}

// ─── Activity counts ─────────────────────────────────────────

#[derive(Serialize)]
pub struct ActivityCountsResponse {
    pub week_start: NaiveDate,
    pub week: KindCounts,
    pub month_start: NaiveDate,
    pub month: KindCounts,
}

/// Per-kind activity counts for the current week and month.
///
/// Counts run projections too, so a run shows up as cardio here just as
/// it does in the history.
async fn activity_counts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ActivityCountsResponse>> {
    let items: Vec<_> = merged_for_user(&state, user.user_id)
        .into_iter()
        .map(|(activity, _)| (activity.date.date_naive(), activity.kind))
        .collect();

    let today = Utc::now().date_naive();
    let (week_from, week_to) = week_bounds(today, state.config.week_start);
    let (month_from, month_to) = month_bounds(today);

    Ok(Json(ActivityCountsResponse {
        week_start: week_from,
        week: KindCounts::tally(&items, week_from, week_to),
        month_start: month_from,
        month: KindCounts::tally(&items, month_from, month_to),
    }))
}

// ─── Distance bands ──────────────────────────────────────────

#[derive(Deserialize)]
struct DistanceBandsQuery {
    /// Comma-separated ascending breakpoints overriding the configured set
    breakpoints: Option<String>,
}

#[derive(Serialize)]
pub struct DistanceBandsResponse {
    pub bands: Vec<Band>,
}

fn parse_breakpoints(raw: &str) -> Result<Vec<f64>> {
    let invalid = || {
        AppError::BadRequest(
            "Invalid 'breakpoints': expected ascending positive numbers".to_string(),
        )
    };

    let breakpoints: Vec<f64> = raw
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|_| invalid()))
        .collect::<Result<Vec<f64>>>()?;

    let ascending = breakpoints.windows(2).all(|pair| pair[0] < pair[1]);
    if breakpoints.is_empty() || !ascending || breakpoints[0] <= 0.0 {
        return Err(invalid());
    }
    Ok(breakpoints)
}

/// Classify the user's runs into distance bands.
async fn distance_bands(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<DistanceBandsQuery>,
) -> Result<Json<DistanceBandsResponse>> {
    let breakpoints = match params.breakpoints.as_deref() {
        Some(raw) => parse_breakpoints(raw)?,
        None => state.config.distance_bands.clone(),
    };

    let bands = DistanceBands::new(breakpoints)
        .partition(state.db.runs_for_user(user.user_id).iter().map(|run| run.distance));

    Ok(Json(DistanceBandsResponse { bands }))
}
