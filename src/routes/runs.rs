// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run CRUD routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::metrics;
use crate::middleware::auth::AuthUser;
use crate::models::{DistanceUnit, Run};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/runs", get(list_runs).post(create_run))
        .route("/api/runs/{id}", put(update_run).delete(delete_run))
}

// ─── Requests / Responses ────────────────────────────────────

fn default_unit() -> DistanceUnit {
    DistanceUnit::Km
}

#[derive(Deserialize, Validate)]
pub struct RunPayload {
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub date: DateTime<Utc>,
    #[validate(range(exclusive_min = 0.0))]
    pub distance: f64,
    #[validate(range(min = 1))]
    pub duration_seconds: u32,
    #[serde(default = "default_unit")]
    pub unit: DistanceUnit,
}

/// Run response with metrics derived from the stored inputs.
#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RunResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub id: Uuid,
    pub date: String,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub distance: f64,
    pub duration_seconds: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub unit: DistanceUnit,
    /// Minutes per unit distance, recomputed on every read
    pub pace: Option<f64>,
    /// Unit distances per hour, recomputed on every read
    pub speed: Option<f64>,
    pub pace_display: Option<String>,
    pub duration_display: String,
}

impl RunResponse {
    fn from_run(run: &Run) -> Self {
        let pace = run.pace();
        Self {
            id: run.id,
            date: format_utc_rfc3339(run.date),
            name: run.name.clone(),
            notes: run.notes.clone(),
            distance: run.distance,
            duration_seconds: run.duration_seconds,
            unit: run.unit,
            pace,
            speed: run.speed(),
            pace_display: pace.map(|p| metrics::format_pace(p, run.unit)),
            duration_display: metrics::format_duration(run.duration_seconds),
        }
    }
}

// ─── Listing with cursor pagination ──────────────────────────

#[derive(Deserialize)]
struct RunsQuery {
    /// Filter by start date (RFC3339)
    after: Option<String>,
    /// Cursor for forward pagination (opaque token).
    cursor: Option<String>,
    /// Pagination: items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    50
}

const MAX_PER_PAGE: u32 = 100;
const CURSOR_PARTS: usize = 3;

/// Position of the last run on the previous page.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RunQueryCursor {
    date: DateTime<Utc>,
    run_id: Uuid,
}

fn parse_after_timestamp(after: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    after
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| {
                    AppError::BadRequest(
                        "Invalid 'after' parameter: must be RFC3339 datetime".to_string(),
                    )
                })
        })
        .transpose()
}

fn parse_cursor(cursor: Option<&str>) -> Result<Option<RunQueryCursor>> {
    cursor
        .map(|raw| {
            let invalid_cursor =
                || AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;

            let parts: Vec<&str> = decoded_str.split(':').collect();
            if parts.len() != CURSOR_PARTS {
                return Err(invalid_cursor());
            }

            let seconds = parts[0].parse::<i64>().map_err(|_| invalid_cursor())?;
            let nanos = parts[1].parse::<u32>().map_err(|_| invalid_cursor())?;
            let run_id = parts[2].parse::<Uuid>().map_err(|_| invalid_cursor())?;
            let date = DateTime::from_timestamp(seconds, nanos).ok_or_else(invalid_cursor)?;

            Ok(RunQueryCursor { date, run_id })
        })
        .transpose()
}

fn encode_cursor(cursor: RunQueryCursor) -> String {
    let payload = format!(
        "{}:{}:{}",
        cursor.date.timestamp(),
        cursor.date.timestamp_subsec_nanos(),
        cursor.run_id
    );
    URL_SAFE_NO_PAD.encode(payload)
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RunsResponse {
    pub runs: Vec<RunResponse>,
    pub per_page: u32,
    /// Total number of runs matching the query.
    pub total: u32,
    pub next_cursor: Option<String>,
}

/// Get user's runs, most recent first, with optional filtering.
async fn list_runs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<RunsQuery>,
) -> Result<Json<RunsResponse>> {
    tracing::debug!(
        user_id = %user.user_id,
        after = ?params.after,
        cursor = ?params.cursor,
        "Fetching runs"
    );

    let limit = params.per_page.clamp(1, MAX_PER_PAGE) as usize;
    let after = parse_after_timestamp(params.after.as_deref())?;
    let cursor = parse_cursor(params.cursor.as_deref())?;

    let mut runs = state.db.runs_for_user(user.user_id);
    if let Some(after) = after {
        runs.retain(|run| run.date > after);
    }
    let total = runs.len() as u32;

    // The list is ordered (date desc, id desc); the cursor marks the last
    // run of the previous page, so keep what sorts strictly after it.
    if let Some(cursor) = cursor {
        runs.retain(|run| {
            run.date < cursor.date || (run.date == cursor.date && run.id < cursor.run_id)
        });
    }

    let has_more = runs.len() > limit;
    runs.truncate(limit);

    let next_cursor = if has_more {
        runs.last().map(|run| {
            encode_cursor(RunQueryCursor {
                date: run.date,
                run_id: run.id,
            })
        })
    } else {
        None
    };

    Ok(Json(RunsResponse {
        runs: runs.iter().map(RunResponse::from_run).collect(),
        per_page: limit as u32,
        total,
        next_cursor,
    }))
}

// ─── Mutations ───────────────────────────────────────────────

/// Record a new run. Pace and speed come back derived, never stored.
async fn create_run(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RunPayload>,
) -> Result<(StatusCode, Json<RunResponse>)> {
    payload.validate()?;

    let run = Run {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        date: payload.date,
        name: payload.name,
        notes: payload.notes,
        distance: payload.distance,
        duration_seconds: payload.duration_seconds,
        unit: payload.unit,
    };
    state.db.upsert_run(&run).await?;

    tracing::info!(user_id = %user.user_id, run_id = %run.id, "Run recorded");

    Ok((StatusCode::CREATED, Json(RunResponse::from_run(&run))))
}

/// Replace a run's fields; derived metrics follow on the next read.
async fn update_run(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RunPayload>,
) -> Result<Json<RunResponse>> {
    payload.validate()?;

    let mut run = state
        .db
        .get_run(user.user_id, id)
        .ok_or_else(|| AppError::NotFound(format!("Run {id} not found")))?;

    run.date = payload.date;
    run.name = payload.name;
    run.notes = payload.notes;
    run.distance = payload.distance;
    run.duration_seconds = payload.duration_seconds;
    run.unit = payload.unit;
    state.db.upsert_run(&run).await?;

    Ok(Json(RunResponse::from_run(&run)))
}

async fn delete_run(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.db.delete_run(user.user_id, id).await? {
        return Err(AppError::NotFound(format!("Run {id} not found")));
    }

    tracing::info!(user_id = %user.user_id, run_id = %id, "Run deleted");
    Ok(StatusCode::NO_CONTENT)
}
