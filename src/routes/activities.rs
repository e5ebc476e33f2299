// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity CRUD routes.
//!
//! Listings merge stored activities with read-time cardio projections of
//! runs. A projection shares its run's ID; edits and deletes addressed to
//! it are routed to the run, so the two views cannot drift apart.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Activity, ActivityKind};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(list_activities).post(create_activity))
        .route(
            "/api/activities/{id}",
            put(update_activity).delete(delete_activity),
        )
}

// ─── Requests / Responses ────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct ActivityPayload {
    pub date: DateTime<Utc>,
    pub kind: ActivityKind,
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 10080))]
    pub duration_minutes: u32,
}

#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub id: Uuid,
    pub date: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub kind: ActivityKind,
    pub name: Option<String>,
    pub duration_minutes: u32,
    /// True for the cardio view of a run; mutate it through the run's ID
    pub derived_from_run: bool,
}

impl ActivityResponse {
    fn new(activity: &Activity, derived_from_run: bool) -> Self {
        Self {
            id: activity.id,
            date: format_utc_rfc3339(activity.date),
            kind: activity.kind,
            name: activity.name.clone(),
            duration_minutes: activity.duration_minutes,
            derived_from_run,
        }
    }
}

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Earliest calendar day to include
    from: Option<NaiveDate>,
    /// Latest calendar day to include
    to: Option<NaiveDate>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitiesResponse {
    pub activities: Vec<ActivityResponse>,
    pub total: u32,
}

/// Stored activities plus run projections, most recent first.
pub(crate) fn merged_for_user(state: &AppState, user_id: Uuid) -> Vec<(Activity, bool)> {
    let mut merged: Vec<(Activity, bool)> = state
        .db
        .activities_for_user(user_id)
        .into_iter()
        .map(|activity| (activity, false))
        .collect();
    merged.extend(
        state
            .db
            .runs_for_user(user_id)
            .iter()
            .map(|run| (Activity::from_run(run), true)),
    );
    merged.sort_by(|a, b| b.0.date.cmp(&a.0.date).then_with(|| b.0.id.cmp(&a.0.id)));
    merged
}

// ─── Handlers ────────────────────────────────────────────────

/// Get the user's activity history (the calendar view).
async fn list_activities(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ActivitiesQuery>,
) -> Result<Json<ActivitiesResponse>> {
    if let (Some(from), Some(to)) = (params.from, params.to) {
        if from > to {
            return Err(AppError::BadRequest(
                "'from' must not be after 'to'".to_string(),
            ));
        }
    }

    let activities: Vec<ActivityResponse> = merged_for_user(&state, user.user_id)
        .into_iter()
        .filter(|(activity, _)| {
            let day = activity.date.date_naive();
            params.from.is_none_or(|from| day >= from)
                && params.to.is_none_or(|to| day <= to)
        })
        .map(|(activity, derived)| ActivityResponse::new(&activity, derived))
        .collect();

    let total = activities.len() as u32;
    Ok(Json(ActivitiesResponse { activities, total }))
}

async fn create_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ActivityPayload>,
) -> Result<(StatusCode, Json<ActivityResponse>)> {
    payload.validate()?;

    let activity = Activity {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        date: payload.date,
        kind: payload.kind,
        name: payload.name,
        duration_minutes: payload.duration_minutes,
    };
    state.db.upsert_activity(&activity).await?;

    tracing::info!(user_id = %user.user_id, activity_id = %activity.id, "Activity recorded");

    Ok((
        StatusCode::CREATED,
        Json(ActivityResponse::new(&activity, false)),
    ))
}

/// Replace an activity. Addressing a run projection edits the run itself
/// (its date, name and duration; the kind must stay cardio).
async fn update_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ActivityPayload>,
) -> Result<Json<ActivityResponse>> {
    payload.validate()?;

    if let Some(mut activity) = state.db.get_activity(user.user_id, id) {
        activity.date = payload.date;
        activity.kind = payload.kind;
        activity.name = payload.name;
        activity.duration_minutes = payload.duration_minutes;
        state.db.upsert_activity(&activity).await?;
        return Ok(Json(ActivityResponse::new(&activity, false)));
    }

    if let Some(mut run) = state.db.get_run(user.user_id, id) {
        if payload.kind != ActivityKind::Cardio {
            return Err(AppError::BadRequest(
                "A run's activity view is always cardio; edit the run to change it".to_string(),
            ));
        }
        run.date = payload.date;
        run.name = payload.name;
        run.duration_seconds = payload.duration_minutes * 60;
        state.db.upsert_run(&run).await?;
        return Ok(Json(ActivityResponse::new(&Activity::from_run(&run), true)));
    }

    Err(AppError::NotFound(format!("Activity {id} not found")))
}

/// Delete an activity. Addressing a run projection deletes the run.
async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if state.db.delete_activity(user.user_id, id).await? {
        return Ok(StatusCode::NO_CONTENT);
    }
    if state.db.delete_run(user.user_id, id).await? {
        tracing::info!(user_id = %user.user_id, run_id = %id, "Run deleted via activity view");
        return Ok(StatusCode::NO_CONTENT);
    }

    Err(AppError::NotFound(format!("Activity {id} not found")))
}
