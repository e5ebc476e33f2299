// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Goal and goal-folder routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
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
use crate::models::{Goal, GoalFolder};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/goals", get(list_goals).post(create_goal))
        .route("/api/goals/{id}", put(update_goal).delete(delete_goal))
        .route("/api/goals/{id}/complete", post(complete_goal))
        .route("/api/goals/{id}/reopen", post(reopen_goal))
        .route("/api/folders", get(list_folders).post(create_folder))
        .route("/api/folders/{id}", put(update_folder).delete(delete_folder))
}

// ─── Requests / Responses ────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct GoalPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(exclusive_min = 0.0))]
    pub target_distance: f64,
    #[validate(range(min = 1))]
    pub target_duration_seconds: Option<u32>,
    #[validate(range(exclusive_min = 0.0))]
    pub target_speed: Option<f64>,
    pub deadline: Option<DateTime<Utc>>,
    pub folder_id: Option<Uuid>,
}

#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GoalResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub id: Uuid,
    pub name: String,
    pub target_distance: f64,
    pub target_duration_seconds: Option<u32>,
    /// Derived from distance and duration when both are set
    pub target_speed: Option<f64>,
    pub target_duration_display: Option<String>,
    pub deadline: Option<String>,
    pub completed: bool,
    pub completed_at: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub folder_id: Option<Uuid>,
}

impl GoalResponse {
    fn from_goal(goal: &Goal) -> Self {
        Self {
            id: goal.id,
            name: goal.name.clone(),
            target_distance: goal.target_distance,
            target_duration_seconds: goal.target_duration_seconds,
            target_speed: goal.effective_target_speed(),
            target_duration_display: goal.target_duration_seconds.map(metrics::format_duration),
            deadline: goal.deadline.map(format_utc_rfc3339),
            completed: goal.completed,
            completed_at: goal.completed_at.map(format_utc_rfc3339),
            folder_id: goal.folder_id,
        }
    }
}

#[derive(Deserialize, Validate)]
pub struct FolderPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FolderResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub id: Uuid,
    pub name: String,
    pub created_at: String,
    pub goal_count: u32,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteFolderResponse {
    /// Goals moved back to the root when their folder went away
    pub reparented_goals: u32,
}

// ─── Goals ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct GoalsQuery {
    /// Only goals filed under this folder
    folder: Option<Uuid>,
}

async fn list_goals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<GoalsQuery>,
) -> Result<Json<Vec<GoalResponse>>> {
    let goals = state
        .db
        .goals_for_user(user.user_id)
        .into_iter()
        .filter(|goal| params.folder.is_none_or(|folder| goal.folder_id == Some(folder)))
        .map(|goal| GoalResponse::from_goal(&goal))
        .collect();
    Ok(Json(goals))
}

/// Resolve the folder reference so a goal can never point at a folder the
/// user does not have.
fn check_folder_ref(
    state: &AppState,
    user_id: Uuid,
    folder_id: Option<Uuid>,
) -> Result<()> {
    if let Some(folder_id) = folder_id {
        if state.db.get_folder(user_id, folder_id).is_none() {
            return Err(AppError::BadRequest(format!(
                "Folder {folder_id} not found"
            )));
        }
    }
    Ok(())
}

async fn create_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<GoalPayload>,
) -> Result<(StatusCode, Json<GoalResponse>)> {
    payload.validate()?;
    check_folder_ref(&state, user.user_id, payload.folder_id)?;

    let goal = Goal {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        name: payload.name,
        target_distance: payload.target_distance,
        target_duration_seconds: payload.target_duration_seconds,
        target_speed: payload.target_speed,
        deadline: payload.deadline,
        completed: false,
        completed_at: None,
        folder_id: payload.folder_id,
    };
    state.db.upsert_goal(&goal).await?;

    tracing::info!(user_id = %user.user_id, goal_id = %goal.id, "Goal created");

    Ok((StatusCode::CREATED, Json(GoalResponse::from_goal(&goal))))
}

/// Replace a goal's definition. Completion state only changes through the
/// complete/reopen transitions. Changing `folder_id` moves the goal.
async fn update_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GoalPayload>,
) -> Result<Json<GoalResponse>> {
    payload.validate()?;
    check_folder_ref(&state, user.user_id, payload.folder_id)?;

    let mut goal = state
        .db
        .get_goal(user.user_id, id)
        .ok_or_else(|| AppError::NotFound(format!("Goal {id} not found")))?;

    goal.name = payload.name;
    goal.target_distance = payload.target_distance;
    goal.target_duration_seconds = payload.target_duration_seconds;
    goal.target_speed = payload.target_speed;
    goal.deadline = payload.deadline;
    goal.folder_id = payload.folder_id;
    state.db.upsert_goal(&goal).await?;

    Ok(Json(GoalResponse::from_goal(&goal)))
}

async fn delete_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.db.delete_goal(user.user_id, id).await? {
        return Err(AppError::NotFound(format!("Goal {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn complete_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalResponse>> {
    let mut goal = state
        .db
        .get_goal(user.user_id, id)
        .ok_or_else(|| AppError::NotFound(format!("Goal {id} not found")))?;

    // Completing twice keeps the original timestamp
    if !goal.completed {
        goal.complete(Utc::now());
        state.db.upsert_goal(&goal).await?;
        tracing::info!(user_id = %user.user_id, goal_id = %id, "Goal completed");
    }

    Ok(Json(GoalResponse::from_goal(&goal)))
}

async fn reopen_goal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalResponse>> {
    let mut goal = state
        .db
        .get_goal(user.user_id, id)
        .ok_or_else(|| AppError::NotFound(format!("Goal {id} not found")))?;

    if goal.completed {
        goal.reopen();
        state.db.upsert_goal(&goal).await?;
        tracing::info!(user_id = %user.user_id, goal_id = %id, "Goal reopened");
    }

    Ok(Json(GoalResponse::from_goal(&goal)))
}

// ─── Folders ─────────────────────────────────────────────────

async fn list_folders(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<FolderResponse>>> {
    let goals = state.db.goals_for_user(user.user_id);
    let folders = state
        .db
        .folders_for_user(user.user_id)
        .into_iter()
        .map(|folder| {
            let goal_count = goals
                .iter()
                .filter(|goal| goal.folder_id == Some(folder.id))
                .count() as u32;
            FolderResponse {
                id: folder.id,
                name: folder.name,
                created_at: format_utc_rfc3339(folder.created_at),
                goal_count,
            }
        })
        .collect();
    Ok(Json(folders))
}

async fn create_folder(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<FolderPayload>,
) -> Result<(StatusCode, Json<FolderResponse>)> {
    payload.validate()?;

    let folder = GoalFolder {
        id: Uuid::new_v4(),
        user_id: user.user_id,
        name: payload.name,
        created_at: Utc::now(),
    };
    state.db.upsert_folder(&folder).await?;

    Ok((
        StatusCode::CREATED,
        Json(FolderResponse {
            id: folder.id,
            name: folder.name,
            created_at: format_utc_rfc3339(folder.created_at),
            goal_count: 0,
        }),
    ))
}

async fn update_folder(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FolderPayload>,
) -> Result<Json<FolderResponse>> {
    payload.validate()?;

    let mut folder = state
        .db
        .get_folder(user.user_id, id)
        .ok_or_else(|| AppError::NotFound(format!("Folder {id} not found")))?;

    folder.name = payload.name;
    state.db.upsert_folder(&folder).await?;

    let goal_count = state
        .db
        .goals_for_user(user.user_id)
        .iter()
        .filter(|goal| goal.folder_id == Some(folder.id))
        .count() as u32;

    Ok(Json(FolderResponse {
        id: folder.id,
        name: folder.name,
        created_at: format_utc_rfc3339(folder.created_at),
        goal_count,
    }))
}

/// Delete a folder; its goals move back to the root rather than cascading.
async fn delete_folder(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteFolderResponse>> {
    let reparented = state
        .db
        .delete_folder(user.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Folder {id} not found")))?;

    Ok(Json(DeleteFolderResponse {
        reparented_goals: reparented,
    }))
}
