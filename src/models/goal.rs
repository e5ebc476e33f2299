// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Goal and goal-folder models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics;

/// Stored goal record.
///
/// The only state transitions are active → completed (stamps
/// `completed_at`) and completed → active (clears it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    /// Record ID
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Display name
    pub name: String,
    /// Target distance, validated positive before storage
    pub target_distance: f64,
    /// Target time in seconds
    pub target_duration_seconds: Option<u32>,
    /// Explicit target speed; only consulted when no duration is set
    pub target_speed: Option<f64>,
    /// Optional deadline
    pub deadline: Option<DateTime<Utc>>,
    /// Whether the goal has been reached
    pub completed: bool,
    /// When the goal was marked reached
    pub completed_at: Option<DateTime<Utc>>,
    /// Folder the goal is filed under, if any
    pub folder_id: Option<Uuid>,
}

impl Goal {
    /// Target speed in unit distances per hour.
    ///
    /// Derived from distance and duration when a duration is set; a stored
    /// explicit speed is only a fallback for goals without one, so the two
    /// sources can never disagree.
    pub fn effective_target_speed(&self) -> Option<f64> {
        match self.target_duration_seconds {
            Some(seconds) => metrics::speed(self.target_distance, seconds),
            None => self.target_speed,
        }
    }

    /// Mark the goal reached.
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.completed = true;
        self.completed_at = Some(now);
    }

    /// Put a completed goal back in play.
    pub fn reopen(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }
}

/// Folder grouping goals by reference; goals carry the `folder_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalFolder {
    /// Record ID
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Display name
    pub name: String,
    /// When the folder was created
    pub created_at: DateTime<Utc>,
}
