// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Secondary activity model (strength, abs, cardio, other).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Run;

/// Closed set of activity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Strength,
    Abs,
    Cardio,
    Other,
}

/// Stored activity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Record ID
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// When the activity happened
    pub date: DateTime<Utc>,
    /// Activity kind
    pub kind: ActivityKind,
    /// Display name
    pub name: Option<String>,
    /// Duration in minutes
    pub duration_minutes: u32,
}

impl Activity {
    /// Project a run into its cardio activity view.
    ///
    /// The projection shares the run's ID and is computed on read, never
    /// stored; mutating either representation goes through the run, so the
    /// two cannot diverge.
    pub fn from_run(run: &Run) -> Self {
        Self {
            id: run.id,
            user_id: run.user_id,
            date: run.date,
            kind: ActivityKind::Cardio,
            name: run.name.clone(),
            // Seconds to minutes, rounded to the nearest minute
            duration_minutes: (run.duration_seconds + 30) / 60,
        }
    }
}
