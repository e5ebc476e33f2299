// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Run model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::metrics;

/// Distance unit a run was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Km,
    Mi,
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceUnit::Km => write!(f, "km"),
            DistanceUnit::Mi => write!(f, "mi"),
        }
    }
}

/// Stored run record.
///
/// Pace and speed are intentionally absent: they are derived from
/// `distance` and `duration_seconds` on every read, so an edit can never
/// leave them stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Record ID (also used as the projected activity ID)
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// When the run happened
    pub date: DateTime<Utc>,
    /// Display name (e.g. "Morning run")
    pub name: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Distance in `unit`, validated positive before storage
    pub distance: f64,
    /// Elapsed time in seconds, validated positive before storage
    pub duration_seconds: u32,
    /// Unit the distance was recorded in
    pub unit: DistanceUnit,
}

impl Run {
    /// Pace in minutes per unit distance.
    pub fn pace(&self) -> Option<f64> {
        metrics::pace(self.distance, self.duration_seconds)
    }

    /// Speed in unit distances per hour.
    pub fn speed(&self) -> Option<f64> {
        metrics::speed(self.distance, self.duration_seconds)
    }
}
