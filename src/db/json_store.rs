// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON-file record store with typed operations.
//!
//! One JSON array per logical collection:
//! - Users (accounts and password hashes)
//! - Runs (distance/duration records; pace and speed never persisted)
//! - Activities (secondary activities; run projections never persisted)
//! - Goals and goal folders
//!
//! Collections are held in memory and fully re-serialized to their backing
//! file on every mutation. Last write wins; there is no cross-process
//! conflict detection. Dates travel as ISO-8601 strings on disk and are
//! revived into `chrono` values on load.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Activity, Goal, GoalFolder, Run, User};

/// A record addressable by its UUID.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn id(&self) -> Uuid;
}

impl Record for User {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Run {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Activity {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for Goal {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for GoalFolder {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// One persisted collection: an in-memory map plus its backing file.
struct Collection<T> {
    path: PathBuf,
    records: DashMap<Uuid, T>,
    // Serializes full-file rewrites so concurrent mutations cannot
    // interleave a torn snapshot.
    persist_lock: tokio::sync::Mutex<()>,
}

impl<T: Record> Collection<T> {
    /// Load a collection from `<root>/<name>.json`.
    ///
    /// An absent file is an empty collection; a file that fails to parse is
    /// a storage error rather than silent data loss.
    async fn open(root: &Path, name: &str) -> Result<Self, AppError> {
        let path = root.join(format!("{name}.json"));

        let records = DashMap::new();
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let parsed: Vec<T> = serde_json::from_slice(&bytes).map_err(|e| {
                    AppError::Storage(format!("Failed to parse {}: {}", path.display(), e))
                })?;
                for record in parsed {
                    records.insert(record.id(), record);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        Ok(Self {
            path,
            records,
            persist_lock: tokio::sync::Mutex::new(()),
        })
    }

    fn get(&self, id: Uuid) -> Option<T> {
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    fn all(&self) -> Vec<T> {
        self.records
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    /// Insert or replace a record, then rewrite the whole collection file.
    async fn upsert(&self, record: T) -> Result<(), AppError> {
        self.records.insert(record.id(), record);
        self.persist().await
    }

    /// Remove a record, then rewrite the whole collection file.
    ///
    /// Returns `false` if the record was not present (nothing is rewritten).
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        if self.records.remove(&id).is_none() {
            return Ok(false);
        }
        self.persist().await?;
        Ok(true)
    }

    /// Serialize the entire collection to its backing file.
    ///
    /// Writes to a temp file and renames over the target so a crash
    /// mid-write leaves the previous snapshot intact.
    async fn persist(&self) -> Result<(), AppError> {
        let _guard = self.persist_lock.lock().await;

        let mut snapshot = self.all();
        snapshot.sort_by_key(|record| record.id());

        let bytes = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| AppError::Storage(format!("Failed to serialize collection: {e}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &bytes).await.map_err(|e| {
            AppError::Storage(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            AppError::Storage(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }
}

/// Typed store over all collections.
#[derive(Clone)]
pub struct JsonDb {
    inner: Arc<Inner>,
}

struct Inner {
    users: Collection<User>,
    runs: Collection<Run>,
    activities: Collection<Activity>,
    goals: Collection<Goal>,
    folders: Collection<GoalFolder>,
}

impl JsonDb {
    /// Open (or initialize) the store under `root`.
    pub async fn open(root: &Path) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(root).await.map_err(|e| {
            AppError::Storage(format!("Failed to create {}: {}", root.display(), e))
        })?;

        let inner = Inner {
            users: Collection::open(root, collections::USERS).await?,
            runs: Collection::open(root, collections::RUNS).await?,
            activities: Collection::open(root, collections::ACTIVITIES).await?,
            goals: Collection::open(root, collections::GOALS).await?,
            folders: Collection::open(root, collections::GOAL_FOLDERS).await?,
        };

        tracing::info!(
            path = %root.display(),
            users = inner.users.len(),
            runs = inner.runs.len(),
            activities = inner.activities.len(),
            goals = inner.goals.len(),
            folders = inner.folders.len(),
            "Store loaded"
        );

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    // ─── User Operations ─────────────────────────────────────────

    pub fn get_user(&self, id: Uuid) -> Option<User> {
        self.inner.users.get(id)
    }

    pub fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.inner
            .users
            .all()
            .into_iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
    }

    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        self.inner.users.upsert(user.clone()).await
    }

    // ─── Run Operations ──────────────────────────────────────────

    /// Get a run, scoped to its owner.
    pub fn get_run(&self, user_id: Uuid, id: Uuid) -> Option<Run> {
        self.inner.runs.get(id).filter(|run| run.user_id == user_id)
    }

    /// All runs for a user, most recent first.
    pub fn runs_for_user(&self, user_id: Uuid) -> Vec<Run> {
        let mut runs: Vec<Run> = self
            .inner
            .runs
            .all()
            .into_iter()
            .filter(|run| run.user_id == user_id)
            .collect();
        runs.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        runs
    }

    pub async fn upsert_run(&self, run: &Run) -> Result<(), AppError> {
        self.inner.runs.upsert(run.clone()).await
    }

    pub async fn delete_run(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        if self.get_run(user_id, id).is_none() {
            return Ok(false);
        }
        self.inner.runs.delete(id).await
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Get a stored activity, scoped to its owner.
    ///
    /// Run projections are not stored records and are not visible here.
    pub fn get_activity(&self, user_id: Uuid, id: Uuid) -> Option<Activity> {
        self.inner
            .activities
            .get(id)
            .filter(|activity| activity.user_id == user_id)
    }

    /// All stored activities for a user, most recent first.
    pub fn activities_for_user(&self, user_id: Uuid) -> Vec<Activity> {
        let mut activities: Vec<Activity> = self
            .inner
            .activities
            .all()
            .into_iter()
            .filter(|activity| activity.user_id == user_id)
            .collect();
        activities.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        activities
    }

    pub async fn upsert_activity(&self, activity: &Activity) -> Result<(), AppError> {
        self.inner.activities.upsert(activity.clone()).await
    }

    pub async fn delete_activity(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        if self.get_activity(user_id, id).is_none() {
            return Ok(false);
        }
        self.inner.activities.delete(id).await
    }

    // ─── Goal Operations ─────────────────────────────────────────

    pub fn get_goal(&self, user_id: Uuid, id: Uuid) -> Option<Goal> {
        self.inner
            .goals
            .get(id)
            .filter(|goal| goal.user_id == user_id)
    }

    pub fn goals_for_user(&self, user_id: Uuid) -> Vec<Goal> {
        let mut goals: Vec<Goal> = self
            .inner
            .goals
            .all()
            .into_iter()
            .filter(|goal| goal.user_id == user_id)
            .collect();
        goals.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        goals
    }

    pub async fn upsert_goal(&self, goal: &Goal) -> Result<(), AppError> {
        self.inner.goals.upsert(goal.clone()).await
    }

    pub async fn delete_goal(&self, user_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        if self.get_goal(user_id, id).is_none() {
            return Ok(false);
        }
        self.inner.goals.delete(id).await
    }

    // ─── Goal Folder Operations ──────────────────────────────────

    pub fn get_folder(&self, user_id: Uuid, id: Uuid) -> Option<GoalFolder> {
        self.inner
            .folders
            .get(id)
            .filter(|folder| folder.user_id == user_id)
    }

    pub fn folders_for_user(&self, user_id: Uuid) -> Vec<GoalFolder> {
        let mut folders: Vec<GoalFolder> = self
            .inner
            .folders
            .all()
            .into_iter()
            .filter(|folder| folder.user_id == user_id)
            .collect();
        folders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        folders
    }

    pub async fn upsert_folder(&self, folder: &GoalFolder) -> Result<(), AppError> {
        self.inner.folders.upsert(folder.clone()).await
    }

    /// Delete a folder and reparent its goals to the root.
    ///
    /// Goals must never reference a missing folder, so the references are
    /// cleared before the folder record goes away. Returns the number of
    /// goals reparented, or `None` if the folder was not found.
    pub async fn delete_folder(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<u32>, AppError> {
        if self.get_folder(user_id, id).is_none() {
            return Ok(None);
        }

        let mut reparented = 0u32;
        for mut goal in self.goals_for_user(user_id) {
            if goal.folder_id == Some(id) {
                goal.folder_id = None;
                self.inner.goals.upsert(goal).await?;
                reparented += 1;
            }
        }

        self.inner.folders.delete(id).await?;
        tracing::debug!(%user_id, folder_id = %id, reparented, "Folder deleted");
        Ok(Some(reparented))
    }
}
