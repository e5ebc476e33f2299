//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account stored alongside the fitness collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Record ID (JWT subject)
    pub id: Uuid,
    /// Sign-in email, unique per store
    pub email: String,
    /// Argon2 password hash (PHC string)
    pub password_hash: String,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// Last successful sign-in
    pub last_active: DateTime<Utc>,
}
