// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account registration and session routes.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, AuthUser, SESSION_COOKIE};
use crate::models::User;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

/// Readable hint cookie so the SPA can tell a session exists without
/// touching the HttpOnly token.
const LOGGED_IN_COOKIE: &str = "stride_logged_in";

const SESSION_DAYS: i64 = 30;

/// Public auth routes (no session required).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Session routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/me", get(get_me))
}

// ─── Requests / Responses ────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub id: Uuid,
    pub email: String,
    pub created_at: String,
    pub last_active: String,
}

impl UserResponse {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            created_at: format_utc_rfc3339(user.created_at),
            last_active: format_utc_rfc3339(user.last_active),
        }
    }
}

/// Session response with the bearer token for non-cookie clients.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserResponse,
}

// ─── Handlers ────────────────────────────────────────────────

/// Create an account and open a session.
async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>)> {
    payload.validate()?;

    if state.db.find_user_by_email(&payload.email).is_some() {
        return Err(AppError::BadRequest(
            "An account with this email already exists".to_string(),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))?
        .to_string();

    let now = chrono::Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: payload.email.trim().to_lowercase(),
        password_hash,
        created_at: now,
        last_active: now,
    };
    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "Account created");

    let (jar, token) = open_session(&state, jar, user.id)?;
    Ok((
        StatusCode::CREATED,
        jar,
        Json(SessionResponse {
            token,
            user: UserResponse::from_user(&user),
        }),
    ))
}

/// Verify credentials and open a session.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    payload.validate()?;

    let mut user = state
        .db
        .find_user_by_email(payload.email.trim())
        .ok_or(AppError::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Stored hash unreadable: {}", e)))?;
    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized)?;

    user.last_active = chrono::Utc::now();
    state.db.upsert_user(&user).await?;

    let (jar, token) = open_session(&state, jar, user.id)?;
    Ok((
        jar,
        Json(SessionResponse {
            token,
            user: UserResponse::from_user(&user),
        }),
    ))
}

/// Close the session by expiring both cookies.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (StatusCode, CookieJar) {
    let secure = cookies_secure(&state.config.frontend_url);

    let token_removal = session_cookie(
        SESSION_COOKIE,
        String::new(),
        secure,
        true,
        time::Duration::ZERO,
    );
    let hint_removal = session_cookie(
        LOGGED_IN_COOKIE,
        String::new(),
        secure,
        false,
        time::Duration::ZERO,
    );

    (
        StatusCode::NO_CONTENT,
        jar.add(token_removal).add(hint_removal),
    )
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let profile = state
        .db
        .get_user(user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    Ok(Json(UserResponse::from_user(&profile)))
}

// ─── Session plumbing ────────────────────────────────────────

fn open_session(
    state: &Arc<AppState>,
    jar: CookieJar,
    user_id: Uuid,
) -> Result<(CookieJar, String)> {
    let token = create_jwt(user_id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let secure = cookies_secure(&state.config.frontend_url);
    let token_cookie = session_cookie(
        SESSION_COOKIE,
        token.clone(),
        secure,
        true,
        time::Duration::days(SESSION_DAYS),
    );
    let hint_cookie = session_cookie(
        LOGGED_IN_COOKIE,
        "1".to_string(),
        secure,
        false,
        time::Duration::days(SESSION_DAYS),
    );

    Ok((jar.add(token_cookie).add(hint_cookie), token))
}

/// Session cookies are Secure everywhere except plain-http local dev.
fn cookies_secure(frontend_url: &str) -> bool {
    frontend_url.starts_with("https://")
}

fn session_cookie(
    name: &'static str,
    value: String,
    secure: bool,
    http_only: bool,
    max_age: time::Duration,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .same_site(SameSite::Lax)
        .http_only(http_only)
        .secure(secure)
        .max_age(max_age)
        .build()
}
