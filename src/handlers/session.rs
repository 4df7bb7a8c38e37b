//! Login, logout, and profile handlers.

use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AccountView, require_user};
use crate::{db, error::ApiError, passwords, state::AppState};

/// Login request body.
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Login response body.
#[derive(Serialize, Debug)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
}

/// `POST /api/login` — verify credentials and issue a session token.
///
/// # Errors
/// Returns [`ApiError::InvalidCredentials`] for unknown users or wrong
/// passwords without distinguishing the two.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let mut conn = state.conn().await?;
    let user = db::get_user_by_name(&mut conn, &req.username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;
    let ok = passwords::verify_password(&user.password, &req.password)
        .map_err(|e| ApiError::Internal(format!("stored password hash unusable: {e}")))?;
    if !ok {
        return Err(ApiError::InvalidCredentials);
    }
    let token = state.sessions.issue(user.id).await;
    info!(username = %user.username, "authenticated");
    Ok(Json(LoginResponse { token }))
}

/// `POST /api/logout` — revoke the caller's session token.
///
/// # Errors
/// Returns [`ApiError::Unauthorized`] when no live session is presented.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?;
    if !state.sessions.revoke(token).await {
        return Err(ApiError::Unauthorized);
    }
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `GET /api/me` — the caller's profile, balances, and mechanics.
///
/// # Errors
/// Returns [`ApiError::Unauthorized`] for unauthenticated callers.
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AccountView>, ApiError> {
    let mut conn = state.conn().await?;
    let user = require_user(&state, &headers, &mut conn).await?;
    Ok(Json(AccountView::from_user(&user)))
}
