//! Bearer-token authentication.
//!
//! Login hands out opaque random tokens backed by an in-process session
//! table. This is deliberately minimal glue: the platform's interesting
//! behaviour is in the ledger, and the admin surface only needs a reliable
//! `is_admin` gate in front of it.

use std::{collections::HashMap, sync::Arc};

use axum::http::{HeaderMap, header::AUTHORIZATION};
use rand::{Rng, distributions::Alphanumeric};
use tokio::sync::RwLock;

use crate::{error::ApiError, models::User};

/// Length of issued session tokens.
const TOKEN_LEN: usize = 32;

/// In-process map from session token to user id.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, i32>>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Issue a fresh token for `user_id`.
    pub async fn issue(&self, user_id: i32) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        self.inner.write().await.insert(token.clone(), user_id);
        token
    }

    /// Resolve a token to its user id.
    pub async fn resolve(&self, token: &str) -> Option<i32> {
        self.inner.read().await.get(token).copied()
    }

    /// Drop a token; returns whether it existed.
    pub async fn revoke(&self, token: &str) -> bool {
        self.inner.write().await.remove(token).is_some()
    }
}

/// Extract the bearer token from request headers.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve the request's bearer token to a user id.
///
/// # Errors
/// Returns [`ApiError::Unauthorized`] when the header is missing, not a
/// bearer token, or not a live session.
pub async fn authenticate(sessions: &SessionStore, headers: &HeaderMap) -> Result<i32, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;
    sessions
        .resolve(token)
        .await
        .ok_or(ApiError::Unauthorized)
}

/// Check that the user may use the admin surface.
///
/// # Errors
/// Returns [`ApiError::Forbidden`] for non-admin accounts.
pub fn ensure_admin(user: &User) -> Result<(), ApiError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[tokio::test]
    async fn issue_resolve_revoke_round_trip() {
        let sessions = SessionStore::new();
        let token = sessions.issue(7).await;
        assert_eq!(token.len(), TOKEN_LEN);
        assert_eq!(sessions.resolve(&token).await, Some(7));
        assert!(sessions.revoke(&token).await);
        assert_eq!(sessions.resolve(&token).await, None);
    }

    #[tokio::test]
    async fn authenticate_requires_bearer_header() {
        let sessions = SessionStore::new();
        let token = sessions.issue(3).await;

        let mut headers = HeaderMap::new();
        assert!(authenticate(&sessions, &headers).await.is_err());

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("header"),
        );
        assert_eq!(authenticate(&sessions, &headers).await.expect("auth"), 3);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(authenticate(&sessions, &headers).await.is_err());
    }
}
