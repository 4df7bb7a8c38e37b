//! Shared fixtures for admill integration tests.
//!
//! Provides migrated database handles (in-memory for single-connection
//! tests, temp-file backed for pooled [`AppState`] tests), seeded rows, and
//! bearer-token helpers so tests can call handlers directly.

#![expect(
    clippy::expect_used,
    reason = "test fixtures fail fast on broken preconditions"
)]

use std::sync::Arc;

use admill::{
    db::{DbConnection, apply_migrations, create_ad, create_user, establish_pool},
    models::{NewAd, NewUser},
    passwords::hash_password,
    state::AppState,
};
use argon2::Argon2;
use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use chrono::Utc;
use diesel_async::AsyncConnection;
use tempfile::NamedTempFile;

/// An [`AppState`] backed by a migrated temp-file database.
///
/// The temp file lives as long as the fixture, so every pooled connection
/// sees the same database.
pub struct TestApp {
    /// Shared state as handed to request handlers.
    pub state: AppState,
    _db: NamedTempFile,
}

/// Create a migrated in-memory connection for single-connection tests.
pub async fn memory_conn() -> DbConnection {
    let mut conn = DbConnection::establish(":memory:")
        .await
        .expect("failed to create in-memory connection");
    apply_migrations(&mut conn, "")
        .await
        .expect("failed to apply migrations");
    conn
}

/// Create a migrated, pooled [`TestApp`].
pub async fn test_app() -> TestApp {
    let db = NamedTempFile::new().expect("failed to create temp database file");
    let path = db.path().to_str().expect("temp path is valid utf-8").to_owned();
    let pool = establish_pool(&path).await.expect("failed to build pool");
    {
        let mut conn = pool.get().await.expect("failed to get connection");
        apply_migrations(&mut conn, &path)
            .await
            .expect("failed to apply migrations");
    }
    TestApp {
        state: AppState::new(pool, Arc::new(Argon2::default())),
        _db: db,
    }
}

/// Insert a regular user with an unusable password hash.
pub async fn seed_user(conn: &mut DbConnection, name: &str) -> i32 {
    insert_user(conn, name, "hash", false).await
}

/// Insert an admin user with an unusable password hash.
pub async fn seed_admin(conn: &mut DbConnection, name: &str) -> i32 {
    insert_user(conn, name, "hash", true).await
}

/// Insert a user with a real Argon2 hash so login can succeed.
pub async fn seed_user_with_password(
    conn: &mut DbConnection,
    name: &str,
    password: &str,
    is_admin: bool,
) -> i32 {
    let hashed = hash_password(&Argon2::default(), password).expect("failed to hash password");
    insert_user(conn, name, &hashed, is_admin).await
}

async fn insert_user(conn: &mut DbConnection, name: &str, password: &str, is_admin: bool) -> i32 {
    let new_user = NewUser {
        username: name,
        password,
        is_admin,
        created_at: Utc::now().naive_utc(),
    };
    create_user(conn, &new_user).await.expect("failed to create user")
}

/// Insert an active ad worth `price_minor` minor units per view.
pub async fn seed_ad(conn: &mut DbConnection, title: &str, price_minor: i64) -> i32 {
    let ad = NewAd {
        title,
        price: price_minor,
        active: true,
        created_at: Utc::now().naive_utc(),
    };
    create_ad(conn, &ad).await.expect("failed to create ad")
}

/// Issue a session token for `user_id` on the fixture state.
pub async fn issue_token(state: &AppState, user_id: i32) -> String {
    state.sessions.issue(user_id).await
}

/// Build request headers carrying `token` as a bearer credential.
#[must_use]
pub fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&format!("Bearer {token}")).expect("token is a valid header");
    headers.insert(AUTHORIZATION, value);
    headers
}
