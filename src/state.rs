//! Shared application state handed to every request handler.

use std::sync::Arc;

use argon2::Argon2;
use diesel_async::pooled_connection::bb8::PooledConnection;

use crate::{
    auth::SessionStore,
    db::{DbConnection, DbPool},
    error::ApiError,
};

/// Shared server resources passed to request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
    /// Argon2 password hasher instance shared by all requests.
    pub argon2: Arc<Argon2<'static>>,
    /// Live bearer-token sessions.
    pub sessions: SessionStore,
}

impl AppState {
    /// Bundle the shared resources.
    #[must_use]
    pub fn new(pool: DbPool, argon2: Arc<Argon2<'static>>) -> Self {
        Self {
            pool,
            argon2,
            sessions: SessionStore::new(),
        }
    }

    /// Check out a pooled database connection.
    ///
    /// # Errors
    /// Returns [`ApiError::Pool`] when the pool cannot supply a connection.
    pub async fn conn(&self) -> Result<PooledConnection<'_, DbConnection>, ApiError> {
        self.pool
            .get()
            .await
            .map_err(|e| ApiError::Pool(e.to_string()))
    }
}
