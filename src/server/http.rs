//! Axum application assembly and the HTTP server loop.
//!
//! [`build_router`] is separated from [`run_daemon`] so tests can exercise
//! the full routing table against an in-memory database without binding a
//! socket.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, patch, post, put},
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
use tracing::warn;
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
use url::Url;

use super::{AppConfig, admin as cli_admin};
use crate::{
    db::{DbPool, apply_migrations, establish_pool},
    handlers::{admin, ads, deposits, session, withdrawals},
    rewards,
    state::AppState,
};

/// Assemble the full routing table over the shared state.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/login", post(session::login))
        .route("/api/logout", post(session::logout))
        .route("/api/me", get(session::me))
        .route("/api/ads", get(ads::list_ads))
        .route("/api/ads/{id}/click", post(ads::click_ad))
        .route(
            "/api/deposits",
            post(deposits::create_deposit).get(deposits::list_deposits),
        )
        .route(
            "/api/withdrawals",
            post(withdrawals::request_withdrawal).get(withdrawals::list_withdrawals),
        )
        .route(
            "/api/admin/users",
            get(admin::list_users).post(admin::create_user),
        )
        .route("/api/admin/users/{id}", get(admin::get_user))
        .route("/api/admin/users/{id}/ledger", get(admin::user_ledger))
        .route("/api/admin/users/{id}/balance", post(admin::adjust_balance))
        .route(
            "/api/admin/users/{id}/restriction",
            put(admin::put_restriction).delete(admin::delete_restriction),
        )
        .route("/api/admin/users/{id}/milestone", put(admin::put_milestone))
        .route("/api/admin/ads", get(admin::list_ads).post(admin::create_ad))
        .route("/api/admin/ads/{id}", patch(admin::update_ad))
        .route("/api/admin/withdrawals", get(admin::list_withdrawals))
        .route(
            "/api/admin/withdrawals/{id}/approve",
            post(admin::approve_withdrawal),
        )
        .route(
            "/api/admin/withdrawals/{id}/reject",
            post(admin::reject_withdrawal),
        )
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60))
}

/// Run the HTTP server using the supplied configuration.
///
/// # Errors
///
/// Returns any failure reported while seeding the database pool, binding
/// the socket, or serving inbound connections.
pub async fn run_daemon(cfg: AppConfig) -> Result<()> {
    if cfg.reward_reset_hour > 23 {
        bail!(
            "reward_reset_hour must be 0-23, got {}",
            cfg.reward_reset_hour
        );
    }

    // Build the Argon2 instance once so it can be shared by all requests.
    let argon2 = Arc::new(cli_admin::argon2_from_config(&cfg)?);

    let pool = setup_database(&cfg.database).await?;
    let state = AppState::new(pool.clone(), argon2);
    let reset_task = rewards::spawn_daily_reset(pool, cfg.reward_reset_hour);

    let app = build_router(state);
    let listener = TcpListener::bind(&cfg.bind).await?;
    info!(bind = %cfg.bind, "admill listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reset_task.abort();
    info!("server stopped");
    Ok(())
}

/// Determine whether the supplied connection string targets Postgres.
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
fn is_postgres_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(u) => matches!(u.scheme(), "postgres" | "postgresql"),
        Err(err) => {
            warn!(target = "server::http", "invalid database url '{s}': {err}");
            false
        }
    }
}

/// Sets up the database connection pool and runs migrations.
///
/// Establishes a connection pool for the specified database, audits
/// database-specific features, and applies any pending migrations. Returns
/// the initialised connection pool on success.
async fn setup_database(database: &str) -> Result<DbPool> {
    let pool: DbPool = establish_pool(database).await?;
    {
        let mut conn = pool.get().await.context("failed to get db connection")?;
        #[cfg(feature = "sqlite")]
        crate::db::audit_sqlite_features(&mut conn).await?;
        #[cfg(all(feature = "postgres", not(feature = "sqlite")))]
        if is_postgres_url(database) {
            crate::db::audit_postgres_features(&mut conn).await?;
        }
        apply_migrations(&mut conn, database).await?;
    }
    Ok(pool)
}

/// Waits for a shutdown signal, completing when termination is requested.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    res = tokio::signal::ctrl_c() => {
                        if let Err(err) = res {
                            tracing::error!(%err, "failed to listen for Ctrl-C");
                        }
                    },
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                tracing::error!(%err, "failed to install SIGTERM handler");
                wait_for_ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        wait_for_ctrl_c().await;
    }
}

async fn wait_for_ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for Ctrl-C");
    }
}
