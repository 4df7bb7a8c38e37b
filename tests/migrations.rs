//! Migration, audit, and assembly smoke tests.

use admill::{db::apply_migrations, server::build_router};
use diesel_async::AsyncConnection;
use test_util::{memory_conn, test_app};

#[tokio::test]
async fn migrations_apply_idempotently() {
    // The fixture has already applied the migrations once.
    let mut conn = memory_conn().await;
    apply_migrations(&mut conn, "")
        .await
        .expect("second apply is a no-op");
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn fresh_database_passes_feature_audit() {
    let mut conn = admill::db::DbConnection::establish(":memory:")
        .await
        .expect("connect");
    admill::db::audit_sqlite_features(&mut conn)
        .await
        .expect("audit");
}

#[tokio::test]
async fn router_assembles_over_live_state() {
    let app = test_app().await;
    // Building the router validates every route/method registration.
    let _router = build_router(app.state.clone());
}
