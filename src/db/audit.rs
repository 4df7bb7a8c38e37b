//! Backend feature audits ensure required DB capabilities are available.

#[cfg(any(feature = "sqlite", feature = "postgres"))]
use diesel::QueryableByName;
use diesel::result::QueryResult;
use diesel_async::RunQueryDsl;

#[cfg(feature = "sqlite")]
use super::connection::DbConnection;

/// Verify that `SQLite` supports features required by the application.
///
/// Balance updates rely on `RETURNING` clauses, which `SQLite` gained in
/// 3.35. Queries the library version and rejects anything older.
///
/// # Errors
/// Returns any error produced by the version query, or a query-builder
/// error when the library is too old or the version cannot be parsed.
#[cfg(feature = "sqlite")]
#[must_use = "handle the result"]
pub async fn audit_sqlite_features(conn: &mut DbConnection) -> QueryResult<()> {
    use diesel::{result::Error as DieselError, sql_query, sql_types::Text};

    #[derive(QueryableByName)]
    struct SqliteVersion {
        #[diesel(sql_type = Text)]
        version: String,
    }

    let row: SqliteVersion = sql_query("SELECT sqlite_version() AS version")
        .get_result(conn)
        .await?;

    let mut parts = row.version.split('.');
    let major: u32 = parts.next().and_then(|v| v.parse().ok()).unwrap_or(0);
    let minor: u32 = parts.next().and_then(|v| v.parse().ok()).unwrap_or(0);

    if (major, minor) < (3, 35) {
        return Err(DieselError::QueryBuilderError(Box::new(
            std::io::Error::other(format!(
                "sqlite {} lacks RETURNING support (require >= 3.35)",
                row.version
            )),
        )));
    }

    Ok(())
}

/// Verify that the Postgres server meets application requirements.
///
/// Checks that the connected `PostgreSQL` server version is at least 14.
/// Executes a version query and parses the result, returning an error if the version is unsupported
/// or cannot be determined.
///
/// # Errors
/// Returns any error produced by the version query or if the version string cannot be parsed.
#[cfg(feature = "postgres")]
#[must_use = "handle the result"]
pub async fn audit_postgres_features(
    conn: &mut diesel_async::AsyncPgConnection,
) -> QueryResult<()> {
    use diesel::{result::Error as DieselError, sql_query, sql_types::Text};

    #[derive(QueryableByName)]
    struct PgVersion {
        #[diesel(sql_type = Text)]
        version: String,
    }

    let row: PgVersion = sql_query("SELECT version()").get_result(conn).await?;

    let major = row
        .version
        .split_whitespace()
        .nth(1)
        .and_then(|v| v.split('.').next())
        .and_then(|v| v.parse::<u32>().ok())
        .ok_or_else(|| {
            DieselError::QueryBuilderError(Box::new(std::io::Error::other(format!(
                "unable to parse postgres version: {}",
                row.version
            ))))
        })?;

    if major < 14 {
        return Err(DieselError::QueryBuilderError(Box::new(
            std::io::Error::other(format!(
                "postgres version {major} is not supported (require >= 14)"
            )),
        )));
    }

    Ok(())
}
