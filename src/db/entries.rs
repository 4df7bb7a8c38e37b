//! Audit-trail (ledger entry) helpers.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;

/// Append an audit-trail row.
///
/// # Errors
/// Returns any error produced by the insertion query.
#[must_use = "handle the result"]
pub async fn append_entry(
    conn: &mut DbConnection,
    entry: &crate::models::NewLedgerEntry<'_>,
) -> QueryResult<usize> {
    use crate::schema::ledger_entries::dsl::ledger_entries;
    diesel::insert_into(ledger_entries)
        .values(entry)
        .execute(conn)
        .await
}

/// List a user's audit trail, newest first.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn list_entries_for_user(
    conn: &mut DbConnection,
    uid: i32,
    limit: i64,
) -> QueryResult<Vec<crate::models::LedgerEntry>> {
    use crate::schema::ledger_entries::dsl::{id, ledger_entries, user_id};
    ledger_entries
        .filter(user_id.eq(uid))
        .order(id.desc())
        .limit(limit)
        .load::<crate::models::LedgerEntry>(conn)
        .await
}
