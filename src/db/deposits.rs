//! Deposit record helpers.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;

/// Insert a deposit record, returning its id.
///
/// # Errors
/// Returns any error produced by the insertion query.
#[must_use = "handle the result"]
pub async fn create_deposit(
    conn: &mut DbConnection,
    deposit: &crate::models::NewDeposit,
) -> QueryResult<i32> {
    use crate::schema::deposits::dsl::{deposits, id};
    diesel::insert_into(deposits)
        .values(deposit)
        .returning(id)
        .get_result(conn)
        .await
}

/// List a user's deposits, newest first.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn list_deposits_for_user(
    conn: &mut DbConnection,
    uid: i32,
) -> QueryResult<Vec<crate::models::Deposit>> {
    use crate::schema::deposits::dsl::{deposits, id, user_id};
    deposits
        .filter(user_id.eq(uid))
        .order(id.desc())
        .load::<crate::models::Deposit>(conn)
        .await
}
