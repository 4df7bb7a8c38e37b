//! Withdrawal request helpers.

use chrono::NaiveDateTime;
use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::models::WithdrawStatus;

/// Insert a new withdrawal request, returning its id.
///
/// # Errors
/// Returns any error produced by the insertion query.
#[must_use = "handle the result"]
pub async fn create_withdrawal(
    conn: &mut DbConnection,
    request: &crate::models::NewWithdrawal<'_>,
) -> QueryResult<i32> {
    use crate::schema::withdrawals::dsl::{id, withdrawals};
    diesel::insert_into(withdrawals)
        .values(request)
        .returning(id)
        .get_result(conn)
        .await
}

/// Look up a withdrawal request by id.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_withdrawal(
    conn: &mut DbConnection,
    withdrawal_id: i32,
) -> QueryResult<Option<crate::models::Withdrawal>> {
    use crate::schema::withdrawals::dsl::withdrawals;
    withdrawals
        .find(withdrawal_id)
        .first::<crate::models::Withdrawal>(conn)
        .await
        .optional()
}

/// List a user's withdrawal requests, newest first.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn list_withdrawals_for_user(
    conn: &mut DbConnection,
    uid: i32,
) -> QueryResult<Vec<crate::models::Withdrawal>> {
    use crate::schema::withdrawals::dsl::{id, user_id, withdrawals};
    withdrawals
        .filter(user_id.eq(uid))
        .order(id.desc())
        .load::<crate::models::Withdrawal>(conn)
        .await
}

/// List withdrawal requests, optionally filtered by status, newest first.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn list_withdrawals(
    conn: &mut DbConnection,
    filter: Option<WithdrawStatus>,
) -> QueryResult<Vec<crate::models::Withdrawal>> {
    use crate::schema::withdrawals::dsl::{id, status, withdrawals};
    match filter {
        Some(s) => {
            withdrawals
                .filter(status.eq(s.as_str()))
                .order(id.desc())
                .load::<crate::models::Withdrawal>(conn)
                .await
        }
        None => {
            withdrawals
                .order(id.desc())
                .load::<crate::models::Withdrawal>(conn)
                .await
        }
    }
}

/// Whether the user already has a pending withdrawal request.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn has_pending_withdrawal(conn: &mut DbConnection, uid: i32) -> QueryResult<bool> {
    use diesel::dsl::count_star;

    use crate::schema::withdrawals::dsl::{status, user_id, withdrawals};
    let pending: i64 = withdrawals
        .filter(user_id.eq(uid))
        .filter(status.eq(WithdrawStatus::Pending.as_str()))
        .select(count_star())
        .first(conn)
        .await?;
    Ok(pending > 0)
}

/// Stamp a withdrawal request with its resolution.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn resolve_withdrawal(
    conn: &mut DbConnection,
    withdrawal_id: i32,
    resolution: WithdrawStatus,
    at: NaiveDateTime,
) -> QueryResult<usize> {
    use crate::schema::withdrawals::dsl::{resolved_at, status, withdrawals};
    diesel::update(withdrawals.find(withdrawal_id))
        .set((status.eq(resolution.as_str()), resolved_at.eq(Some(at))))
        .execute(conn)
        .await
}
