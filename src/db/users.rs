//! User record helpers.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::ledger::AccountState;

/// Look up a user record by username.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_user_by_name(
    conn: &mut DbConnection,
    name: &str,
) -> QueryResult<Option<crate::models::User>> {
    use crate::schema::users::dsl::{username, users};
    users
        .filter(username.eq(name))
        .first::<crate::models::User>(conn)
        .await
        .optional()
}

/// Look up a user record by id.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn get_user(
    conn: &mut DbConnection,
    user_id: i32,
) -> QueryResult<Option<crate::models::User>> {
    use crate::schema::users::dsl::users;
    users
        .find(user_id)
        .first::<crate::models::User>(conn)
        .await
        .optional()
}

/// List all user records ordered by username.
///
/// # Errors
/// Returns any error produced by the underlying database query.
#[must_use = "handle the result"]
pub async fn list_users(conn: &mut DbConnection) -> QueryResult<Vec<crate::models::User>> {
    use crate::schema::users::dsl::{username, users};
    users
        .order(username.asc())
        .load::<crate::models::User>(conn)
        .await
}

/// Insert a new user record, returning its id.
///
/// # Errors
/// Returns any error produced by the insertion query.
#[must_use = "handle the result"]
pub async fn create_user(
    conn: &mut DbConnection,
    user: &crate::models::NewUser<'_>,
) -> QueryResult<i32> {
    use crate::schema::users::dsl::{id, users};
    diesel::insert_into(users)
        .values(user)
        .returning(id)
        .get_result(conn)
        .await
}

/// Persist a ledger snapshot back onto the user row.
///
/// Writes every balance, counter, milestone, and restriction column so the
/// row mirrors the snapshot exactly.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn persist_account(
    conn: &mut DbConnection,
    user_id: i32,
    state: &AccountState,
) -> QueryResult<usize> {
    use crate::schema::users::dsl as u;
    diesel::update(u::users.find(user_id))
        .set((
            u::milestone_amount.eq(state.milestone_amount.minor_units()),
            u::milestone_reward.eq(state.milestone_reward.minor_units()),
            u::destination_amount.eq(state.destination_amount.minor_units()),
            u::points.eq(state.points),
            u::total_ads_completed.eq(state.total_ads_completed),
            u::ongoing_milestone.eq(state.milestone.as_ref().map(|m| m.target)),
            u::milestone_kind.eq(state.milestone.as_ref().map(|m| m.kind.as_str())),
            u::milestone_prize.eq(state
                .milestone
                .as_ref()
                .map_or(0, |m| m.prize.minor_units())),
            u::locked.eq(state.locked),
            u::restriction_ads_limit.eq(state.restriction.as_ref().map(|r| r.ads_limit)),
            u::restriction_deposit.eq(state
                .restriction
                .as_ref()
                .map_or(0, |r| r.deposit.minor_units())),
            u::restriction_commission.eq(state
                .restriction
                .as_ref()
                .map_or(0, |r| r.commission.minor_units())),
            u::restricted_ads_completed.eq(state.restriction.as_ref().map_or(0, |r| r.completed)),
        ))
        .execute(conn)
        .await
}

/// Zero the daily reward counter for every user that has one.
///
/// Returns the number of rows touched.
///
/// # Errors
/// Returns any error produced by the update query.
#[must_use = "handle the result"]
pub async fn reset_daily_rewards(conn: &mut DbConnection) -> QueryResult<usize> {
    use crate::schema::users::dsl::{milestone_reward, users};
    diesel::update(users.filter(milestone_reward.ne(0i64)))
        .set(milestone_reward.eq(0i64))
        .execute(conn)
        .await
}
