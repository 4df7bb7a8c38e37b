//! Transactional account operations.
//!
//! Each operation loads the user row, applies exactly one ledger transition,
//! persists the snapshot, and appends the produced audit-trail rows — all
//! inside a single database transaction so a failure leaves no partial
//! state behind.

#![expect(
    clippy::shadow_reuse,
    reason = "transaction closures rebind the connection"
)]

use chrono::Utc;
use diesel_async::{AsyncConnection, scoped_futures::ScopedFutureExt};

use crate::{
    db::{self, DbConnection},
    error::ApiError,
    ledger::{AccountState, AdjustOp, LedgerError, LedgerEvent, Milestone, MoneyField},
    models::{NewDeposit, NewLedgerEntry, NewWithdrawal, WithdrawStatus, Withdrawal},
    money::Money,
};

/// Result of a completed ad click.
#[derive(Debug)]
pub struct ClickOutcome {
    /// Snapshot after the click.
    pub state: AccountState,
    /// Audit events produced by the click.
    pub events: Vec<LedgerEvent>,
}

/// Result of a recorded deposit.
#[derive(Debug)]
pub struct DepositOutcome {
    /// Snapshot after the deposit.
    pub state: AccountState,
    /// Audit events produced by the deposit.
    pub events: Vec<LedgerEvent>,
}

/// Target of a direct admin balance mutation.
#[derive(Clone, Copy, Debug)]
pub enum AdjustTarget {
    /// Mutate one of the money fields by `amount`.
    Money(MoneyField, Money),
    /// Mutate the points counter by `value`.
    Points(i32),
}

/// Record one completed ad view for `user_id`.
///
/// # Errors
/// Returns [`ApiError::NotFound`] for unknown or inactive ads or an unknown
/// user, any refused ledger transition, and database failures.
pub async fn click_ad(
    conn: &mut DbConnection,
    user_id: i32,
    ad_id: i32,
) -> Result<ClickOutcome, ApiError> {
    conn.transaction::<ClickOutcome, ApiError, _>(|conn| {
        async move {
            let ad = db::get_ad(conn, ad_id)
                .await?
                .filter(|a| a.active)
                .ok_or(ApiError::NotFound("ad"))?;
            let user = db::get_user(conn, user_id)
                .await?
                .ok_or(ApiError::NotFound("user"))?;
            let mut state = user.account_state();
            let before = state.milestone_amount;
            let events = state.apply_click(Money::from_minor(ad.price))?;
            db::persist_account(conn, user_id, &state).await?;
            append_events(conn, user_id, Some(ad.id), before, &events).await?;
            Ok(ClickOutcome { state, events })
        }
        .scope_boxed()
    })
    .await
}

/// Record a deposit for `user_id`, releasing any gated payouts.
///
/// # Errors
/// Returns [`ApiError::NotFound`] for an unknown user, any refused ledger
/// transition, and database failures.
pub async fn record_deposit(
    conn: &mut DbConnection,
    user_id: i32,
    amount: Money,
) -> Result<DepositOutcome, ApiError> {
    conn.transaction::<DepositOutcome, ApiError, _>(|conn| {
        async move {
            let user = db::get_user(conn, user_id)
                .await?
                .ok_or(ApiError::NotFound("user"))?;
            let mut state = user.account_state();
            let before = state.milestone_amount;
            let events = state.apply_deposit(amount)?;
            db::create_deposit(
                conn,
                &NewDeposit {
                    user_id,
                    amount: amount.minor_units(),
                    created_at: Utc::now().naive_utc(),
                },
            )
            .await?;
            db::persist_account(conn, user_id, &state).await?;
            append_events(conn, user_id, None, before, &events).await?;
            Ok(DepositOutcome { state, events })
        }
        .scope_boxed()
    })
    .await
}

/// Create a pending withdrawal request for `user_id`.
///
/// The balance is not debited until an admin approves the request.
///
/// # Errors
/// Returns a validation error for non-positive amounts,
/// [`ApiError::PendingWithdrawalExists`] when an unresolved request exists,
/// an insufficient-balance conflict, and database failures.
pub async fn request_withdrawal(
    conn: &mut DbConnection,
    user_id: i32,
    amount: Money,
) -> Result<Withdrawal, ApiError> {
    conn.transaction::<Withdrawal, ApiError, _>(|conn| {
        async move {
            if !amount.is_positive() {
                return Err(ApiError::Ledger(
                    LedgerError::AmountNotPositive,
                ));
            }
            let user = db::get_user(conn, user_id)
                .await?
                .ok_or(ApiError::NotFound("user"))?;
            if amount.minor_units() > user.milestone_amount {
                return Err(ApiError::Ledger(
                    LedgerError::InsufficientBalance,
                ));
            }
            if db::has_pending_withdrawal(conn, user_id).await? {
                return Err(ApiError::PendingWithdrawalExists);
            }
            let id = db::create_withdrawal(
                conn,
                &NewWithdrawal {
                    user_id,
                    amount: amount.minor_units(),
                    status: WithdrawStatus::Pending.as_str(),
                    requested_at: Utc::now().naive_utc(),
                },
            )
            .await?;
            db::get_withdrawal(conn, id)
                .await?
                .ok_or(ApiError::NotFound("withdrawal"))
        }
        .scope_boxed()
    })
    .await
}

/// Approve or reject a pending withdrawal request.
///
/// Approval re-checks the balance at resolution time and debits it; the
/// request stays pending when the balance no longer covers the amount.
/// Rejection stamps the request and leaves balances untouched.
///
/// # Errors
/// Returns [`ApiError::NotFound`] for an unknown request,
/// [`ApiError::WithdrawalNotPending`] for already-resolved requests, an
/// insufficient-balance conflict on approval, and database failures.
pub async fn resolve_withdrawal(
    conn: &mut DbConnection,
    withdrawal_id: i32,
    approve: bool,
) -> Result<Withdrawal, ApiError> {
    conn.transaction::<Withdrawal, ApiError, _>(|conn| {
        async move {
            let request = db::get_withdrawal(conn, withdrawal_id)
                .await?
                .ok_or(ApiError::NotFound("withdrawal"))?;
            if WithdrawStatus::parse(&request.status) != Some(WithdrawStatus::Pending) {
                return Err(ApiError::WithdrawalNotPending);
            }
            let resolution = if approve {
                let user = db::get_user(conn, request.user_id)
                    .await?
                    .ok_or(ApiError::NotFound("user"))?;
                let mut state = user.account_state();
                let before = state.milestone_amount;
                let event = state.debit_withdrawal(Money::from_minor(request.amount))?;
                db::persist_account(conn, request.user_id, &state).await?;
                append_events(conn, request.user_id, None, before, &[event]).await?;
                WithdrawStatus::Approved
            } else {
                WithdrawStatus::Rejected
            };
            db::resolve_withdrawal(conn, withdrawal_id, resolution, Utc::now().naive_utc())
                .await?;
            db::get_withdrawal(conn, withdrawal_id)
                .await?
                .ok_or(ApiError::NotFound("withdrawal"))
        }
        .scope_boxed()
    })
    .await
}

/// Apply a direct admin mutation to one of a user's balance fields.
///
/// # Errors
/// Returns [`ApiError::NotFound`] for an unknown user, a refused ledger
/// transition, and database failures.
pub async fn adjust_balance(
    conn: &mut DbConnection,
    user_id: i32,
    target: AdjustTarget,
    op: AdjustOp,
) -> Result<AccountState, ApiError> {
    conn.transaction::<AccountState, ApiError, _>(|conn| {
        async move {
            let user = db::get_user(conn, user_id)
                .await?
                .ok_or(ApiError::NotFound("user"))?;
            let mut state = user.account_state();
            let before = state.milestone_amount;
            let events = match target {
                AdjustTarget::Money(field, amount) => state
                    .apply_money_adjust(field, op, amount)?
                    .into_iter()
                    .collect::<Vec<_>>(),
                AdjustTarget::Points(value) => {
                    state.apply_points_adjust(op, value)?;
                    Vec::new()
                }
            };
            db::persist_account(conn, user_id, &state).await?;
            append_events(conn, user_id, None, before, &events).await?;
            Ok(state)
        }
        .scope_boxed()
    })
    .await
}

/// Impose a restricted-earning mode on a user.
///
/// # Errors
/// Returns [`ApiError::NotFound`] for an unknown user, a refused ledger
/// transition, and database failures.
pub async fn impose_restriction(
    conn: &mut DbConnection,
    user_id: i32,
    ads_limit: i32,
    deposit: Money,
    commission: Money,
) -> Result<AccountState, ApiError> {
    conn.transaction::<AccountState, ApiError, _>(|conn| {
        async move {
            let user = db::get_user(conn, user_id)
                .await?
                .ok_or(ApiError::NotFound("user"))?;
            let mut state = user.account_state();
            state.impose_restriction(ads_limit, deposit, commission)?;
            db::persist_account(conn, user_id, &state).await?;
            Ok(state)
        }
        .scope_boxed()
    })
    .await
}

/// Lift a user's restriction, releasing any escrow without a deposit.
///
/// # Errors
/// Returns [`ApiError::NotFound`] when the user is unknown or no
/// restriction is imposed, plus database failures.
pub async fn lift_restriction(
    conn: &mut DbConnection,
    user_id: i32,
) -> Result<AccountState, ApiError> {
    conn.transaction::<AccountState, ApiError, _>(|conn| {
        async move {
            let user = db::get_user(conn, user_id)
                .await?
                .ok_or(ApiError::NotFound("user"))?;
            let mut state = user.account_state();
            if state.restriction.is_none() {
                return Err(ApiError::NotFound("restriction"));
            }
            let before = state.milestone_amount;
            let events: Vec<LedgerEvent> = state.lift_restriction()?.into_iter().collect();
            db::persist_account(conn, user_id, &state).await?;
            append_events(conn, user_id, None, before, &events).await?;
            Ok(state)
        }
        .scope_boxed()
    })
    .await
}

/// Configure (or replace) a user's ongoing milestone.
///
/// # Errors
/// Returns [`ApiError::NotFound`] for an unknown user, a refused ledger
/// transition, and database failures.
pub async fn set_milestone(
    conn: &mut DbConnection,
    user_id: i32,
    milestone: Milestone,
) -> Result<AccountState, ApiError> {
    conn.transaction::<AccountState, ApiError, _>(|conn| {
        async move {
            let user = db::get_user(conn, user_id)
                .await?
                .ok_or(ApiError::NotFound("user"))?;
            let mut state = user.account_state();
            state.set_milestone(milestone)?;
            db::persist_account(conn, user_id, &state).await?;
            Ok(state)
        }
        .scope_boxed()
    })
    .await
}

/// Append one audit-trail row per event, maintaining the running balance.
async fn append_events(
    conn: &mut DbConnection,
    user_id: i32,
    ad_id: Option<i32>,
    balance_before: Money,
    events: &[LedgerEvent],
) -> Result<(), ApiError> {
    let now = Utc::now().naive_utc();
    let mut balance = balance_before;
    for event in events {
        if event.kind.affects_primary_balance() {
            balance = balance
                .checked_add(event.amount)
                .ok_or(LedgerError::Overflow)?;
        }
        db::append_entry(
            conn,
            &NewLedgerEntry {
                user_id,
                ad_id,
                kind: event.kind.as_str(),
                amount: event.amount.minor_units(),
                balance_after: balance.minor_units(),
                note: None,
                created_at: now,
            },
        )
        .await?;
    }
    Ok(())
}
