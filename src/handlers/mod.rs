//! HTTP request handlers.
//!
//! Handlers are plain async functions over axum extractors so integration
//! tests can call them directly without a network listener. They stay thin:
//! request parsing and response shaping here, all state transitions in
//! [`crate::account`].

pub mod admin;
pub mod ads;
pub mod deposits;
pub mod session;
pub mod withdrawals;

use axum::http::HeaderMap;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{
    auth,
    db::{self, DbConnection},
    error::ApiError,
    ledger::{AccountState, LedgerEvent},
    models::{Ad, Deposit, LedgerEntry, User, Withdrawal},
    money::Money,
    state::AppState,
};

/// Public view of an account's balances and mechanics.
#[derive(Serialize, Debug)]
pub struct AccountView {
    /// Account id.
    pub id: i32,
    /// Login name.
    pub username: String,
    /// Whether the account may use the admin surface.
    pub is_admin: bool,
    /// Primary withdrawable balance.
    pub milestone_amount: Money,
    /// Today's earnings counter.
    pub milestone_reward: Money,
    /// Restriction escrow balance.
    pub destination_amount: Money,
    /// Loyalty points.
    pub points: i32,
    /// Lifetime completed-ad count.
    pub total_ads_completed: i32,
    /// Voucher lock flag.
    pub locked: bool,
    /// Ongoing milestone, if configured.
    pub milestone: Option<MilestoneView>,
    /// Imposed restriction, if any.
    pub restriction: Option<RestrictionView>,
}

/// View of an ongoing milestone.
#[derive(Serialize, Debug)]
pub struct MilestoneView {
    /// Target completed-ad count.
    pub target: i32,
    /// Payout behaviour (`voucher` | `bonus`).
    pub kind: &'static str,
    /// Prize on completion.
    pub prize: Money,
}

/// View of an imposed restriction.
#[derive(Serialize, Debug)]
pub struct RestrictionView {
    /// Ads that must be completed under the restriction.
    pub ads_limit: i32,
    /// Deposit required to release the escrow.
    pub deposit: Money,
    /// Per-ad commission while restricted.
    pub commission: Money,
    /// Ads completed so far.
    pub completed: i32,
    /// Whether the quota is met and a deposit is awaited.
    pub awaiting_deposit: bool,
}

/// View of a produced audit event.
#[derive(Serialize, Debug)]
pub struct EventView {
    /// Entry kind.
    pub kind: &'static str,
    /// Signed amount moved.
    pub amount: Money,
}

/// View of an ad.
#[derive(Serialize, Debug)]
pub struct AdView {
    /// Ad id.
    pub id: i32,
    /// Display title.
    pub title: String,
    /// Reward per completed view.
    pub price: Money,
    /// Whether the ad is currently served.
    pub active: bool,
}

/// View of a withdrawal request.
#[derive(Serialize, Debug)]
pub struct WithdrawalView {
    /// Request id.
    pub id: i32,
    /// Requesting account.
    pub user_id: i32,
    /// Requested amount.
    pub amount: Money,
    /// Lifecycle state.
    pub status: String,
    /// Request timestamp (UTC).
    pub requested_at: NaiveDateTime,
    /// Resolution timestamp, once resolved.
    pub resolved_at: Option<NaiveDateTime>,
}

/// View of a recorded deposit.
#[derive(Serialize, Debug)]
pub struct DepositView {
    /// Row id.
    pub id: i32,
    /// Deposited amount.
    pub amount: Money,
    /// Deposit timestamp (UTC).
    pub created_at: NaiveDateTime,
}

/// View of an audit-trail row.
#[derive(Serialize, Debug)]
pub struct LedgerEntryView {
    /// Row id.
    pub id: i32,
    /// Ad involved, for click entries.
    pub ad_id: Option<i32>,
    /// Entry kind.
    pub kind: String,
    /// Signed amount moved.
    pub amount: Money,
    /// Primary balance after the entry.
    pub balance_after: Money,
    /// Entry timestamp (UTC).
    pub created_at: NaiveDateTime,
}

impl AccountView {
    /// Combine row identity with a ledger snapshot.
    #[must_use]
    pub fn new(user: &User, state: &AccountState) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
            milestone_amount: state.milestone_amount,
            milestone_reward: state.milestone_reward,
            destination_amount: state.destination_amount,
            points: state.points,
            total_ads_completed: state.total_ads_completed,
            locked: state.locked,
            milestone: state.milestone.map(|m| MilestoneView {
                target: m.target,
                kind: m.kind.as_str(),
                prize: m.prize,
            }),
            restriction: state.restriction.map(|r| RestrictionView {
                ads_limit: r.ads_limit,
                deposit: r.deposit,
                commission: r.commission,
                completed: r.completed,
                awaiting_deposit: r.awaiting_deposit(),
            }),
        }
    }

    /// Build the view straight from a user row.
    #[must_use]
    pub fn from_user(user: &User) -> Self { Self::new(user, &user.account_state()) }
}

impl EventView {
    /// Map produced ledger events into response views.
    #[must_use]
    pub fn from_events(events: &[LedgerEvent]) -> Vec<Self> {
        events
            .iter()
            .map(|e| Self {
                kind: e.kind.as_str(),
                amount: e.amount,
            })
            .collect()
    }
}

impl From<Ad> for AdView {
    fn from(ad: Ad) -> Self {
        Self {
            id: ad.id,
            title: ad.title,
            price: Money::from_minor(ad.price),
            active: ad.active,
        }
    }
}

impl From<Withdrawal> for WithdrawalView {
    fn from(w: Withdrawal) -> Self {
        Self {
            id: w.id,
            user_id: w.user_id,
            amount: Money::from_minor(w.amount),
            status: w.status,
            requested_at: w.requested_at,
            resolved_at: w.resolved_at,
        }
    }
}

impl From<Deposit> for DepositView {
    fn from(d: Deposit) -> Self {
        Self {
            id: d.id,
            amount: Money::from_minor(d.amount),
            created_at: d.created_at,
        }
    }
}

impl From<LedgerEntry> for LedgerEntryView {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id,
            ad_id: entry.ad_id,
            kind: entry.kind,
            amount: Money::from_minor(entry.amount),
            balance_after: Money::from_minor(entry.balance_after),
            created_at: entry.created_at,
        }
    }
}

/// Resolve the caller's bearer token to their user row.
///
/// # Errors
/// Returns [`ApiError::Unauthorized`] when the token is missing or stale.
pub(crate) async fn require_user(
    state: &AppState,
    headers: &HeaderMap,
    conn: &mut DbConnection,
) -> Result<User, ApiError> {
    let user_id = auth::authenticate(&state.sessions, headers).await?;
    db::get_user(conn, user_id)
        .await?
        .ok_or(ApiError::Unauthorized)
}

/// Resolve the caller and require admin rights.
///
/// # Errors
/// Returns [`ApiError::Unauthorized`] for unauthenticated callers and
/// [`ApiError::Forbidden`] for non-admin accounts.
pub(crate) async fn require_admin(
    state: &AppState,
    headers: &HeaderMap,
    conn: &mut DbConnection,
) -> Result<User, ApiError> {
    let user = require_user(state, headers, conn).await?;
    auth::ensure_admin(&user)?;
    Ok(user)
}
