//! Database row types.
//!
//! Rows keep plain column types (money as `i64` minor units, enums as
//! text); the [`crate::ledger`] module owns the typed view of an account.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ledger::{AccountState, Milestone, MilestoneKind, Restriction};
use crate::money::Money;

/// A user account row.
#[derive(Queryable, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    /// Row id.
    pub id: i32,
    /// Unique login name.
    pub username: String,
    /// Argon2 PHC password hash.
    pub password: String,
    /// Whether the account may use the admin surface.
    pub is_admin: bool,
    /// Primary withdrawable balance, minor units.
    pub milestone_amount: i64,
    /// Daily reward counter, minor units; reset nightly.
    pub milestone_reward: i64,
    /// Restriction escrow balance, minor units.
    pub destination_amount: i64,
    /// Loyalty points.
    pub points: i32,
    /// Lifetime completed-ad count.
    pub total_ads_completed: i32,
    /// Target click count of the ongoing milestone, if any.
    pub ongoing_milestone: Option<i32>,
    /// Payout behaviour of the ongoing milestone (`voucher` | `bonus`).
    pub milestone_kind: Option<String>,
    /// Prize of the ongoing milestone, minor units.
    pub milestone_prize: i64,
    /// Voucher lock flag.
    pub locked: bool,
    /// Restriction quota, if a restriction is imposed.
    pub restriction_ads_limit: Option<i32>,
    /// Deposit required to release restriction escrow, minor units.
    pub restriction_deposit: i64,
    /// Per-ad commission while restricted, minor units.
    pub restriction_commission: i64,
    /// Ads completed under the current restriction.
    pub restricted_ads_completed: i32,
    /// Creation timestamp (UTC).
    pub created_at: NaiveDateTime,
}

impl User {
    /// Build the typed ledger snapshot for this row.
    #[must_use]
    pub fn account_state(&self) -> AccountState {
        let milestone = self.ongoing_milestone.and_then(|target| {
            let kind = self.milestone_kind.as_deref().and_then(MilestoneKind::parse)?;
            Some(Milestone {
                target,
                kind,
                prize: Money::from_minor(self.milestone_prize),
            })
        });
        let restriction = self.restriction_ads_limit.map(|ads_limit| Restriction {
            ads_limit,
            deposit: Money::from_minor(self.restriction_deposit),
            commission: Money::from_minor(self.restriction_commission),
            completed: self.restricted_ads_completed,
        });
        AccountState {
            milestone_amount: Money::from_minor(self.milestone_amount),
            milestone_reward: Money::from_minor(self.milestone_reward),
            destination_amount: Money::from_minor(self.destination_amount),
            points: self.points,
            total_ads_completed: self.total_ads_completed,
            milestone,
            restriction,
            locked: self.locked,
        }
    }
}

/// Insertable user account.
#[derive(Insertable, Deserialize)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    /// Unique login name.
    pub username: &'a str,
    /// Argon2 PHC password hash.
    pub password: &'a str,
    /// Whether the account may use the admin surface.
    pub is_admin: bool,
    /// Creation timestamp (UTC).
    pub created_at: NaiveDateTime,
}

/// An ad available for viewing.
#[derive(Queryable, Serialize, Deserialize, Debug, Clone)]
pub struct Ad {
    /// Row id.
    pub id: i32,
    /// Display title.
    pub title: String,
    /// Reward per completed view, minor units.
    pub price: i64,
    /// Whether the ad is currently served to users.
    pub active: bool,
    /// Creation timestamp (UTC).
    pub created_at: NaiveDateTime,
}

/// Insertable ad.
#[derive(Insertable, Deserialize)]
#[diesel(table_name = crate::schema::ads)]
pub struct NewAd<'a> {
    /// Display title.
    pub title: &'a str,
    /// Reward per completed view, minor units.
    pub price: i64,
    /// Whether the ad is currently served.
    pub active: bool,
    /// Creation timestamp (UTC).
    pub created_at: NaiveDateTime,
}

/// An append-only audit-trail row.
#[derive(Queryable, Serialize, Debug, Clone)]
pub struct LedgerEntry {
    /// Row id.
    pub id: i32,
    /// Account the entry belongs to.
    pub user_id: i32,
    /// Ad involved, for click entries.
    pub ad_id: Option<i32>,
    /// Entry kind (see [`crate::ledger::EventKind`]).
    pub kind: String,
    /// Signed amount moved, minor units.
    pub amount: i64,
    /// Primary balance after the entry, minor units.
    pub balance_after: i64,
    /// Free-form annotation.
    pub note: Option<String>,
    /// Entry timestamp (UTC).
    pub created_at: NaiveDateTime,
}

/// Insertable audit-trail row.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::ledger_entries)]
pub struct NewLedgerEntry<'a> {
    /// Account the entry belongs to.
    pub user_id: i32,
    /// Ad involved, for click entries.
    pub ad_id: Option<i32>,
    /// Entry kind (see [`crate::ledger::EventKind`]).
    pub kind: &'a str,
    /// Signed amount moved, minor units.
    pub amount: i64,
    /// Primary balance after the entry, minor units.
    pub balance_after: i64,
    /// Free-form annotation.
    pub note: Option<&'a str>,
    /// Entry timestamp (UTC).
    pub created_at: NaiveDateTime,
}

/// Lifecycle of a withdrawal request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WithdrawStatus {
    /// Requested and not yet resolved by an admin.
    Pending,
    /// Approved; the balance has been debited.
    Approved,
    /// Rejected; balances untouched.
    Rejected,
}

impl WithdrawStatus {
    /// Stable textual form stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse the stored textual form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// A withdrawal request row.
#[derive(Queryable, Serialize, Debug, Clone)]
pub struct Withdrawal {
    /// Row id.
    pub id: i32,
    /// Requesting account.
    pub user_id: i32,
    /// Requested amount, minor units.
    pub amount: i64,
    /// Lifecycle state (see [`WithdrawStatus`]).
    pub status: String,
    /// Request timestamp (UTC).
    pub requested_at: NaiveDateTime,
    /// Resolution timestamp, once approved or rejected.
    pub resolved_at: Option<NaiveDateTime>,
}

/// Insertable withdrawal request.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::withdrawals)]
pub struct NewWithdrawal<'a> {
    /// Requesting account.
    pub user_id: i32,
    /// Requested amount, minor units.
    pub amount: i64,
    /// Lifecycle state.
    pub status: &'a str,
    /// Request timestamp (UTC).
    pub requested_at: NaiveDateTime,
}

/// A recorded deposit row.
#[derive(Queryable, Serialize, Debug, Clone)]
pub struct Deposit {
    /// Row id.
    pub id: i32,
    /// Depositing account.
    pub user_id: i32,
    /// Deposited amount, minor units.
    pub amount: i64,
    /// Deposit timestamp (UTC).
    pub created_at: NaiveDateTime,
}

/// Insertable deposit.
#[derive(Insertable)]
#[diesel(table_name = crate::schema::deposits)]
pub struct NewDeposit {
    /// Depositing account.
    pub user_id: i32,
    /// Deposited amount, minor units.
    pub amount: i64,
    /// Deposit timestamp (UTC).
    pub created_at: NaiveDateTime,
}
