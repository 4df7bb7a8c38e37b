//! Manage database connections and domain queries.
//!
//! This module tree exposes helpers for creating pooled Diesel connections,
//! running embedded migrations, auditing backend capabilities, and executing
//! application queries grouped by domain concerns.

mod ads;
mod audit;
mod connection;
mod deposits;
mod entries;
mod migrations;
mod users;
mod withdrawals;


#[cfg(feature = "postgres")]
pub use self::audit::audit_postgres_features;
#[cfg(feature = "sqlite")]
pub use self::audit::audit_sqlite_features;
pub use self::{
    ads::{AdChanges, create_ad, get_ad, list_active_ads, list_ads, update_ad},
    connection::{Backend, DbConnection, DbPool, MIGRATIONS, establish_pool},
    deposits::{create_deposit, list_deposits_for_user},
    entries::{append_entry, list_entries_for_user},
    migrations::{apply_migrations, run_migrations},
    users::{
        create_user,
        get_user,
        get_user_by_name,
        list_users,
        persist_account,
        reset_daily_rewards,
    },
    withdrawals::{
        create_withdrawal,
        get_withdrawal,
        has_pending_withdrawal,
        list_withdrawals,
        list_withdrawals_for_user,
        resolve_withdrawal,
    },
};
