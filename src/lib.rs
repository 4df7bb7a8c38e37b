//! Core library for the admill daemon.
//!
//! This crate exposes the ledger state machine, database utilities, and the
//! HTTP surface used by the server binary and supporting tools. Only one
//! database backend (either `sqlite` or `postgres`) should be enabled at a
//! time.
cfg_if::cfg_if! {
    if #[cfg(all(feature = "sqlite", feature = "postgres", not(feature = "lint")))] {
        compile_error!("Choose either sqlite or postgres, not both");
    } else if #[cfg(feature = "sqlite")] {
        pub use diesel::sqlite::Sqlite as DbBackend;
    } else if #[cfg(feature = "postgres")] {
        pub use diesel::pg::Pg as DbBackend;
    } else {
        compile_error!("Either the 'sqlite' or 'postgres' feature must be enabled");
    }
}

pub mod account;
pub mod auth;
pub mod db;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod money;
pub mod passwords;
pub mod rewards;
pub mod schema;
pub mod server;
pub mod state;
