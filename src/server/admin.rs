//! Administrative command handlers shared across entry points.
//!
//! These helpers keep operator workflows available without going through
//! the HTTP surface: bootstrapping the first admin account and forcing a
//! daily reward reset both run against the database directly.

#![allow(
    clippy::print_stdout,
    reason = "intentional user output for CLI commands"
)]

use anyhow::{Context, Result, anyhow};
use argon2::{Algorithm, Argon2, ParamsBuilder, Version};
use chrono::Utc;
use diesel_async::AsyncConnection;
use ortho_config::load_and_merge_subcommand_for;

use super::{AppConfig, Commands, CreateUserArgs};
use crate::{
    db::{DbConnection, apply_migrations, create_user, reset_daily_rewards},
    models::NewUser,
    passwords::hash_password,
};

/// Execute an administrative command.
///
/// # Errors
///
/// Propagates failures from configuration merging or database operations.
pub async fn run_command(command: Commands, cfg: &AppConfig) -> Result<()> {
    match command {
        Commands::CreateUser(args) => {
            let args = load_and_merge_subcommand_for::<CreateUserArgs>(&args)?;
            run_create_user(args, cfg).await
        }
        Commands::ResetRewards => run_reset_rewards(cfg).await,
    }
}

/// Build an Argon2 instance using the supplied configuration parameters.
///
/// # Errors
///
/// Returns any error emitted while constructing the Argon2 parameter set.
pub fn argon2_from_config(cfg: &AppConfig) -> Result<Argon2<'static>> {
    let params = ParamsBuilder::new()
        .m_cost(cfg.argon2_m_cost)
        .t_cost(cfg.argon2_t_cost)
        .p_cost(cfg.argon2_p_cost)
        .build()
        .with_context(|| {
            format!(
                "invalid Argon2 params derived from config: m_cost={}, t_cost={}, p_cost={}",
                cfg.argon2_m_cost, cfg.argon2_t_cost, cfg.argon2_p_cost
            )
        })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

async fn run_create_user(args: CreateUserArgs, cfg: &AppConfig) -> Result<()> {
    let username = args.username.ok_or_else(|| anyhow!("missing username"))?;
    let password = args.password.ok_or_else(|| anyhow!("missing password"))?;

    let argon2 = argon2_from_config(cfg)?;
    let hashed = hash_password(&argon2, &password)?;
    let new_user = NewUser {
        username: &username,
        password: &hashed,
        is_admin: args.admin,
        created_at: Utc::now().naive_utc(),
    };
    let mut conn = DbConnection::establish(&cfg.database).await?;
    apply_migrations(&mut conn, &cfg.database).await?;
    create_user(&mut conn, &new_user)
        .await
        .with_context(|| format!("failed to create user '{username}'"))?;
    let role = if args.admin { "admin" } else { "user" };
    println!("{role} {username} created");
    Ok(())
}

async fn run_reset_rewards(cfg: &AppConfig) -> Result<()> {
    let mut conn = DbConnection::establish(&cfg.database).await?;
    apply_migrations(&mut conn, &cfg.database).await?;
    let touched = reset_daily_rewards(&mut conn)
        .await
        .context("failed to reset daily rewards")?;
    println!("daily rewards reset for {touched} users");
    Ok(())
}
