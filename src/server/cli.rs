//! Command-line interface definitions for the admill server.
//!
//! Keeping these types in the library allows the binary to stay a thin
//! wrapper and lets tests drive the exact configuration surface operators
//! see.

#![expect(
    non_snake_case,
    reason = "Clap/OrthoConfig derive macros generate helper modules with uppercase names"
)]
#![allow(
    missing_docs,
    reason = "OrthoConfig and Clap derive macros generate items that cannot be documented"
)]
#![allow(
    unfulfilled_lint_expectations,
    reason = "derive macros conditionally generate items"
)]

use anyhow::Result;
use argon2::Params;
use clap::{Args, Parser, Subcommand};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

/// Arguments for the `create-user` administrative subcommand.
#[expect(
    missing_docs,
    reason = "OrthoConfig derive macro generates items that cannot be documented"
)]
#[derive(Parser, OrthoConfig, Deserialize, Serialize, Default, Debug, Clone)]
#[ortho_config(prefix = "ADMILL_")]
pub struct CreateUserArgs {
    /// Username for the new account.
    pub username: Option<String>,
    /// Password for the new account.
    pub password: Option<String>,
    /// Grant the new account admin rights.
    #[ortho_config(default = false)]
    #[arg(long)]
    #[serde(default)]
    pub admin: bool,
}

/// CLI subcommands exposed by `admill`.
#[derive(Subcommand, Deserialize, Serialize, Debug, Clone)]
pub enum Commands {
    /// Create a new user account.
    #[command(name = "create-user")]
    CreateUser(CreateUserArgs),
    /// Zero every user's daily reward counter once and exit.
    #[command(name = "reset-rewards")]
    ResetRewards,
}

/// Runtime configuration shared by all entry points.
///
/// The default bind address `0.0.0.0:8080` listens on all interfaces.
/// This is convenient for local development, but production deployments
/// should bind to a specific interface and sit behind a reverse proxy.
#[expect(
    missing_docs,
    reason = "OrthoConfig derive macro generates items that cannot be documented"
)]
#[derive(Args, OrthoConfig, Serialize, Deserialize, Default, Debug, Clone)]
#[ortho_config(prefix = "ADMILL_")]
pub struct AppConfig {
    /// Server bind address.
    #[ortho_config(default = "0.0.0.0:8080".to_owned())]
    #[arg(long, default_value_t = String::from("0.0.0.0:8080"))]
    pub bind: String,
    /// Database connection string or path.
    #[ortho_config(default = "admill.db".to_owned())]
    #[arg(long, default_value_t = String::from("admill.db"))]
    pub database: String,
    /// Argon2 memory cost parameter.
    #[ortho_config(default = Params::DEFAULT_M_COST)]
    #[arg(long, default_value_t = Params::DEFAULT_M_COST)]
    pub argon2_m_cost: u32,
    /// Argon2 time cost parameter.
    #[ortho_config(default = Params::DEFAULT_T_COST)]
    #[arg(long, default_value_t = Params::DEFAULT_T_COST)]
    pub argon2_t_cost: u32,
    /// Argon2 parallelism cost parameter.
    #[ortho_config(default = Params::DEFAULT_P_COST)]
    #[arg(long, default_value_t = Params::DEFAULT_P_COST)]
    pub argon2_p_cost: u32,
    /// UTC hour (0-23) at which daily reward counters reset.
    #[ortho_config(default = 0u32)]
    #[arg(long, default_value_t = 0)]
    pub reward_reset_hour: u32,
}

/// CLI-only configuration overrides.
///
/// Every field is optional so that flags the operator did not pass never
/// shadow environment or file values during the merge.
#[derive(Args, Serialize, Deserialize, Default, Debug, Clone)]
pub struct AppConfigCli {
    /// Server bind address.
    #[arg(long)]
    pub bind: Option<String>,
    /// Database connection string or path.
    #[arg(long)]
    pub database: Option<String>,
    /// Argon2 memory cost parameter.
    #[arg(long)]
    pub argon2_m_cost: Option<u32>,
    /// Argon2 time cost parameter.
    #[arg(long)]
    pub argon2_t_cost: Option<u32>,
    /// Argon2 parallelism cost parameter.
    #[arg(long)]
    pub argon2_p_cost: Option<u32>,
    /// UTC hour (0-23) at which daily reward counters reset.
    #[arg(long)]
    pub reward_reset_hour: Option<u32>,
}

impl AppConfigCli {
    /// Merge these overrides with environment and file configuration.
    ///
    /// # Errors
    /// Returns any error reported by the configuration loader.
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut args = vec!["admill".to_owned()];
        push_flag(&mut args, "--bind", self.bind.as_ref());
        push_flag(&mut args, "--database", self.database.as_ref());
        push_flag(&mut args, "--argon2-m-cost", self.argon2_m_cost.as_ref());
        push_flag(&mut args, "--argon2-t-cost", self.argon2_t_cost.as_ref());
        push_flag(&mut args, "--argon2-p-cost", self.argon2_p_cost.as_ref());
        push_flag(
            &mut args,
            "--reward-reset-hour",
            self.reward_reset_hour.as_ref(),
        );
        Ok(AppConfig::load_from_iter(args)?)
    }
}

fn push_flag<T: ToString>(args: &mut Vec<String>, flag: &str, value: Option<&T>) {
    if let Some(v) = value {
        args.push(flag.to_owned());
        args.push(v.to_string());
    }
}

/// Top-level CLI entry point consumed by the binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Cli {
    /// CLI configuration overrides (merged with env and files at runtime).
    #[command(flatten)]
    pub config: AppConfigCli,
    /// Optional subcommand.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// A parsed CLI with its configuration fully merged.
#[derive(Debug, Clone)]
pub struct ResolvedCli {
    /// Merged runtime configuration.
    pub config: AppConfig,
    /// Requested subcommand, if any.
    pub command: Option<Commands>,
}

impl Cli {
    /// Merge the parsed arguments into a [`ResolvedCli`].
    ///
    /// # Errors
    /// Returns any error reported by the configuration loader.
    pub fn resolve(self) -> Result<ResolvedCli> {
        let config = self.config.resolve()?;
        Ok(ResolvedCli {
            config,
            command: self.command,
        })
    }
}

/// Parse process arguments and merge configuration sources.
///
/// # Errors
/// Returns any error reported by the configuration loader.
pub fn load_cli() -> Result<ResolvedCli> { Cli::parse().resolve() }

#[cfg(test)]
mod tests {
    use figment::Jail;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn env_config_loading() {
        Jail::expect_with(|j| {
            j.set_env("ADMILL_BIND", "127.0.0.1:8000");
            j.set_env("ADMILL_DATABASE", "env.db");
            let cfg = AppConfig::load_from_iter(["admill"]).expect("load");
            assert_eq!(cfg.bind, "127.0.0.1:8000");
            assert_eq!(cfg.database, "env.db".to_string());
            Ok(())
        });
    }

    #[rstest]
    fn cli_overrides_env() {
        Jail::expect_with(|j| {
            j.set_env("ADMILL_BIND", "127.0.0.1:8000");
            let cfg = AppConfig::load_from_iter(["admill", "--bind", "0.0.0.0:9000"]).expect("load");
            assert_eq!(cfg.bind, "0.0.0.0:9000");
            Ok(())
        });
    }

    #[rstest]
    fn loads_from_dotfile() {
        Jail::expect_with(|j| {
            j.create_file(".admill.toml", "bind = \"1.2.3.4:1111\"")?;
            let cfg = AppConfig::load_from_iter(["admill"]).expect("load");
            assert_eq!(cfg.bind, "1.2.3.4:1111".to_string());
            Ok(())
        });
    }

    #[rstest]
    fn reward_reset_hour_cli() {
        Jail::expect_with(|_j| {
            let cfg =
                AppConfig::load_from_iter(["admill", "--reward-reset-hour", "4"]).expect("load");
            assert_eq!(cfg.reward_reset_hour, 4);
            Ok(())
        });
    }

    #[rstest]
    fn unset_cli_overrides_do_not_mask_env() {
        Jail::expect_with(|j| {
            j.set_env("ADMILL_DATABASE", "env.db");
            let overrides = AppConfigCli {
                bind: Some("0.0.0.0:9000".to_owned()),
                ..AppConfigCli::default()
            };
            let cfg = overrides.resolve().expect("resolve");
            assert_eq!(cfg.bind, "0.0.0.0:9000");
            assert_eq!(cfg.database, "env.db");
            Ok(())
        });
    }
}
