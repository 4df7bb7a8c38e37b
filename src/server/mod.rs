//! Server orchestration utilities.
//!
//! This module exposes the command-line interface and reusable helpers that
//! power the server binary. Binary crates can re-use these entry points to
//! remain thin wrappers that only need to call [`run`].

pub mod admin;
pub mod cli;
pub mod http;

use anyhow::Result;
pub use cli::{AppConfig, AppConfigCli, Cli, Commands, CreateUserArgs, ResolvedCli, load_cli};
pub use http::{build_router, run_daemon};
use tracing_subscriber::{EnvFilter, fmt};

/// Parse CLI arguments, install tracing, and execute the requested command
/// or daemon.
///
/// # Errors
///
/// Returns any error emitted while parsing configuration or starting the
/// runtime.
pub async fn run() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = load_cli()?;
    dispatch(cli).await
}

/// Execute the server logic using an already resolved [`ResolvedCli`].
///
/// # Errors
///
/// Propagates any failure reported by the selected command or the daemon.
pub async fn dispatch(cli: ResolvedCli) -> Result<()> {
    let ResolvedCli { config, command } = cli;
    if let Some(command) = command {
        admin::run_command(command, &config).await
    } else {
        run_daemon(config).await
    }
}
