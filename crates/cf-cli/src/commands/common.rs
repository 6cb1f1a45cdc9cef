//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use cf_core::Config;
use cf_db::DuckDbBackend;
use std::fmt;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that the database connection is closed before the process exits.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main.rs turns it into the process status
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Exit status when an `error`-severity quality check fails
pub(crate) const EXIT_QUALITY_FAILURE: i32 = 2;

/// Load the config file named by `--config`
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let path = Path::new(&global.config);
    let config = Config::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    log::debug!(
        "Warehouse '{}' at {}",
        config.database.name,
        config.database.path
    );
    Ok(config)
}

/// Open the warehouse connection held for the whole run
pub(crate) fn connect(config: &Config) -> Result<DuckDbBackend> {
    let db = DuckDbBackend::new(&config.database.path).with_context(|| {
        format!(
            "Failed to connect to database '{}' at {}",
            config.database.name, config.database.path
        )
    })?;
    if config.database.is_in_memory() {
        log::warn!("Using an in-memory warehouse; nothing persists after this run");
    }
    Ok(db)
}

/// Close the connection, reporting engine errors on shutdown
pub(crate) fn close(db: DuckDbBackend) -> Result<()> {
    db.close().context("Failed to close database")
}
