//! CLI argument definitions using clap derive API

use cf_core::config::DEFAULT_CONFIG_FILE;
use clap::{Args, Parser, Subcommand};

/// Chartflow - load chart, artist and country data into a star-schema warehouse
#[derive(Parser, Debug)]
#[command(name = "chartflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the pipeline config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drop and recreate the warehouse tables
    CreateTables,

    /// Load staging tables, run transforms, then run quality checks
    Etl,

    /// create-tables followed by etl
    Run,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
