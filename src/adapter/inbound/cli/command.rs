//! Command-line interface definitions.
//!
//! `run` records the live feed into SQLite, `latest` is a read-only polling
//! client of the same database, and `config validate` checks a config file.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Default configuration file, resolved against the working directory.
pub const DEFAULT_CONFIG: &str = "tradetape.toml";

/// Record a live aggregate-trade stream into SQLite
#[derive(Parser, Debug)]
#[command(name = "tradetape")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the tradetape CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reset the trades table and stream trades into it until Ctrl-C
    Run(RunArgs),

    /// Print the most recent stored trade
    Latest(LatestArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `tradetape config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate a configuration file for correctness.
    Validate(ConfigPathArg),
}

/// Arguments for `tradetape run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the configuration file. Defaults apply when it does not exist.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Override the SQLite database path.
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Override the trading pair (e.g. ethusdt).
    #[arg(long)]
    pub symbol: Option<String>,

    /// Override the flush threshold (records).
    #[arg(long)]
    pub flush_threshold: Option<usize>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty-printed logs.
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for `tradetape latest`.
#[derive(Args, Debug)]
pub struct LatestArgs {
    /// Path to the configuration file; only `database` is read from it.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// SQLite database path (overrides the config file).
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Print `{"trade_time":..,"price":..}` instead of a human-readable line.
    #[arg(long)]
    pub json: bool,

    /// Keep polling and print each time the latest trade changes.
    #[arg(long)]
    pub follow: bool,

    /// Poll interval for --follow (milliseconds).
    #[arg(long, default_value_t = 200, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: u64,
}

/// A config file path argument.
#[derive(Args, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}
