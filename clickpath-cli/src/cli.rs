//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's
//! derive macros. It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Clickpath -- parse httpd access logs into events and business scenarios.
///
/// Use `clickpath <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "clickpath", version, about, long_about = None)]
pub struct Cli {
    /// Path to the clickpath.toml configuration file.
    #[arg(short, long, default_value = "clickpath.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format (overrides the configuration file).
    #[arg(long, global = true)]
    pub output: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated rows with a header line.
    Csv,
    /// One JSON object per row (JSON Lines).
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse an access log into one row per HTTP request.
    Parse(ParseArgs),

    /// Aggregate an access log into business-scenario rows.
    Scenarios(ScenariosArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- parse ----

/// Parse an access log into HTTP request rows.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Access log file to read, or "-" for stdin.
    pub input: PathBuf,

    /// Log format: preset name ("common", "performance") or a format
    /// specification string (overrides the configuration file).
    #[arg(short, long)]
    pub format: Option<String>,

    /// Suppress fault rows from the output.
    #[arg(long)]
    pub quiet_faults: bool,
}

// ---- scenarios ----

/// Aggregate an access log into business scenarios.
#[derive(Args, Debug)]
pub struct ScenariosArgs {
    /// Access log file to read, or "-" for stdin.
    pub input: PathBuf,

    /// Log format: preset name ("common", "performance") or a format
    /// specification string (overrides the configuration file).
    #[arg(short, long)]
    pub format: Option<String>,

    /// Suppress fault rows from the output.
    #[arg(long)]
    pub quiet_faults: bool,
}

// ---- config ----

/// Manage the clickpath.toml configuration file.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default clickpath.toml to the configured path.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Load and validate the configuration file.
    Check,
}
