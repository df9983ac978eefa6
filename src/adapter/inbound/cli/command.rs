//! Command-line interface definitions.
//!
//! `bitcoin-hub` with no subcommand starts the API server with defaults.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Bitcoin market, macro and sentiment dashboard API
#[derive(Parser, Debug)]
#[command(name = "bitcoin-hub")]
#[command(version, about)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The chosen subcommand, `serve` with defaults when none was given.
    #[must_use]
    pub fn command_or_default(self) -> Commands {
        self.command
            .unwrap_or_else(|| Commands::Serve(ServeArgs::default()))
    }
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the JSON API server (default)
    Serve(ServeArgs),

    /// Validate configuration and report which API keys are set
    Check(CheckArgs),
}

/// Arguments for `bitcoin-hub serve`.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Override the bind host
    #[arg(long)]
    pub host: Option<String>,

    /// Override the listen port
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// Disable CORS headers
    #[arg(long)]
    pub no_cors: bool,
}

/// Arguments for `bitcoin-hub check`.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArg,
}

#[derive(Args, Debug, Default)]
pub struct ConfigArg {
    /// Path to the TOML config; defaults apply when the file is absent
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub path: Option<PathBuf>,
}

impl ConfigArg {
    pub const DEFAULT_PATH: &'static str = "config.toml";

    /// Whether the user named a file explicitly.
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        self.path.is_some()
    }

    #[must_use]
    pub fn resolve(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_PATH))
    }
}
