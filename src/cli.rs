// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `modsync`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "modsync",
    version,
    about = "Copy mod sources into the game and prod mod directories, optionally on every change.",
    long_about = None
)]
pub struct CliArgs {
    /// `copy` runs one pass and exits; `watch` runs one pass, then re-copies
    /// on every change under the watched paths.
    #[arg(value_enum, default_value_t = Mode::Copy)]
    pub mode: Mode,

    /// Path to the config file (TOML).
    ///
    /// If omitted, `Modsync.toml` in the current directory is used when it
    /// exists, otherwise the built-in configuration.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MODSYNC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the copy rules and watch set, but don't copy anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Operating mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Copy,
    Watch,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
