// src/logging.rs

//! Logging setup for `modsync` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `MODSYNC_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`

use std::io;

use tracing_subscriber::fmt::{self, MakeWriter};

use crate::cli::LogLevel;
use crate::errors::Result;

/// Environment variable consulted when no `--log-level` is given.
pub const LOG_ENV_VAR: &str = "MODSYNC_LOG";

/// Logs go to stderr so they never mix with `--dry-run` output on stdout.
pub const LOG_WRITER: fn() -> io::Stderr = io::stderr;

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = resolve_level(cli_level, std::env::var(LOG_ENV_VAR).ok().as_deref());

    subscriber(level, LOG_WRITER).init();

    Ok(())
}

fn subscriber<W>(level: tracing::Level, writer: W) -> fmt::SubscriberBuilder<
    fmt::format::DefaultFields,
    fmt::format::Format,
    tracing::level_filters::LevelFilter,
    W,
>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::fmt()
        .with_max_level(level)
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
}

/// Pick the effective level from the CLI flag and the env var value.
pub fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> tracing::Level {
    match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => env_value
            .and_then(parse_level_str)
            .unwrap_or(tracing::Level::INFO),
    }
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
