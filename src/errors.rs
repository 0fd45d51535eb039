// src/errors.rs

//! Crate-wide error type and `Result` alias.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModsyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source glob that is malformed or matched nothing. The copy pass
    /// treats this as a no-op for the rule; it never aborts a pass.
    #[error("Pattern `{pattern}` could not be resolved: {reason}")]
    PatternResolution { pattern: String, reason: String },

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A copy pass finished with at least one failed entry. `path` is the
    /// first failure; `failures` counts all of them.
    #[error("copy failed at {path:?}: {source} ({failures} failure(s) in pass)")]
    CopyFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
        failures: usize,
    },

    #[error("Watch setup failed: {0}")]
    WatchSetup(String),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ModsyncError {
    /// Attach a path to a raw `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ModsyncError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<notify::Error> for ModsyncError {
    fn from(err: notify::Error) -> Self {
        ModsyncError::WatchSetup(err.to_string())
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ModsyncError>;
