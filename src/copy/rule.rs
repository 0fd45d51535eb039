// src/copy/rule.rs

use std::fmt;
use std::path::PathBuf;

/// One source glob mirrored into one destination root.
///
/// Several rules may share a `source_pattern` and differ only in
/// `destination_root`; rules are built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRule {
    /// Glob relative to the project root, e.g. `SledgehammerLua/**`.
    pub source_pattern: String,
    /// Matched entries land at `destination_root/<path relative to root>`.
    pub destination_root: PathBuf,
    pub preserve_timestamp: bool,
    pub preserve_mode: bool,
}

impl CopyRule {
    pub fn new(source_pattern: impl Into<String>, destination_root: impl Into<PathBuf>) -> Self {
        Self {
            source_pattern: source_pattern.into(),
            destination_root: destination_root.into(),
            preserve_timestamp: true,
            preserve_mode: true,
        }
    }

    pub fn preserve_timestamp(mut self, val: bool) -> Self {
        self.preserve_timestamp = val;
        self
    }

    pub fn preserve_mode(mut self, val: bool) -> Self {
        self.preserve_mode = val;
        self
    }
}

impl fmt::Display for CopyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            self.source_pattern,
            self.destination_root.display()
        )?;
        let mut flags = Vec::new();
        if self.preserve_timestamp {
            flags.push("timestamp");
        }
        if self.preserve_mode {
            flags.push("mode");
        }
        if !flags.is_empty() {
            write!(f, " [{}]", flags.join(", "))?;
        }
        Ok(())
    }
}
