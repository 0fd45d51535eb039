// src/copy/pass.rs

use std::cmp::Reverse;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::copy::pattern::{MatchedEntry, SourcePattern};
use crate::copy::report::{CopyFailure, CopyReport};
use crate::copy::rule::CopyRule;
use crate::errors::ModsyncError;
use crate::fs::FileSystem;

/// Run every rule in order against `root` and return the combined report.
///
/// Destination files are overwritten unconditionally. A failing entry is
/// recorded and the pass moves on; a failing rule does not stop later rules.
pub fn run_copy(fs: &dyn FileSystem, root: &Path, rules: &[CopyRule]) -> CopyReport {
    let mut report = CopyReport::default();
    for (index, rule) in rules.iter().enumerate() {
        report.merge(run_copy_rule(fs, root, index, rule));
    }
    info!(
        copied = report.files_copied,
        dirs = report.dirs_created,
        bytes = report.bytes_copied,
        failed = report.failure_count(),
        "copy pass finished"
    );
    report
}

/// Run a single rule. `index` is only used to label failures and logs.
pub fn run_copy_rule(fs: &dyn FileSystem, root: &Path, index: usize, rule: &CopyRule) -> CopyReport {
    let mut report = CopyReport::default();

    let pattern = match SourcePattern::compile(&rule.source_pattern) {
        Ok(p) => p,
        Err(err) => {
            warn!(rule = index, error = %err, "skipping rule");
            report.unmatched_rules += 1;
            return report;
        }
    };

    let (entries, walk_failures) = pattern.enumerate(fs, root);
    for (path, source) in walk_failures {
        record(&mut report, index, path, source);
    }

    if entries.is_empty() {
        if report.failures.is_empty() {
            let err = ModsyncError::PatternResolution {
                pattern: rule.source_pattern.clone(),
                reason: format!("no entries under {}", root.display()),
            };
            warn!(rule = index, error = %err, "rule matched nothing");
            report.unmatched_rules += 1;
        }
        return report;
    }

    debug!(rule = index, %rule, matched = entries.len(), "running copy rule");

    let mut created_dirs: Vec<(&MatchedEntry, PathBuf)> = Vec::new();
    for entry in &entries {
        let dest = rule.destination_root.join(&entry.rel);
        if entry.is_dir {
            // An earlier pass may have left this directory read-only.
            let made = fs
                .ensure_writable(&dest)
                .and_then(|()| fs.create_dir_all(&dest));
            match made {
                Ok(()) => {
                    report.dirs_created += 1;
                    created_dirs.push((entry, dest));
                }
                Err(source) => record(&mut report, index, dest, source),
            }
        } else if let Err((path, source)) = copy_entry(fs, rule, entry, &dest, &mut report) {
            record(&mut report, index, path, source);
        }
    }

    // Directory metadata goes last: writing files bumps a directory's mtime,
    // and a read-only mode would block the writes. Deepest first.
    created_dirs.sort_by_key(|(entry, _)| Reverse(entry.rel.matches('/').count()));
    for (entry, dest) in created_dirs {
        if let Err(source) = apply_dir_metadata(fs, rule, &entry.source, &dest) {
            record(&mut report, index, dest, source);
        }
    }

    report
}

fn apply_dir_metadata(
    fs: &dyn FileSystem,
    rule: &CopyRule,
    src: &Path,
    dest: &Path,
) -> io::Result<()> {
    if rule.preserve_mode {
        fs.copy_permissions(src, dest)?;
    }
    if rule.preserve_timestamp {
        fs.copy_times(src, dest)?;
    }
    Ok(())
}

/// Copy one file and apply the rule's preservation flags.
///
/// On failure returns the path the error belongs to: the source for read
/// errors, the destination (or its parent) for write errors.
fn copy_entry(
    fs: &dyn FileSystem,
    rule: &CopyRule,
    entry: &MatchedEntry,
    dest: &Path,
    report: &mut CopyReport,
) -> Result<(), (PathBuf, io::Error)> {
    if let Some(parent) = dest.parent() {
        fs.create_dir_all(parent)
            .map_err(|e| (parent.to_path_buf(), e))?;
    }

    let mut reader = fs
        .open_read(&entry.source)
        .map_err(|e| (entry.source.clone(), e))?;
    fs.ensure_writable(dest)
        .map_err(|e| (dest.to_path_buf(), e))?;
    let mut writer = fs
        .create_write(dest)
        .map_err(|e| (dest.to_path_buf(), e))?;
    let bytes = io::copy(&mut reader, &mut writer).map_err(|e| (dest.to_path_buf(), e))?;
    writer.flush().map_err(|e| (dest.to_path_buf(), e))?;
    // Close before touching metadata so the mtime is not bumped afterwards.
    drop(writer);

    if rule.preserve_mode {
        fs.copy_permissions(&entry.source, dest)
            .map_err(|e| (dest.to_path_buf(), e))?;
    }
    if rule.preserve_timestamp {
        fs.copy_times(&entry.source, dest)
            .map_err(|e| (dest.to_path_buf(), e))?;
    }

    debug!(src = ?entry.source, dest = ?dest, bytes, "copied file");
    report.files_copied += 1;
    report.bytes_copied += bytes;
    Ok(())
}

fn record(report: &mut CopyReport, rule: usize, path: PathBuf, source: io::Error) {
    error!(rule, path = ?path, error = %source, "copy failed");
    report.failures.push(CopyFailure { rule, path, source });
}
