// src/config/validate.rs

use crate::config::model::RawConfigFile;
use crate::errors::{ModsyncError, Result};
use crate::watch::WatchProfile;

/// Run semantic validation against a raw configuration.
///
/// This checks:
/// - there is at least one `[[copy]]` entry
/// - every entry has a non-empty `src` and `dest`
/// - `[watch].paths` is non-empty and every watch/exclude glob compiles
/// - `[watch].rules` only names existing entries
///
/// Source globs are deliberately not compiled here: a bad source glob makes
/// its rule a no-op at copy time rather than rejecting the configuration.
pub fn validate_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_copy_rules(cfg)?;
    validate_copy_entries(cfg)?;
    validate_watch(cfg)?;
    Ok(())
}

fn ensure_has_copy_rules(cfg: &RawConfigFile) -> Result<()> {
    if cfg.copy.is_empty() {
        return Err(ModsyncError::Config(
            "config must contain at least one [[copy]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_copy_entries(cfg: &RawConfigFile) -> Result<()> {
    for (i, entry) in cfg.copy.iter().enumerate() {
        if entry.src.trim().is_empty() {
            return Err(ModsyncError::Config(format!(
                "[[copy]] entry #{i} has an empty `src`"
            )));
        }
        if entry.dest.trim().is_empty() {
            return Err(ModsyncError::Config(format!(
                "[[copy]] entry #{i} has an empty `dest`"
            )));
        }
    }
    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.paths.is_empty() {
        return Err(ModsyncError::Config(
            "[watch].paths must list at least one glob".to_string(),
        ));
    }

    WatchProfile::new(&cfg.watch.paths, &cfg.watch.exclude)
        .map_err(|e| ModsyncError::Config(format!("invalid [watch] glob: {e}")))?;

    if let Some(rules) = &cfg.watch.rules {
        if rules.is_empty() {
            return Err(ModsyncError::Config(
                "[watch].rules must not be empty when given".to_string(),
            ));
        }
        for &i in rules {
            if i >= cfg.copy.len() {
                return Err(ModsyncError::Config(format!(
                    "[watch].rules references unknown [[copy]] entry #{i} (have {})",
                    cfg.copy.len()
                )));
            }
        }
    }
    Ok(())
}
