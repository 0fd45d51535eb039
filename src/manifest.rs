// src/manifest.rs

//! Informational project manifest (`package.json`).
//!
//! Only `name` and `version` are read, and only to label log output. Nothing
//! in the copy pass depends on the manifest.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::errors::{ModsyncError, Result};

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl Manifest {
    /// `name@version`, falling back to whichever half is present.
    pub fn label(&self) -> String {
        match (&self.name, &self.version) {
            (Some(name), Some(version)) => format!("{name}@{version}"),
            (Some(name), None) => name.clone(),
            (None, Some(version)) => format!("<unnamed>@{version}"),
            (None, None) => "<unnamed>".to_string(),
        }
    }
}

/// Read and parse a manifest file.
pub fn read_manifest(path: impl AsRef<Path>) -> Result<Manifest> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| ModsyncError::io(path, e))?;
    let manifest: Manifest = serde_json::from_str(&contents)?;
    Ok(manifest)
}

/// Log the manifest label if one can be read. Never fails.
pub fn log_manifest(path: &Path) -> Option<Manifest> {
    if !path.exists() {
        debug!(path = ?path, "no project manifest found");
        return None;
    }
    match read_manifest(path) {
        Ok(manifest) => {
            info!(project = %manifest.label(), "loaded project manifest");
            Some(manifest)
        }
        Err(err) => {
            warn!(path = ?path, error = %err, "ignoring unreadable project manifest");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_combines_name_and_version() {
        let m: Manifest =
            serde_json::from_str(r#"{"name":"sledgehammer","version":"3.1.0","private":true}"#)
                .unwrap();
        assert_eq!(m.label(), "sledgehammer@3.1.0");
        assert_eq!(Manifest::default().label(), "<unnamed>");
    }
}
