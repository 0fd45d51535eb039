// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::paths::literal_prefix;

/// Compiled watch/exclude glob patterns.
///
/// The patterns are relative to the project root. The watcher passes
/// relative paths (e.g. `"src/client/ui.lua"`) into `matches`.
#[derive(Clone)]
pub struct WatchProfile {
    watch_patterns: Vec<String>,
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for WatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchProfile")
            .field("watch", &self.watch_patterns)
            .finish_non_exhaustive()
    }
}

impl WatchProfile {
    pub fn new(watch: &[String], exclude: &[String]) -> Result<Self> {
        let watch_set = build_globset(watch).context("building watch globset")?;

        let exclude_set = if exclude.is_empty() {
            None
        } else {
            Some(build_globset(exclude).context("building exclude globset")?)
        };

        Ok(Self {
            watch_patterns: watch.to_vec(),
            watch_set,
            exclude_set,
        })
    }

    /// Returns true if a change at `rel_path` (relative to the project root)
    /// should trigger a copy pass.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.watch_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }

    /// Directories to subscribe to, recursively: the literal prefix of each
    /// watch pattern joined to `root`. Roots nested inside another root are
    /// dropped.
    pub fn roots(&self, root: &Path) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .watch_patterns
            .iter()
            .map(|p| root.join(literal_prefix(p.trim().trim_start_matches("./"))))
            .collect();
        roots.sort();
        roots.dedup();

        let mut kept: Vec<PathBuf> = Vec::with_capacity(roots.len());
        for candidate in roots {
            if !kept.iter().any(|k| candidate.starts_with(k)) {
                kept.push(candidate);
            }
        }
        kept
    }
}

/// Build a GlobSet where `*` stays within one path segment.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let pat = pat.trim().trim_start_matches("./");
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exclude_overrides_watch() {
        let profile = WatchProfile::new(&strings(&["src/**"]), &strings(&["src/**/*.tmp"])).unwrap();
        assert!(profile.matches("src/x.lua"));
        assert!(profile.matches("src/deep/y.lua"));
        assert!(!profile.matches("src/deep/y.tmp"));
        assert!(!profile.matches("SledgehammerLua/x.lua"));
    }

    #[test]
    fn nested_roots_collapse() {
        let profile =
            WatchProfile::new(&strings(&["src/**", "src/lua/*.lua", "media/**"]), &[]).unwrap();
        let roots = profile.roots(Path::new("/w"));
        assert_eq!(roots, vec![PathBuf::from("/w/media"), PathBuf::from("/w/src")]);
    }
}
