// src/copy/pattern.rs

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use tracing::{debug, trace};

use crate::errors::{ModsyncError, Result};
use crate::fs::FileSystem;
use crate::paths::{literal_prefix, relative_str};

/// A compiled source glob.
///
/// `*` and `?` never cross a `/`; `**` does. Matching is done against paths
/// relative to the project root with forward slashes.
#[derive(Clone)]
pub struct SourcePattern {
    raw: String,
    base: PathBuf,
    /// `dir/**` also matches `dir` itself.
    matches_base: bool,
    matcher: GlobMatcher,
}

impl fmt::Debug for SourcePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourcePattern")
            .field("raw", &self.raw)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

/// An entry found by [`SourcePattern::enumerate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedEntry {
    /// Full source path (`root` joined with `rel`).
    pub source: PathBuf,
    /// Path relative to the project root, forward slashes.
    pub rel: String,
    pub is_dir: bool,
}

impl SourcePattern {
    /// Compile a glob. A malformed glob is a `PatternResolution` error.
    pub fn compile(raw: &str) -> Result<Self> {
        let normalized = raw.trim().trim_start_matches("./");
        if normalized.is_empty() {
            return Err(ModsyncError::PatternResolution {
                pattern: raw.to_string(),
                reason: "empty pattern".to_string(),
            });
        }
        let glob = GlobBuilder::new(normalized)
            .literal_separator(true)
            .build()
            .map_err(|e| ModsyncError::PatternResolution {
                pattern: raw.to_string(),
                reason: e.to_string(),
            })?;
        let base = literal_prefix(normalized);
        let matches_base = normalized.ends_with("/**") && !base.as_os_str().is_empty();
        Ok(Self {
            raw: raw.to_string(),
            base,
            matches_base,
            matcher: glob.compile_matcher(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Directory (relative to the root) where enumeration starts.
    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.matcher.is_match(rel_path)
    }

    /// Walk `root/base` and return every matching entry, sorted by path.
    ///
    /// A missing base yields no entries. For `dir/**` the base directory is
    /// itself an entry. Symlinked directories are not descended into. Directories that cannot be listed are
    /// returned as failures alongside whatever was found elsewhere.
    pub fn enumerate(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
    ) -> (Vec<MatchedEntry>, Vec<(PathBuf, io::Error)>) {
        let mut found = Vec::new();
        let mut failures = Vec::new();

        let start = root.join(&self.base);
        if !fs.exists(&start) {
            trace!(pattern = %self.raw, base = ?start, "pattern base does not exist");
            return (found, failures);
        }

        if self.matches_base && fs.is_dir(&start) {
            if let Some(rel) = relative_str(root, &start) {
                found.push(MatchedEntry {
                    source: start.clone(),
                    rel,
                    is_dir: true,
                });
            }
        }

        let mut stack = vec![start];
        while let Some(dir) = stack.pop() {
            if !fs.is_dir(&dir) {
                // Only reachable for the start path of a literal pattern.
                self.consider(root, &dir, false, &mut found);
                continue;
            }
            let mut children = match fs.read_dir(&dir) {
                Ok(children) => children,
                Err(err) => {
                    failures.push((dir, err));
                    continue;
                }
            };
            children.sort();
            // Reverse so the stack pops in sorted order.
            for child in children.into_iter().rev() {
                let is_dir = fs.is_dir(&child);
                if is_dir && fs.is_symlink(&child) {
                    debug!(path = ?child, "skipping symlinked directory");
                    continue;
                }
                self.consider(root, &child, is_dir, &mut found);
                if is_dir {
                    stack.push(child);
                }
            }
        }

        found.sort_by(|a, b| a.rel.cmp(&b.rel));
        (found, failures)
    }

    fn consider(&self, root: &Path, path: &Path, is_dir: bool, found: &mut Vec<MatchedEntry>) {
        let Some(rel) = relative_str(root, path) else {
            return;
        };
        if !rel.is_empty() && self.matches(&rel) {
            found.push(MatchedEntry {
                source: path.to_path_buf(),
                rel,
                is_dir,
            });
        }
    }
}
