// src/paths.rs

//! Path helpers shared by the copy pass and the watcher.

use std::path::{Component, Path, PathBuf};

/// Characters that start a glob construct in `globset` syntax.
const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}'];

/// Home directory of the invoking user, if the platform can tell.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Expand a leading `~` / `~/` against `home`.
///
/// Returns `None` when the path needs a home directory and none is known.
/// Paths without a leading tilde are returned unchanged.
pub fn expand_home(raw: &str, home: Option<&Path>) -> Option<PathBuf> {
    if raw == "~" {
        return home.map(Path::to_path_buf);
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        return home.map(|h| h.join(rest));
    }
    Some(PathBuf::from(raw))
}

/// Leading run of path segments in `pattern` that contain no glob syntax.
///
/// `"SledgehammerLua/**"` → `"SledgehammerLua"`, `"src/*.lua"` → `"src"`,
/// `"**/*.lua"` → `""`. The result is where a walk for the pattern starts.
pub fn literal_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    for segment in pattern.split('/') {
        if segment.contains(GLOB_META) {
            break;
        }
        if segment.is_empty() || segment == "." {
            continue;
        }
        prefix.push(segment);
    }
    // A pattern without any glob syntax names a single entry; its parent is
    // the walk base.
    if !pattern.contains(GLOB_META) {
        prefix.pop();
    }
    prefix
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path is not under `root` and cannot be relativized.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}
