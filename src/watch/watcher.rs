// src/watch/watcher.rs

use std::path::{Path, PathBuf};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::engine::RuntimeEvent;
use crate::errors::{ModsyncError, Result};
use crate::paths::relative_str;
use crate::watch::patterns::WatchProfile;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    roots: Vec<PathBuf>,
}

impl WatcherHandle {
    /// Directories being watched, canonicalized.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("roots", &self.roots)
            .finish()
    }
}

/// Spawn a filesystem watcher over every root of `profile` and send
/// `RuntimeEvent::SourceChanged` for each changed path the profile matches.
///
/// - `root` is the project root against which all glob patterns are evaluated.
/// - `runtime_tx` is the channel into the main runtime.
///
/// Fails with `WatchSetup` if the project root or any watch root does not
/// exist, or if `notify` refuses the subscription. Must be called from within
/// a Tokio runtime.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    profile: WatchProfile,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().map_err(|e| {
        ModsyncError::WatchSetup(format!("project root {root:?} is not accessible: {e}"))
    })?;

    let roots = profile.roots(&root);
    for dir in &roots {
        if !dir.exists() {
            return Err(ModsyncError::WatchSetup(format!(
                "watched path {dir:?} does not exist"
            )));
        }
    }

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // We can't log via tracing here easily, so fallback to stderr.
                    eprintln!("modsync: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("modsync: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    for dir in &roots {
        watcher
            .watch(dir, RecursiveMode::Recursive)
            .map_err(|e| ModsyncError::WatchSetup(format!("watching {dir:?}: {e}")))?;
        info!("file watcher started on {:?}", dir);
    }

    // Async task that consumes notify events and forwards matches to the runtime.
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            trace!(?event, "received notify event");

            if !is_change(&event.kind) {
                continue;
            }

            for path in &event.paths {
                let Some(rel) = matching_rel_path(&root, path, &profile) else {
                    continue;
                };
                debug!(path = %rel, kind = ?event.kind, "watch match -> source changed");
                if let Err(err) = runtime_tx
                    .send(RuntimeEvent::SourceChanged { path: rel })
                    .await
                {
                    warn!("failed to send RuntimeEvent::SourceChanged: {err}");
                    // If the runtime channel is closed, there's no point
                    // keeping the watcher loop alive.
                    return;
                }
            }
        }

        debug!("file watcher loop ended");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        roots,
    })
}

/// Create, modify, remove (renames arrive as modify). Access events are
/// ignored: the copy pass itself reads files.
fn is_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
    )
}

fn matching_rel_path(root: &Path, path: &Path, profile: &WatchProfile) -> Option<String> {
    let Some(rel) = relative_str(root, path) else {
        warn!("could not relativize path {:?} against root {:?}", path, root);
        return None;
    };
    profile.matches(&rel).then_some(rel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind, RenameMode};

    #[test]
    fn access_events_are_not_changes() {
        assert!(!is_change(&EventKind::Access(AccessKind::Any)));
        assert!(is_change(&EventKind::Create(CreateKind::File)));
        assert!(is_change(&EventKind::Modify(ModifyKind::Name(RenameMode::Both))));
    }

    #[test]
    fn paths_outside_root_never_match() {
        let profile = WatchProfile::new(&["src/**".to_string()], &[]).unwrap();
        let root = Path::new("/w");
        assert_eq!(
            matching_rel_path(root, Path::new("/w/src/x.lua"), &profile),
            Some("src/x.lua".to_string())
        );
        assert_eq!(matching_rel_path(root, Path::new("/w/docs/x.md"), &profile), None);
        assert_eq!(matching_rel_path(root, Path::new("/elsewhere/src/x.lua"), &profile), None);
    }
}
