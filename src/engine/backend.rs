// src/engine/backend.rs

//! Pluggable pass backend.
//!
//! The runtime talks to a `PassBackend` instead of calling the copy pass
//! directly, so tests can swap in a fake that records passes and decides
//! when they complete.
//!
//! - `CopyPassBackend` is the production implementation: it runs
//!   [`run_copy`] on Tokio's blocking pool and reports `PassCompleted`.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::copy::{run_copy, CopyRule};
use crate::engine::{PassId, PassOutcome, RuntimeEvent};
use crate::errors::Result;
use crate::fs::FileSystem;

/// Trait abstracting how a copy pass is executed.
///
/// `start_pass` must not wait for the pass to finish; completion is
/// reported later as `RuntimeEvent::PassCompleted` with the same `pass`.
pub trait PassBackend: Send {
    fn start_pass(
        &mut self,
        pass: PassId,
        changed: Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production backend: runs the configured copy rules.
pub struct CopyPassBackend {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    rules: Arc<Vec<CopyRule>>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl CopyPassBackend {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        root: impl Into<PathBuf>,
        rules: Vec<CopyRule>,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            fs,
            root: root.into(),
            rules: Arc::new(rules),
            runtime_tx,
        }
    }
}

impl PassBackend for CopyPassBackend {
    fn start_pass(
        &mut self,
        pass: PassId,
        changed: Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let fs = Arc::clone(&self.fs);
        let root = self.root.clone();
        let rules = Arc::clone(&self.rules);
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            info!(pass, changed = ?changed, "copy pass started");
            tokio::spawn(async move {
                let joined =
                    tokio::task::spawn_blocking(move || run_copy(fs.as_ref(), &root, &rules))
                        .await;
                let outcome = match joined {
                    Ok(report) => PassOutcome {
                        files_copied: report.files_copied,
                        failures: report.failure_count(),
                    },
                    Err(err) => {
                        error!(pass, error = %err, "copy pass panicked");
                        PassOutcome {
                            files_copied: 0,
                            failures: 1,
                        }
                    }
                };
                if tx
                    .send(RuntimeEvent::PassCompleted { pass, outcome })
                    .await
                    .is_err()
                {
                    error!(pass, "runtime gone before pass completion could be reported");
                }
            });
            Ok(())
        })
    }
}
