use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, Notify};

use modsync::engine::{PassBackend, PassId, PassOutcome, RuntimeEvent};
use modsync::errors::Result;

/// Shared view of what a [`FakePassBackend`] has been asked to do.
#[derive(Debug, Default)]
pub struct PassLog {
    /// `(pass, changed paths)` in start order.
    pub started: Mutex<Vec<(PassId, Vec<String>)>>,
    /// Passes currently between start and completion.
    pub in_flight: AtomicUsize,
    /// Highest value `in_flight` ever reached.
    pub max_in_flight: AtomicUsize,
}

impl PassLog {
    pub fn started_passes(&self) -> Vec<(PassId, Vec<String>)> {
        self.started.lock().unwrap().clone()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// A fake backend that:
/// - records every started pass
/// - holds each pass open until `release` is notified (or immediately when
///   built with `instant`)
/// - then reports `PassCompleted` with the configured outcome.
pub struct FakePassBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    log: Arc<PassLog>,
    release: Option<Arc<Notify>>,
    outcome: PassOutcome,
}

impl FakePassBackend {
    /// Passes complete as soon as they start.
    pub fn instant(runtime_tx: mpsc::Sender<RuntimeEvent>, log: Arc<PassLog>) -> Self {
        Self {
            runtime_tx,
            log,
            release: None,
            outcome: PassOutcome {
                files_copied: 1,
                failures: 0,
            },
        }
    }

    /// Each pass completes only after one `release.notify_one()`.
    pub fn gated(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        log: Arc<PassLog>,
        release: Arc<Notify>,
    ) -> Self {
        Self {
            release: Some(release),
            ..Self::instant(runtime_tx, log)
        }
    }

    pub fn with_outcome(mut self, outcome: PassOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

impl PassBackend for FakePassBackend {
    fn start_pass(
        &mut self,
        pass: PassId,
        changed: Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let log = Arc::clone(&self.log);
        let release = self.release.clone();
        let outcome = self.outcome;

        Box::pin(async move {
            log.started.lock().unwrap().push((pass, changed));
            let now = log.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            log.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::spawn(async move {
                if let Some(release) = release {
                    release.notified().await;
                }
                log.in_flight.fetch_sub(1, Ordering::SeqCst);
                let _ = tx.send(RuntimeEvent::PassCompleted { pass, outcome }).await;
            });
            Ok(())
        })
    }
}
