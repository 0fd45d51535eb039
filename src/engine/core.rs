// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! Consumes [`RuntimeEvent`]s and produces an updated state plus the
//! [`CoreCommand`]s the IO shell should carry out. No Tokio, channels,
//! filesystem or processes in here, so it can be unit tested directly.

use tracing::{debug, info, warn};

use crate::engine::queue::PendingPasses;
use crate::engine::{PassId, PassOutcome, RuntimeEvent, SyncState};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Run a full copy pass. `changed` lists the paths that caused it.
    StartPass { pass: PassId, changed: Vec<String> },
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn keep(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

#[derive(Debug)]
pub struct CoreRuntime {
    state: SyncState,
    pending: PendingPasses,
    next_pass: PassId,
    last_outcome: Option<PassOutcome>,
}

impl Default for CoreRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreRuntime {
    pub fn new() -> Self {
        Self {
            state: SyncState::Idle,
            pending: PendingPasses::new(),
            next_pass: 0,
            last_outcome: None,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Number of passes started so far.
    pub fn passes_started(&self) -> PassId {
        self.next_pass
    }

    pub fn last_outcome(&self) -> Option<PassOutcome> {
        self.last_outcome
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Record that the initial pass ran outside the core and enter `Watching`
    /// directly. Pass `0` counts as used.
    pub fn resume_watching(&mut self) -> CoreStep {
        if self.state == SyncState::Idle {
            self.next_pass = self.next_pass.max(1);
            self.state = SyncState::Watching;
            info!("watching for changes");
        }
        CoreStep::keep(self.maybe_start_pending())
    }

    /// Handle a single runtime event.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::SourceChanged { path } => self.handle_change(path),
            RuntimeEvent::PassCompleted { pass, outcome } => self.handle_completion(pass, outcome),
            RuntimeEvent::ShutdownRequested => {
                info!("shutdown requested, stopping runtime");
                CoreStep {
                    commands: Vec::new(),
                    keep_running: false,
                }
            }
        }
    }

    fn handle_change(&mut self, path: String) -> CoreStep {
        match self.state {
            SyncState::Watching => {
                info!(path = %path, "source changed");
                CoreStep::keep(vec![self.begin_pass(vec![path])])
            }
            SyncState::CopyInProgress(pass) => {
                debug!(path = %path, running = pass, "change during pass; queued");
                self.pending.record_trigger(&path);
                CoreStep::keep(Vec::new())
            }
            SyncState::Idle => {
                self.pending.record_trigger(&path);
                CoreStep::keep(Vec::new())
            }
        }
    }

    fn handle_completion(&mut self, pass: PassId, outcome: PassOutcome) -> CoreStep {
        match self.state {
            SyncState::CopyInProgress(running) if running == pass => {}
            other => {
                warn!(pass, state = ?other, "completion for a pass that is not running; ignoring");
                return CoreStep::keep(Vec::new());
            }
        }

        if outcome.is_success() {
            info!(pass, copied = outcome.files_copied, "pass complete");
        } else {
            warn!(
                pass,
                copied = outcome.files_copied,
                failed = outcome.failures,
                "pass finished with failures; will retry on next change"
            );
        }

        self.last_outcome = Some(outcome);
        self.state = SyncState::Watching;
        CoreStep::keep(self.maybe_start_pending())
    }

    fn maybe_start_pending(&mut self) -> Vec<CoreCommand> {
        if self.state != SyncState::Watching {
            return Vec::new();
        }
        match self.pending.drain_pending() {
            Some(changed) => vec![self.begin_pass(changed)],
            None => Vec::new(),
        }
    }

    fn begin_pass(&mut self, changed: Vec<String>) -> CoreCommand {
        let pass = self.next_pass;
        self.next_pass += 1;
        self.state = SyncState::CopyInProgress(pass);
        debug!(pass, changed = ?changed, "starting copy pass");
        CoreCommand::StartPass { pass, changed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(path: &str) -> RuntimeEvent {
        RuntimeEvent::SourceChanged {
            path: path.to_string(),
        }
    }

    fn completed(pass: PassId) -> RuntimeEvent {
        RuntimeEvent::PassCompleted {
            pass,
            outcome: PassOutcome {
                files_copied: 1,
                failures: 0,
            },
        }
    }

    #[test]
    fn starts_idle_until_watching_begins() {
        let mut core = CoreRuntime::new();
        assert_eq!(core.state(), SyncState::Idle);

        // A change before watching is only queued.
        assert!(core.step(changed("src/x.lua")).commands.is_empty());
        assert_eq!(core.state(), SyncState::Idle);

        let step = core.resume_watching();
        assert_eq!(
            step.commands,
            vec![CoreCommand::StartPass {
                pass: 1,
                changed: vec!["src/x.lua".to_string()]
            }]
        );
        assert_eq!(core.state(), SyncState::CopyInProgress(1));
    }

    #[test]
    fn changes_during_pass_coalesce_into_one_follow_up() {
        let mut core = CoreRuntime::new();
        core.resume_watching();

        let step = core.step(changed("src/x.lua"));
        assert_eq!(step.commands.len(), 1);
        assert_eq!(core.state(), SyncState::CopyInProgress(1));

        // Two more changes while pass 1 runs: nothing starts.
        assert!(core.step(changed("src/y.lua")).commands.is_empty());
        assert!(core.step(changed("src/z.lua")).commands.is_empty());
        assert!(core.has_pending());

        let step = core.step(completed(1));
        assert_eq!(
            step.commands,
            vec![CoreCommand::StartPass {
                pass: 2,
                changed: vec!["src/y.lua".to_string(), "src/z.lua".to_string()]
            }]
        );

        let step = core.step(completed(2));
        assert!(step.commands.is_empty());
        assert_eq!(core.state(), SyncState::Watching);
        assert_eq!(core.passes_started(), 3);
    }

    #[test]
    fn failed_pass_keeps_watching() {
        let mut core = CoreRuntime::new();
        core.resume_watching();
        core.step(changed("src/x.lua"));

        let step = core.step(RuntimeEvent::PassCompleted {
            pass: 1,
            outcome: PassOutcome {
                files_copied: 0,
                failures: 2,
            },
        });
        assert!(step.keep_running);
        assert_eq!(core.state(), SyncState::Watching);
        assert_eq!(core.last_outcome().map(|o| o.failures), Some(2));

        // Next change retries.
        assert_eq!(core.step(changed("src/x.lua")).commands.len(), 1);
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut core = CoreRuntime::new();
        core.resume_watching();
        core.step(changed("src/x.lua"));

        let step = core.step(completed(7));
        assert!(step.commands.is_empty());
        assert_eq!(core.state(), SyncState::CopyInProgress(1));
    }

    #[test]
    fn shutdown_stops_loop() {
        let mut core = CoreRuntime::new();
        let step = core.step(RuntimeEvent::ShutdownRequested);
        assert!(!step.keep_running);
    }
}
