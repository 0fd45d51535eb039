// src/engine/mod.rs

//! Watch-mode orchestration.
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`]; the thing that actually copies is a
//! [`PassBackend`] from [`backend`].
//!
//! The initial pass runs before the core exists ([`crate::run_initial_pass`]);
//! one-shot mode ends there. In watch mode the core then moves
//! `Idle → Watching → CopyInProgress → Watching → …`. A pass is never started
//! while another is in progress; changes seen meanwhile are coalesced into
//! exactly one follow-up pass.

/// Sequence number of a copy pass. The initial pass is `0`.
pub type PassId = u64;

/// Lifecycle state of the utility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Not yet watching.
    Idle,
    /// A pass is running.
    CopyInProgress(PassId),
    /// Waiting for the next change.
    Watching,
}

/// Summary of a finished pass, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassOutcome {
    pub files_copied: usize,
    pub failures: usize,
}

impl PassOutcome {
    pub fn is_success(&self) -> bool {
        self.failures == 0
    }
}

/// Events flowing into the runtime from the watcher and the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// A watched path changed (relative to the project root).
    SourceChanged { path: String },
    /// The backend finished a pass.
    PassCompleted { pass: PassId, outcome: PassOutcome },
    /// Stop the runtime loop.
    ShutdownRequested,
}

pub mod backend;
pub mod core;
pub mod queue;
pub mod runtime;

pub use backend::{CopyPassBackend, PassBackend};
pub use self::core::{CoreCommand, CoreRuntime, CoreStep};
pub use queue::PendingPasses;
pub use runtime::Runtime;
