// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;

use super::backend::PassBackend;
use super::core::{CoreCommand, CoreRuntime, CoreStep};
use super::RuntimeEvent;

/// Drives the core state machine in response to `RuntimeEvent`s and
/// delegates the copying to a `PassBackend`.
///
/// All semantics live in `CoreRuntime`; this struct only reads events from
/// the channel and executes the commands the core returns.
pub struct Runtime<B: PassBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    backend: B,
}

impl<B: PassBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: PassBackend> Runtime<B> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, backend: B) -> Self {
        Self {
            core,
            event_rx,
            backend,
        }
    }

    /// Main event loop. Enters `Watching` (the initial pass has already run)
    /// and returns once the channel closes or shutdown is requested.
    pub async fn run(mut self) -> Result<CoreRuntime> {
        info!("modsync runtime started");

        let step = self.core.resume_watching();
        self.execute(step.commands).await?;

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let CoreStep {
                commands,
                keep_running,
            } = self.core.step(event);
            self.execute(commands).await?;

            if !keep_running {
                break;
            }
        }

        info!("runtime exiting");
        Ok(self.core)
    }

    async fn execute(&mut self, commands: Vec<CoreCommand>) -> Result<()> {
        for command in commands {
            match command {
                CoreCommand::StartPass { pass, changed } => {
                    self.backend.start_pass(pass, changed).await?;
                }
            }
        }
        Ok(())
    }
}
