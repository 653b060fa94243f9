//! Engine worker thread → broadcaster bridge
//!
//! Pulling an event blocks for as long as the recognizer needs, so the
//! engine runs on its own OS thread and never touches a socket. Each
//! admitted event is handed to the serving context through the
//! broadcaster's submission channel, which keeps emission order.

use std::thread::JoinHandle;

use anyhow::{Context, Result};
use medlive_broadcaster::BroadcasterHandle;
use medlive_engine::{EngineAdapter, EngineError, EngineLauncher, EngineProfile, PromptCell, WorkerState, WorkerStatus};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::filter::NoiseFilter;

/// Counters reported when the bridge stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeStats {
    pub forwarded: u64,
    pub suppressed: u64,
    pub exit_state: WorkerState,
}

/// Outcome of the engine start, sent once from the worker thread
pub type StartReport = oneshot::Receiver<std::result::Result<(), EngineError>>;

pub struct EventBridge {
    launcher: Box<dyn EngineLauncher>,
    profile: EngineProfile,
    prompt: PromptCell,
    status: WorkerStatus,
    filter: NoiseFilter,
    outlet: BroadcasterHandle,
}

impl EventBridge {
    pub fn new(
        launcher: Box<dyn EngineLauncher>,
        profile: EngineProfile,
        prompt: PromptCell,
        status: WorkerStatus,
        filter: NoiseFilter,
        outlet: BroadcasterHandle,
    ) -> Self {
        Self {
            launcher,
            profile,
            prompt,
            status,
            filter,
            outlet,
        }
    }

    /// Run the bridge on a dedicated `engine-worker` thread
    pub fn spawn(self) -> Result<(JoinHandle<BridgeStats>, StartReport)> {
        let (started_tx, started_rx) = oneshot::channel();
        let handle = std::thread::Builder::new()
            .name("engine-worker".to_string())
            .spawn(move || self.run(Some(started_tx)))
            .context("Failed to spawn engine worker thread")?;
        Ok((handle, started_rx))
    }

    /// Start the engine and forward its events until it fails or ends.
    ///
    /// Blocks the calling thread. There is no restart: once this returns the
    /// worker status is terminal and nothing is broadcast again.
    pub fn run(mut self, started: Option<oneshot::Sender<std::result::Result<(), EngineError>>>) -> BridgeStats {
        let mut stats = BridgeStats {
            forwarded: 0,
            suppressed: 0,
            exit_state: WorkerState::Starting,
        };

        let mut adapter = match EngineAdapter::start_with_prompt(
            self.launcher.as_mut(),
            &self.profile,
            self.prompt.clone(),
        ) {
            Ok(adapter) => adapter,
            Err(e) => {
                error!("Engine failed to start: {}", e);
                self.status.transition(WorkerState::Error);
                stats.exit_state = WorkerState::Error;
                if let Some(started) = started {
                    let _ = started.send(Err(e));
                }
                return stats;
            }
        };

        self.status.transition(WorkerState::Running);
        if let Some(started) = started {
            let _ = started.send(Ok(()));
        }
        info!("Engine running (model {})", self.profile.model);

        while !self.status.get().is_terminal() {
            match adapter.next_event() {
                Ok(Some(event)) => {
                    let kind = event.kind();
                    match self.filter.admit(event) {
                        Some(message) => {
                            if self.outlet.broadcast(message).is_err() {
                                warn!("Broadcaster is gone, stopping engine bridge");
                                self.status.transition(WorkerState::Stopped);
                                break;
                            }
                            stats.forwarded += 1;
                        }
                        None => {
                            debug!("Suppressed {} event", kind);
                            stats.suppressed += 1;
                        }
                    }
                }
                Ok(None) => {
                    info!("Engine stream ended");
                    self.status.transition(WorkerState::Stopped);
                }
                Err(e) => {
                    error!("Critical engine error, transcripts will no longer be broadcast: {}", e);
                    self.status.transition(WorkerState::Error);
                }
            }
        }

        stats.exit_state = self.status.get();
        info!(
            "Engine bridge stopped ({}): {} forwarded, {} suppressed",
            stats.exit_state, stats.forwarded, stats.suppressed
        );
        stats
    }
}
