//! Application context shared by the listener and the protocol handlers

use std::time::Duration;

use medlive_broadcaster::BroadcasterHandle;
use medlive_engine::{PromptCell, WorkerStatus};

use crate::config::ServerConfig;

/// Everything a connection needs, constructed once in `main`
#[derive(Clone)]
pub struct AppContext {
    /// Engine configuration cell
    pub prompt: PromptCell,
    /// Engine worker lifecycle
    pub worker: WorkerStatus,
    /// Submission handle for registry changes
    pub broadcaster: BroadcasterHandle,
    pub outbound_queue: usize,
    pub handshake_timeout: Duration,
}

impl AppContext {
    pub fn new(config: &ServerConfig, prompt: PromptCell, worker: WorkerStatus, broadcaster: BroadcasterHandle) -> Self {
        Self {
            prompt,
            worker,
            broadcaster,
            outbound_queue: config.outbound_queue,
            handshake_timeout: Duration::from_secs(config.handshake_timeout_secs),
        }
    }

    /// Write a new prompt into the engine cell.
    ///
    /// Returns `false` without touching the cell when `text` is empty or no
    /// worker is running.
    pub fn apply_prompt(&self, text: &str) -> bool {
        if text.is_empty() || !self.worker.is_available() {
            return false;
        }
        self.prompt.set(text);
        true
    }
}
