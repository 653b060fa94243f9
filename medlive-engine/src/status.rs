//! Engine worker lifecycle

use std::sync::Arc;

use parking_lot::Mutex;

/// Lifecycle of the single engine worker
///
/// `Starting → Running → (Error | Stopped)`. Both terminal states are sticky.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Starting,
    Running,
    Error,
    Stopped,
}

impl WorkerState {
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkerState::Error | WorkerState::Stopped)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkerState::Starting => "starting",
            WorkerState::Running => "running",
            WorkerState::Error => "error",
            WorkerState::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared view of the worker state, updated by the worker thread
#[derive(Debug, Clone)]
pub struct WorkerStatus {
    state: Arc<Mutex<WorkerState>>,
}

impl WorkerStatus {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(WorkerState::Starting)),
        }
    }

    pub fn get(&self) -> WorkerState {
        *self.state.lock()
    }

    /// Move to `next`. Returns `false` and leaves the state untouched when
    /// the worker is already in a terminal state.
    pub fn transition(&self, next: WorkerState) -> bool {
        let mut state = self.state.lock();
        if state.is_terminal() {
            return false;
        }
        *state = next;
        true
    }

    /// Whether a live worker can accept configuration writes
    pub fn is_available(&self) -> bool {
        self.get() == WorkerState::Running
    }
}

impl Default for WorkerStatus {
    fn default() -> Self {
        Self::new()
    }
}
