//! Engine configuration cell holding the live prompt text
//!
//! Written by the network-serving context, read by the worker thread.
//! There is no queue behind it: the last applied value wins and the
//! engine sees whatever was written before its next read.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

struct PromptState {
    text: Arc<str>,
    version: u64,
}

struct PromptInner {
    state: Mutex<PromptState>,
    changed: Condvar,
}

/// Shared handle to the prompt slot
#[derive(Clone)]
pub struct PromptCell {
    inner: Arc<PromptInner>,
}

impl PromptCell {
    /// Create a cell holding the empty prompt
    pub fn new() -> Self {
        Self::with_initial("")
    }

    /// Create a cell with a starting prompt
    pub fn with_initial(text: &str) -> Self {
        Self {
            inner: Arc::new(PromptInner {
                state: Mutex::new(PromptState {
                    text: Arc::from(text),
                    version: 0,
                }),
                changed: Condvar::new(),
            }),
        }
    }

    /// Replace the prompt and wake anyone waiting for a change
    pub fn set(&self, text: &str) {
        let mut state = self.inner.state.lock();
        state.text = Arc::from(text);
        state.version += 1;
        drop(state);
        let _ = self.inner.changed.notify_all();
    }

    /// Current prompt
    pub fn get(&self) -> Arc<str> {
        Arc::clone(&self.inner.state.lock().text)
    }

    /// Number of writes applied so far
    pub fn version(&self) -> u64 {
        self.inner.state.lock().version
    }

    /// Block until the version moves past `seen`, or `timeout` elapses.
    ///
    /// Returns the newest version and its text. Writes that land while
    /// nobody waits are coalesced.
    pub fn wait_newer(&self, seen: u64, timeout: Duration) -> Option<(u64, Arc<str>)> {
        let mut state = self.inner.state.lock();
        if state.version == seen {
            let _ = self.inner.changed.wait_for(&mut state, timeout);
        }
        (state.version != seen).then(|| (state.version, Arc::clone(&state.text)))
    }
}

impl Default for PromptCell {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PromptCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptCell")
            .field("text", &self.get())
            .field("version", &self.version())
            .finish()
    }
}
