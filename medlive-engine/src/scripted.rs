//! Deterministic in-memory producer
//!
//! Steps are fed through a channel, so `next_event` blocks exactly like a
//! real recognizer until the next step arrives. Dropping every
//! [`ScriptFeeder`] ends the stream.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::engine::{EngineLauncher, SpeechEngine};
use crate::error::{EngineError, Result};
use crate::event::TranscriptEvent;
use crate::profile::EngineProfile;
use crate::prompt::PromptCell;

/// One scripted producer action
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Emit(TranscriptEvent),
    /// Sleep before the next step
    Pause(Duration),
    /// Raise a fatal producer failure
    Fail(String),
}

impl ScriptStep {
    pub fn partial(text: &str) -> Self {
        Self::Emit(TranscriptEvent::Partial(text.to_string()))
    }

    pub fn final_text(text: &str) -> Self {
        Self::Emit(TranscriptEvent::Final(text.to_string()))
    }

    pub fn fail(reason: &str) -> Self {
        Self::Fail(reason.to_string())
    }
}

/// Sender side for pushing steps into a running [`ScriptedEngine`]
#[derive(Clone)]
pub struct ScriptFeeder {
    tx: Sender<ScriptStep>,
}

impl ScriptFeeder {
    /// Queue a step. Returns `false` once the engine has gone away.
    pub fn push(&self, step: ScriptStep) -> bool {
        self.tx.send(step).is_ok()
    }
}

/// Producer that replays scripted steps
pub struct ScriptedEngine {
    steps: Receiver<ScriptStep>,
    pulls: Arc<AtomicUsize>,
}

impl SpeechEngine for ScriptedEngine {
    fn next_event(&mut self) -> Result<Option<TranscriptEvent>> {
        let _ = self.pulls.fetch_add(1, Ordering::SeqCst);
        loop {
            match self.steps.recv() {
                Ok(ScriptStep::Emit(event)) => return Ok(Some(event)),
                Ok(ScriptStep::Pause(delay)) => std::thread::sleep(delay),
                Ok(ScriptStep::Fail(reason)) => return Err(EngineError::failure(reason)),
                Err(_) => return Ok(None),
            }
        }
    }
}

/// Launcher for [`ScriptedEngine`]
pub struct ScriptedLauncher {
    steps: Option<Receiver<ScriptStep>>,
    launch_error: Option<String>,
    pulls: Arc<AtomicUsize>,
    prompt: Arc<Mutex<Option<PromptCell>>>,
}

impl ScriptedLauncher {
    /// Fixed script; the stream ends after the last step
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        let (launcher, feeder) = Self::channel();
        for step in steps {
            feeder.push(step);
        }
        launcher
    }

    /// Open-ended script fed while the engine runs
    pub fn channel() -> (Self, ScriptFeeder) {
        let (tx, rx) = mpsc::channel();
        let launcher = Self {
            steps: Some(rx),
            launch_error: None,
            pulls: Arc::new(AtomicUsize::new(0)),
            prompt: Arc::new(Mutex::new(None)),
        };
        (launcher, ScriptFeeder { tx })
    }

    /// Launcher whose `launch` always fails
    pub fn failing(reason: &str) -> Self {
        let (mut launcher, _) = Self::channel();
        launcher.launch_error = Some(reason.to_string());
        launcher
    }

    /// How many times the engine's `next_event` was entered
    pub fn pulls(&self) -> usize {
        self.pulls.load(Ordering::SeqCst)
    }

    /// Prompt cell handed over at launch
    pub fn prompt(&self) -> Option<PromptCell> {
        self.prompt.lock().clone()
    }

    /// Shared pull counter, usable after the launcher moved to another thread
    pub fn pull_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.pulls)
    }
}

impl EngineLauncher for ScriptedLauncher {
    fn launch(&mut self, _profile: &EngineProfile, prompt: PromptCell) -> Result<Box<dyn SpeechEngine>> {
        if let Some(reason) = &self.launch_error {
            return Err(EngineError::launch(reason.clone()));
        }

        let steps = self
            .steps
            .take()
            .ok_or_else(|| EngineError::launch("scripted engine already launched"))?;
        *self.prompt.lock() = Some(prompt);

        Ok(Box::new(ScriptedEngine {
            steps,
            pulls: Arc::clone(&self.pulls),
        }))
    }
}
