//! Adapter around the external transcription producer
//!
//! The recognizer itself is opaque: once launched it blocks inside
//! [`SpeechEngine::next_event`] until it has something to say. The adapter
//! adds the one rule the rest of the system relies on: after a fatal error
//! or the end of the stream the producer is never called again.

use tracing::{debug, info};

use crate::error::{EngineError, Result};
use crate::event::TranscriptEvent;
use crate::profile::EngineProfile;
use crate::prompt::PromptCell;

/// A running transcription producer
///
/// `next_event` is a blocking call with unbounded latency and must only be
/// driven from a dedicated thread.
pub trait SpeechEngine: Send {
    /// Block until the next event.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` for each partial or final result
    /// - `Ok(None)` once the producer has ended normally
    /// - `Err(_)` on a fatal producer failure
    fn next_event(&mut self) -> Result<Option<TranscriptEvent>>;
}

/// Starts a [`SpeechEngine`] for a given profile
///
/// The launcher receives the prompt cell so the engine can read the most
/// recently applied prompt whenever it runs inference.
pub trait EngineLauncher: Send {
    fn launch(&mut self, profile: &EngineProfile, prompt: PromptCell) -> Result<Box<dyn SpeechEngine>>;
}

/// Engine plus its configuration cell, with a terminal-state guard
///
/// # Example
///
/// ```no_run
/// use medlive_engine::{EngineAdapter, EngineProfile, ScriptedLauncher, ScriptStep};
///
/// let mut launcher = ScriptedLauncher::new(vec![ScriptStep::partial("Patient zeigt")]);
/// let profile = EngineProfile::select(None);
/// let mut adapter = EngineAdapter::start(&mut launcher, &profile)?;
///
/// adapter.set_prompt("Kardiologie");
/// while let Some(event) = adapter.next_event()? {
///     println!("{}: {}", event.kind(), event.text());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct EngineAdapter {
    engine: Box<dyn SpeechEngine>,
    prompt: PromptCell,
    terminated: bool,
}

impl EngineAdapter {
    /// Launch the engine. Blocking; called once per process.
    pub fn start(launcher: &mut dyn EngineLauncher, profile: &EngineProfile) -> Result<Self> {
        Self::start_with_prompt(launcher, profile, PromptCell::new())
    }

    /// Launch the engine sharing an existing prompt cell
    pub fn start_with_prompt(
        launcher: &mut dyn EngineLauncher,
        profile: &EngineProfile,
        prompt: PromptCell,
    ) -> Result<Self> {
        info!(
            "Starting engine: model={} compute={} device={} language={}",
            profile.model, profile.compute_type, profile.device, profile.language
        );
        let engine = launcher.launch(profile, prompt.clone())?;

        Ok(Self {
            engine,
            prompt,
            terminated: false,
        })
    }

    /// Pull the next event from the producer.
    ///
    /// Once the producer has failed or ended, every further call returns
    /// [`EngineError::Terminated`] without touching the producer.
    pub fn next_event(&mut self) -> Result<Option<TranscriptEvent>> {
        if self.terminated {
            return Err(EngineError::Terminated);
        }

        match self.engine.next_event() {
            Ok(Some(event)) => Ok(Some(event)),
            Ok(None) => {
                debug!("Engine reached end of stream");
                self.terminated = true;
                Ok(None)
            }
            Err(e) => {
                self.terminated = true;
                Err(e)
            }
        }
    }

    /// Apply a new prompt. Safe while `next_event` blocks on another thread
    /// through a cloned cell (see [`EngineAdapter::prompt`]).
    pub fn set_prompt(&self, text: &str) {
        self.prompt.set(text);
    }

    /// Handle to the configuration cell
    pub fn prompt(&self) -> PromptCell {
        self.prompt.clone()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::{ScriptStep, ScriptedLauncher};

    #[test]
    fn test_yields_events_then_end() {
        let mut launcher = ScriptedLauncher::new(vec![
            ScriptStep::partial("Patient"),
            ScriptStep::final_text("Patient zeigt Symptome."),
        ]);
        let mut adapter = EngineAdapter::start(&mut launcher, &EngineProfile::select(None)).unwrap();

        assert_eq!(adapter.next_event().unwrap(), Some(TranscriptEvent::Partial("Patient".into())));
        assert_eq!(
            adapter.next_event().unwrap(),
            Some(TranscriptEvent::Final("Patient zeigt Symptome.".into()))
        );
        assert_eq!(adapter.next_event().unwrap(), None);
        assert!(adapter.is_terminated());
        assert!(matches!(adapter.next_event(), Err(EngineError::Terminated)));
    }

    #[test]
    fn test_no_pull_after_fatal_error() {
        let mut launcher = ScriptedLauncher::new(vec![
            ScriptStep::fail("CUDA out of memory"),
            ScriptStep::partial("never seen"),
        ]);
        let mut adapter = EngineAdapter::start(&mut launcher, &EngineProfile::select(None)).unwrap();

        assert!(matches!(adapter.next_event(), Err(EngineError::Failure(_))));
        assert!(matches!(adapter.next_event(), Err(EngineError::Terminated)));
        assert_eq!(launcher.pulls(), 1);
    }

    #[test]
    fn test_prompt_reaches_engine_cell() {
        let mut launcher = ScriptedLauncher::new(vec![]);
        let adapter = EngineAdapter::start(&mut launcher, &EngineProfile::select(None)).unwrap();

        adapter.set_prompt("Orthopädie");
        assert_eq!(&*launcher.prompt().unwrap().get(), "Orthopädie");
    }

    #[test]
    fn test_launch_failure_propagates() {
        let mut launcher = ScriptedLauncher::failing("model not found");
        let result = EngineAdapter::start(&mut launcher, &EngineProfile::select(None));
        assert!(matches!(result, Err(EngineError::LaunchError(_))));
    }
}
