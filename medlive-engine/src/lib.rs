//! MedLive engine adapter
//!
//! Wraps an external, blocking speech-to-text producer behind a pull-style
//! event sequence and a live prompt cell.
//!
//! ## Features
//!
//! - `Partial` / `Final` transcript events from a blocking `next_event`
//! - Prompt updates while the producer runs (last write wins)
//! - Terminal-state guard: a failed or finished producer is never polled again
//! - Hardware class → model profile lookup
//! - JSON-lines producers: child process, stdin, or scripted (tests)
//!
//! ## Quick Start
//!
//! ```no_run
//! use medlive_engine::{CommandLauncher, EngineAdapter, EngineProfile};
//!
//! let profile = EngineProfile::select(Some("NVIDIA GeForce RTX 4090"));
//! let mut launcher = CommandLauncher::new("python", vec!["recognizer.py".into()]);
//! let mut adapter = EngineAdapter::start(&mut launcher, &profile)?;
//!
//! while let Some(event) = adapter.next_event()? {
//!     println!("{}: {}", event.kind(), event.text());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod engine;
pub mod error;
pub mod event;
pub mod line;
pub mod profile;
pub mod prompt;
pub mod scripted;
pub mod status;

pub use engine::{EngineAdapter, EngineLauncher, SpeechEngine};
pub use error::{EngineError, Result};
pub use event::TranscriptEvent;
pub use line::{CommandLauncher, LineEngine, StdinLauncher};
pub use profile::{EngineProfile, HardwareClass};
pub use prompt::PromptCell;
pub use scripted::{ScriptFeeder, ScriptStep, ScriptedEngine, ScriptedLauncher};
pub use status::{WorkerState, WorkerStatus};
