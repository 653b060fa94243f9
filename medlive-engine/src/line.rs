//! JSON-lines producer bridge
//!
//! An external recognizer writes one record per line:
//!
//! ```text
//! {"type":"partial","text":"Patient zeigt"}
//! {"type":"final","text":"Patient zeigt Symptome."}
//! ```
//!
//! When the recognizer runs as a child process, prompt changes are written
//! back to its stdin as `{"type":"set_prompt","text":...}` lines by a
//! separate forwarder thread, so a recognizer waiting for input gets the
//! prompt while the worker is blocked on its output.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::engine::{EngineLauncher, SpeechEngine};
use crate::error::{EngineError, Result};
use crate::event::TranscriptEvent;
use crate::profile::EngineProfile;
use crate::prompt::PromptCell;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ProducerRecord {
    Partial { text: String },
    Final { text: String },
}

/// Parse one producer line. `Ok(None)` for blank lines.
pub fn parse_record(line: &str) -> Result<Option<TranscriptEvent>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let record: ProducerRecord = serde_json::from_str(line)
        .map_err(|e| EngineError::invalid_record(format!("{e}: {line}")))?;

    Ok(Some(match record {
        ProducerRecord::Partial { text } => TranscriptEvent::Partial(text),
        ProducerRecord::Final { text } => TranscriptEvent::Final(text),
    }))
}

/// How often an idle forwarder checks whether its engine is gone
const FORWARDER_POLL: Duration = Duration::from_millis(200);

/// Thread writing prompt changes to the producer
struct PromptForwarder {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PromptForwarder {
    fn spawn(prompt: PromptCell, mut sink: Box<dyn Write + Send>) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stopped = Arc::clone(&stop);
        let mut seen = prompt.version();
        let handle = std::thread::Builder::new()
            .name("prompt-forwarder".to_string())
            .spawn(move || {
                while !stopped.load(Ordering::Acquire) {
                    let Some((version, text)) = prompt.wait_newer(seen, FORWARDER_POLL) else {
                        continue;
                    };
                    if let Err(e) = write_prompt(&mut sink, &text) {
                        // The recognizer stopped listening; transcripts keep flowing
                        warn!("Prompt forwarding disabled: {}", e);
                        return;
                    }
                    seen = version;
                    debug!("Forwarded prompt (version {}) to producer", version);
                }
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn write_prompt(sink: &mut dyn Write, text: &str) -> std::io::Result<()> {
    let line = serde_json::json!({ "type": "set_prompt", "text": text });
    writeln!(sink, "{line}")?;
    sink.flush()
}

/// Producer reading JSON-lines records from any buffered reader
pub struct LineEngine<R> {
    reader: R,
    forwarder: Option<PromptForwarder>,
    child: Option<Child>,
    line: String,
}

impl<R: BufRead + Send> LineEngine<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            forwarder: None,
            child: None,
            line: String::new(),
        }
    }

    /// Write every later prompt change to `sink` from a background thread
    pub fn with_prompt_sink(mut self, prompt: PromptCell, sink: Box<dyn Write + Send>) -> Result<Self> {
        self.forwarder = Some(PromptForwarder::spawn(prompt, sink)?);
        Ok(self)
    }

    fn with_child(mut self, child: Child) -> Self {
        self.child = Some(child);
        self
    }
}

impl<R: BufRead + Send> SpeechEngine for LineEngine<R> {
    fn next_event(&mut self) -> Result<Option<TranscriptEvent>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }

            match parse_record(&self.line) {
                Ok(Some(event)) => return Ok(Some(event)),
                Ok(None) => continue,
                Err(e) => warn!("Skipping producer line: {}", e),
            }
        }
    }
}

impl<R> Drop for LineEngine<R> {
    fn drop(&mut self) {
        // Killing the child first unblocks a forwarder stuck on a full pipe
        if let Some(child) = self.child.as_mut() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(forwarder) = self.forwarder.as_mut() {
            forwarder.shutdown();
        }
    }
}

/// Runs an external recognizer process and reads its stdout
///
/// The profile is passed through `MEDLIVE_MODEL`, `MEDLIVE_COMPUTE_TYPE`,
/// `MEDLIVE_LANGUAGE` and `MEDLIVE_DEVICE`.
#[derive(Debug, Clone)]
pub struct CommandLauncher {
    program: String,
    args: Vec<String>,
}

impl CommandLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl EngineLauncher for CommandLauncher {
    fn launch(&mut self, profile: &EngineProfile, prompt: PromptCell) -> Result<Box<dyn SpeechEngine>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("MEDLIVE_MODEL", &profile.model)
            .env("MEDLIVE_COMPUTE_TYPE", &profile.compute_type)
            .env("MEDLIVE_LANGUAGE", &profile.language)
            .env("MEDLIVE_DEVICE", &profile.device)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| EngineError::launch(format!("failed to spawn {}: {}", self.program, e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::launch("recognizer stdout not captured"))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::launch("recognizer stdin not captured"))?;

        info!("Recognizer process started: {} (pid {})", self.program, child.id());

        let engine = LineEngine::new(BufReader::new(stdout)).with_child(child);
        Ok(Box::new(engine.with_prompt_sink(prompt, Box::new(stdin))?))
    }
}

/// Reads producer records from this process' stdin
#[derive(Debug, Clone, Default)]
pub struct StdinLauncher;

impl EngineLauncher for StdinLauncher {
    fn launch(&mut self, _profile: &EngineProfile, _prompt: PromptCell) -> Result<Box<dyn SpeechEngine>> {
        info!("Reading transcript records from stdin");
        Ok(Box::new(LineEngine::new(BufReader::new(std::io::stdin()))))
    }
}
