//! Events yielded by the transcription producer

/// One unit of output from the speech engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// Incremental, possibly revised text for speech still in progress
    Partial(String),
    /// Finalized text for a completed speech segment
    Final(String),
}

impl TranscriptEvent {
    /// Text carried by the event
    pub fn text(&self) -> &str {
        match self {
            TranscriptEvent::Partial(text) | TranscriptEvent::Final(text) => text,
        }
    }

    /// Short label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            TranscriptEvent::Partial(_) => "partial",
            TranscriptEvent::Final(_) => "final",
        }
    }
}
