use serde::{Deserialize, Serialize};

/// Messages pushed from the server to clients
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// In-progress transcript, may still be revised
    #[serde(rename = "partial")]
    Partial { text: String },

    /// Finalized transcript segment
    #[serde(rename = "final")]
    Final { text: String },

    /// Acknowledgement or notice for a single client
    #[serde(rename = "info")]
    Info { text: String },
}

/// Messages sent by clients
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Replace the engine prompt
    #[serde(rename = "set_prompt")]
    SetPrompt {
        #[serde(default)]
        text: String,
    },

    /// Any other discriminant
    #[serde(other)]
    Unknown,
}

/// Acknowledgement text for a prompt update
pub const PROMPT_UPDATED: &str = "Prompt aktualisiert";

impl ServerMessage {
    pub fn partial(text: impl Into<String>) -> Self {
        Self::Partial { text: text.into() }
    }

    pub fn final_text(text: impl Into<String>) -> Self {
        Self::Final { text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::Info { text: text.into() }
    }

    /// Wire representation (one WebSocket text frame)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Partial { .. } => "partial",
            ServerMessage::Final { .. } => "final",
            ServerMessage::Info { .. } => "info",
        }
    }
}

impl ClientMessage {
    /// Parse an inbound text frame. `None` if it is not a well-formed record.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}
