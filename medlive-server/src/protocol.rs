//! Per-session protocol state machine
//!
//! `Connected → Closed`. Inbound frames that do not parse, or parse to an
//! unknown kind, are dropped without a reply and without closing the session.

use medlive_broadcaster::{ClientMessage, ServerMessage, SessionReplies, PROMPT_UPDATED};
use tracing::{debug, info};

use crate::context::AppContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Closed,
}

pub struct ProtocolHandler {
    ctx: AppContext,
    replies: SessionReplies,
    state: SessionState,
}

impl ProtocolHandler {
    pub fn new(ctx: AppContext, replies: SessionReplies) -> Self {
        Self {
            ctx,
            replies,
            state: SessionState::Connected,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Handle one inbound text frame
    pub fn on_text(&mut self, raw: &str) {
        if self.state == SessionState::Closed {
            return;
        }

        if let Some(reply) = self.dispatch(raw) {
            if let Err(e) = self.replies.reply(&reply) {
                debug!(session_id = %self.replies.id(), "Reply dropped: {}", e);
            }
        }
    }

    /// Decide the reply for one inbound frame, applying its effects
    pub fn dispatch(&self, raw: &str) -> Option<ServerMessage> {
        let Some(message) = ClientMessage::parse(raw) else {
            debug!(session_id = %self.replies.id(), "Ignoring malformed message");
            return None;
        };

        match message {
            ClientMessage::SetPrompt { text } => {
                if !self.ctx.apply_prompt(&text) {
                    return None;
                }
                info!(
                    session_id = %self.replies.id(),
                    "New prompt received: {}...",
                    text.chars().take(50).collect::<String>()
                );
                Some(ServerMessage::info(PROMPT_UPDATED))
            }
            ClientMessage::Unknown => None,
        }
    }

    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}
