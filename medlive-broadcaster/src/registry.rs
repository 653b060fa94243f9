use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{BroadcasterError, Result};
use crate::events::ServerMessage;
use crate::session::{Session, SessionId};

/// Outcome of one broadcast
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Sessions the frame was queued for
    pub delivered: usize,
    /// Sessions removed because delivery failed
    pub evicted: Vec<SessionId>,
}

/// Live set of connected sessions
///
/// Owned by the serving context; there is no locking because nothing else
/// ever touches it.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Add a session. A session id can only be registered once.
    pub fn register(&mut self, session: Session) -> Result<()> {
        let id = session.id();
        if self.sessions.contains_key(&id) {
            return Err(BroadcasterError::DuplicateSession(id.to_string()));
        }
        let _ = self.sessions.insert(id, session);
        tracing::info!(session_id = %id, total = self.sessions.len(), "Session registered");
        Ok(())
    }

    /// Remove a session, returning it if it was present
    pub fn unregister(&mut self, id: SessionId) -> Option<Session> {
        let removed = self.sessions.remove(&id);
        if removed.is_some() {
            tracing::info!(session_id = %id, remaining = self.sessions.len(), "Session unregistered");
        }
        removed
    }

    /// Deliver `message` to every registered session, evicting the ones that fail
    ///
    /// The message is serialized once. A failing session never stops delivery
    /// to the others; the only error is a serialization failure, in which case
    /// nothing is sent.
    pub fn broadcast(&mut self, message: &ServerMessage) -> Result<BroadcastReport> {
        let frame: Arc<str> = Arc::from(message.to_json()?);
        let mut report = BroadcastReport::default();

        for (id, session) in &self.sessions {
            match session.deliver(Arc::clone(&frame)) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(session_id = %id, peer = %session.peer(), "Failed to send to session: {}", e);
                    report.evicted.push(*id);
                }
            }
        }

        // Remove dead sessions after the pass
        for id in &report.evicted {
            if let Some(session) = self.sessions.remove(id) {
                session.close();
                tracing::info!(session_id = %id, remaining = self.sessions.len(), "Removed dead session");
            }
        }

        tracing::debug!(
            kind = message.kind(),
            recipients = report.delivered,
            evicted = report.evicted.len(),
            "Broadcast event"
        );
        Ok(report)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }
}
