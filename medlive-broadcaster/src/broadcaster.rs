use tokio::sync::{mpsc, oneshot};

use crate::error::{BroadcasterError, Result};
use crate::events::ServerMessage;
use crate::registry::SessionRegistry;
use crate::session::{Session, SessionId};

/// Work items for the serving-context loop
#[derive(Debug)]
enum Command {
    Register(Session),
    Unregister(SessionId),
    Broadcast(ServerMessage),
    Count(oneshot::Sender<usize>),
}

/// Serving-context loop that owns the session registry
///
/// Every registry change and every broadcast is applied here, one command
/// at a time, in the order the commands were submitted.
pub struct Broadcaster {
    registry: SessionRegistry,
    rx: mpsc::UnboundedReceiver<Command>,
}

/// Cloneable submission handle
///
/// Submitting never blocks and does not need an async context, so the
/// engine worker thread can use it directly.
#[derive(Clone, Debug)]
pub struct BroadcasterHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl Broadcaster {
    /// Create the loop and its first handle
    pub fn new() -> (Self, BroadcasterHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                registry: SessionRegistry::new(),
                rx,
            },
            BroadcasterHandle { tx },
        )
    }

    /// Drain commands until every handle is dropped
    pub async fn run(mut self) {
        tracing::info!("Broadcaster started");
        while let Some(command) = self.rx.recv().await {
            self.apply(command);
        }
        tracing::info!("Broadcaster stopped ({} sessions left)", self.registry.len());
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Register(session) => {
                if let Err(e) = self.registry.register(session) {
                    tracing::warn!("Rejected session: {}", e);
                }
            }
            Command::Unregister(id) => {
                let _ = self.registry.unregister(id);
            }
            Command::Broadcast(message) => {
                if let Err(e) = self.registry.broadcast(&message) {
                    tracing::error!("Failed to broadcast {}: {}", message.kind(), e);
                }
            }
            Command::Count(reply) => {
                let _ = reply.send(self.registry.len());
            }
        }
    }
}

impl BroadcasterHandle {
    pub fn register(&self, session: Session) -> Result<()> {
        self.submit(Command::Register(session))
    }

    pub fn unregister(&self, id: SessionId) -> Result<()> {
        self.submit(Command::Unregister(id))
    }

    /// Queue `message` for every session registered when the loop reaches it
    pub fn broadcast(&self, message: ServerMessage) -> Result<()> {
        self.submit(Command::Broadcast(message))
    }

    /// Number of registered sessions, after all earlier commands were applied
    pub async fn session_count(&self) -> Result<usize> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::Count(reply))?;
        rx.await.map_err(|_| BroadcasterError::Closed)
    }

    fn submit(&self, command: Command) -> Result<()> {
        self.tx.send(command).map_err(|_| BroadcasterError::Closed)
    }
}
