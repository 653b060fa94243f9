use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::events::ServerMessage;

/// Opaque session identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a frame could not be queued for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// Client is not draining its queue
    QueueFull,
    /// Writer task is gone
    Disconnected,
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::QueueFull => f.write_str("outbound queue full"),
            DeliveryError::Disconnected => f.write_str("connection closed"),
        }
    }
}

/// Registry-side half of a live connection
///
/// Holds the delivery handle only; the socket itself belongs to the
/// connection's writer task.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    peer: SocketAddr,
    outbound: mpsc::Sender<Arc<str>>,
    closer: CancellationToken,
}

impl Session {
    /// Create both halves of a session with an outbound queue of `capacity` frames
    pub fn open(peer: SocketAddr, capacity: usize) -> (Session, SessionEndpoint) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let closer = CancellationToken::new();
        let id = SessionId::new();

        let session = Session {
            id,
            peer,
            outbound: tx.clone(),
            closer: closer.clone(),
        };
        let endpoint = SessionEndpoint {
            peer,
            replies: SessionReplies { id, tx },
            outbound: rx,
            closed: closer,
        };
        (session, endpoint)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Queue a serialized frame without waiting
    pub fn deliver(&self, frame: Arc<str>) -> Result<(), DeliveryError> {
        self.outbound.try_send(frame).map_err(delivery_error)
    }

    /// Ask the connection task to shut the socket
    pub fn close(&self) {
        self.closer.cancel();
    }
}

/// Connection-side half of a session
pub struct SessionEndpoint {
    peer: SocketAddr,
    replies: SessionReplies,
    outbound: mpsc::Receiver<Arc<str>>,
    closed: CancellationToken,
}

impl SessionEndpoint {
    pub fn id(&self) -> SessionId {
        self.replies.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Queue a message for this session only
    pub fn reply(&self, message: &ServerMessage) -> Result<(), DeliveryError> {
        self.replies.reply(message)
    }

    /// Token cancelled when the registry evicts this session
    pub fn closed(&self) -> CancellationToken {
        self.closed.clone()
    }

    /// Split into the reply handle and the frame receiver for the writer task
    pub fn split(self) -> (SessionReplies, mpsc::Receiver<Arc<str>>) {
        (self.replies, self.outbound)
    }
}

/// Reply handle kept by the protocol handler
#[derive(Clone)]
pub struct SessionReplies {
    id: SessionId,
    tx: mpsc::Sender<Arc<str>>,
}

impl SessionReplies {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn reply(&self, message: &ServerMessage) -> Result<(), DeliveryError> {
        let frame = message.to_json().map_err(|_| DeliveryError::Disconnected)?;
        self.tx.try_send(Arc::from(frame)).map_err(delivery_error)
    }
}

fn delivery_error<T>(e: TrySendError<T>) -> DeliveryError {
    match e {
        TrySendError::Full(_) => DeliveryError::QueueFull,
        TrySendError::Closed(_) => DeliveryError::Disconnected,
    }
}
