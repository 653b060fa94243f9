use thiserror::Error;

#[derive(Error, Debug)]
pub enum BroadcasterError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session {0} already registered")]
    DuplicateSession(String),

    #[error("Broadcaster loop has shut down")]
    Closed,
}

pub type Result<T> = std::result::Result<T, BroadcasterError>;
