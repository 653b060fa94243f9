//! Error types for engine operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine launch error: {0}")]
    LaunchError(String),

    #[error("Engine failure: {0}")]
    Failure(String),

    #[error("Engine terminated, no further events")]
    Terminated,

    #[error("Invalid producer record: {0}")]
    InvalidRecord(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn launch<S: Into<String>>(msg: S) -> Self {
        Self::LaunchError(msg.into())
    }

    pub fn failure<S: Into<String>>(msg: S) -> Self {
        Self::Failure(msg.into())
    }

    pub fn invalid_record<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRecord(msg.into())
    }
}
