use thiserror::Error;

/// Recording engine errors
#[derive(Error, Debug)]
pub enum RecorderError {
    /// Transport-level failures at the messaging boundary
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Directory-related errors
    #[error("Directory error: {0}")]
    Directory(String),

    /// Session-related errors
    #[error("Session error: {0}")]
    Session(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RecorderError {
    /// Create a new Directory error
    pub fn directory<S: Into<String>>(msg: S) -> Self {
        Self::Directory(msg.into())
    }

    /// Create a new Session error
    pub fn session<S: Into<String>>(msg: S) -> Self {
        Self::Session(msg.into())
    }

    /// Create a new Config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

/// Errors surfaced by the messaging transport boundary.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    /// The message could not be delivered
    #[error("send failed: {0}")]
    Send(String),

    /// Joining or leaving a room failed
    #[error("room operation failed: {0}")]
    Room(String),

    /// The underlying connection is gone
    #[error("connection closed")]
    Closed,
}

/// Result type for recording engine operations
pub type Result<T> = std::result::Result<T, RecorderError>;
