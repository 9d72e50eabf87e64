//! Error types for session store operations.

/// Error type for session store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No session with this id exists.
    #[error("Session not found: {0}")]
    NotFound(String),

    /// The session existed but sat idle past its TTL.
    #[error("Session expired: {0}")]
    Expired(String),
}

impl Error {
    /// Id of the session the error refers to.
    pub fn session_id(&self) -> &str {
        match self {
            Error::NotFound(id) | Error::Expired(id) => id,
        }
    }
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, Error>;
