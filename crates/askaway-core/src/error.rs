//! Error types for the chat core.

use thiserror::Error;

/// Failure talking to a chat backend.
///
/// Never shown to the user verbatim; the session turns it into an error
/// record carrying the fallback text.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::MalformedBody(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Reasons a session operation is refused before anything changes
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("a message is already being sent")]
    Busy,
}

/// Failure reading or writing a persistence slot
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
