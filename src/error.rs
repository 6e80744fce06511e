//! Centralized error types for mailreply.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mailreply library.
#[derive(Error, Debug)]
pub enum MailError {
    /// No `text/plain` or `text/html` leaf with decodable data was found.
    #[error("No body found in message")]
    NoBodyFound,

    /// The original message has neither a `From` nor a `To` header.
    #[error("No valid recipient found: original message has neither From nor To")]
    NoRecipient,

    /// A body payload is not valid base64.
    #[error("Base64 decoding error: {0}")]
    Decode(String),

    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("Message file not found: {0}")]
    FileNotFound(PathBuf),

    /// The input could not be understood as a provider document or raw message.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

/// Convenience alias for `Result<T, MailError>`.
pub type Result<T> = std::result::Result<T, MailError>;

impl MailError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for MailError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidMessage(format!("malformed provider JSON: {e}"))
    }
}

impl From<base64::DecodeError> for MailError {
    fn from(e: base64::DecodeError) -> Self {
        Self::Decode(e.to_string())
    }
}
