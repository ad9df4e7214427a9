//! Error types for anonpy-fetch.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("request failed with HTTP status code {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("provider rejected the request ({value}): {message}")]
    Rejected { value: String, message: String },

    #[error("failed to decode server response: {0}")]
    Decode(String),

    /// The byte count of a transfer differs from the announced size, in
    /// either direction.
    #[error("transfer size mismatch: expected {expected} bytes, got {actual}")]
    Truncated { expected: u64, actual: u64 },

    #[error("file I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Connection-level failures that a retry may fix.
    pub fn is_transient(&self) -> bool { matches!(self, Error::Connection(_) | Error::Timeout(_)) }

    /// Classify a failure while reading a response body.
    ///
    /// The headers already arrived, so anything but a timeout means the
    /// connection broke mid-transfer.
    pub(crate) fn from_body_read(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Error::Timeout(e.to_string()),
            _ => Error::Connection(e.to_string()),
        }
    }

    /// Status code of an [`Error::HttpStatus`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self { Error::Decode(e.to_string()) }
}

pub type Result<T> = std::result::Result<T, Error>;
