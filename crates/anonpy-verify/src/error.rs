use std::io;

use crate::Algorithm;

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("{0} support was not compiled in")]
    Unsupported(Algorithm),

    #[error("invalid hex digest: {0}")]
    InvalidDigest(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, VerificationError>;
