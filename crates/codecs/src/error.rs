//! Error types for Morse Codecs

use thiserror::Error;

/// Codec error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    #[error("Invalid codec parameters: {msg}")]
    InvalidParameters { msg: String },

    #[error("Invalid dot/dash pattern: {pattern:?}")]
    InvalidPattern { pattern: String },
}

/// Result type for Morse Codec operations
pub type Result<T> = std::result::Result<T, CodecError>;
