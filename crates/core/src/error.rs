//! Error types for Morse Core

use thiserror::Error;

/// Core error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid sample rate: {rate}")]
    InvalidSampleRate { rate: f64 },

    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Invalid filter parameters: {msg}")]
    InvalidFilterParameters { msg: String },

    #[error("Cannot form {k} clusters from {points} points")]
    InvalidClusterCount { k: usize, points: usize },

    #[error("Non-finite value at index {index}")]
    NonFinitePoint { index: usize },
}

/// Result type for Morse Core operations
pub type Result<T> = std::result::Result<T, CoreError>;
