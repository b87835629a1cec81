//! Error types for Morse Audio

use thiserror::Error;

/// Audio error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("Invalid sample rate: {rate} (expected 1..=192000)")]
    InvalidSampleRate { rate: u32 },

    #[error("Invalid tone frequency: {freq} Hz (expected (0, 20000])")]
    InvalidFrequency { freq: f64 },

    #[error("Core error: {0}")]
    Core(#[from] morse_core::CoreError),
}

/// Result type for Morse Audio operations
pub type Result<T> = std::result::Result<T, AudioError>;
