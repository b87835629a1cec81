//! Morse Tools library
//!
//! Support code for the `morse` binary: configuration files, WAV I/O and
//! key detection from recorded audio.

pub mod common;
pub mod config;
pub mod detect;
pub mod notation;
pub mod wav;

pub use common::{init_logging, ConfigFormat, GlobalConfig};
pub use config::MorseConfig;
pub use detect::{detect_signals, DetectorConfig};
pub use notation::to_notation;
pub use wav::{read_wav, write_wav};
