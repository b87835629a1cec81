//! Morse Audio - element sequences to sound
//!
//! Two sound models share one rendering loop: a radio receiver tone with
//! selectable waveform and static, and a mechanical telegraph sounder that
//! clicks on key-down and key-up.

pub mod common;
pub mod error;
pub mod noise;
pub mod oscillator;
pub mod params;
pub mod radio;
pub mod synth;
pub mod telegraph;

pub use error::{AudioError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        common::Voice,
        error::{AudioError, Result},
        params::{AudioParams, RadioParams, SoundModel, TelegraphParams, Waveform},
        synth::{
            synthesize, synthesize_buffer, synthesize_into, synthesize_into_with_rng,
            synthesize_size, synthesize_with_rng,
        },
    };
}
