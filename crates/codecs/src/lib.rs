//! Morse Codecs - text to timing and signals back to text
//!
//! This crate holds the character/pattern table, the ITU timing encoder
//! that turns text into dot, dash and gap elements, and the decoder that
//! recovers text from raw on/off durations by clustering.

pub mod element;
pub mod error;
pub mod interpret;
pub mod patterns;
pub mod timing;

pub use error::{CodecError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        element::{elements_to_signals, Element, ElementKind, Signal},
        error::{CodecError, Result},
        interpret::{decode, decode_size, InterpretParams, InterpretResult},
        patterns::{lookup, reverse_lookup, Pattern, Symbol},
        timing::{
            encode, encode_into, encode_into_with_rng, encode_size, encode_with_rng, TimingParams,
        },
    };
}
