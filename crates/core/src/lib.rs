//! Morse Core - DSP and clustering primitives
//!
//! This crate provides bounded sample sinks, biquad and one-pole filters,
//! one-dimensional k-means clustering and seeded random generators. None of
//! it knows about Morse code; the codec and audio crates build on it.

pub mod buffer;
pub mod cluster;
pub mod error;
pub mod filter;
pub mod rng;

pub use error::{CoreError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        buffer::{Counter, SampleBuffer, Sink, SliceSink},
        cluster::{Clustering, KMeans, KMeansConfig},
        error::{CoreError, Result},
        filter::{Biquad, Filter, OnePole},
        rng::{seeded, MorseRng},
    };
}
