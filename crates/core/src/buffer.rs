//! Sample buffers and bounded output sinks
//!
//! Every producer in the workspace writes through a [`Sink`]. The same
//! generation code then serves three callers: a [`Counter`] that only sizes
//! the output, a [`SliceSink`] that fills a caller-provided buffer without
//! ever writing past its end, and a plain `Vec` for owned results.

use crate::{CoreError, Result};

/// Destination for generated items
pub trait Sink<T> {
    /// Offer one item. Returns `false` once the sink is full; the item is
    /// then discarded and callers should stop producing.
    fn push(&mut self, item: T) -> bool;

    /// Number of items accepted so far
    fn written(&self) -> usize;
}

impl<T> Sink<T> for Vec<T> {
    fn push(&mut self, item: T) -> bool {
        Vec::push(self, item);
        true
    }

    fn written(&self) -> usize {
        self.len()
    }
}

/// Sink that counts items without storing them
#[derive(Debug, Clone, Copy, Default)]
pub struct Counter {
    count: usize,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl<T> Sink<T> for Counter {
    fn push(&mut self, _item: T) -> bool {
        self.count += 1;
        true
    }

    fn written(&self) -> usize {
        self.count
    }
}

/// Sink over a fixed-capacity slice
///
/// Writes stop at `buf.len()`; later pushes are rejected and leave the
/// already written prefix untouched.
#[derive(Debug)]
pub struct SliceSink<'a, T> {
    buf: &'a mut [T],
    written: usize,
}

impl<'a, T> SliceSink<'a, T> {
    pub fn new(buf: &'a mut [T]) -> Self {
        Self { buf, written: 0 }
    }
}

impl<T> Sink<T> for SliceSink<'_, T> {
    fn push(&mut self, item: T) -> bool {
        match self.buf.get_mut(self.written) {
            Some(slot) => {
                *slot = item;
                self.written += 1;
                true
            }
            None => false,
        }
    }

    fn written(&self) -> usize {
        self.written
    }
}

/// Generic sample buffer for audio data
#[derive(Debug, Clone)]
pub struct SampleBuffer<T> {
    data: Vec<T>,
    sample_rate: u32,
}

impl<T> SampleBuffer<T> {
    /// Create a buffer from existing data
    pub fn from_data(data: Vec<T>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(CoreError::InvalidSampleRate {
                rate: sample_rate as f64,
            });
        }

        Ok(Self { data, sample_rate })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Duration of the buffer in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.data.len() as f64 / self.sample_rate as f64
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }
}
