//! Shared rendering loop for the sound models

use crate::params::AudioParams;
use morse_codecs::element::{Element, ElementKind};
use morse_core::buffer::Sink;
use morse_core::filter::{Biquad, Filter};
use rand::Rng;
use tracing::warn;

/// Sound model that turns elements into raw samples
///
/// The driver calls [`Voice::begin_element`] once per element and then
/// [`Voice::next_sample`] for each of its samples in order.
pub trait Voice {
    /// Prepare for an element spanning `span` samples
    fn begin_element<R: Rng + ?Sized>(&mut self, kind: ElementKind, span: usize, rng: &mut R);

    /// Unfiltered sample `index` of the current element
    fn next_sample<R: Rng + ?Sized>(&mut self, index: usize, rng: &mut R) -> f64;
}

/// High-pass followed by low-pass, fresh for every synthesis call
#[derive(Debug, Clone)]
pub struct FilterChain {
    highpass: Biquad,
    lowpass: Biquad,
}

impl FilterChain {
    pub fn new(params: &AudioParams) -> Self {
        let sample_rate = params.sample_rate as f64;
        Self {
            highpass: Biquad::butterworth_highpass(params.high_pass_cutoff, sample_rate),
            lowpass: Biquad::butterworth_lowpass(params.low_pass_cutoff, sample_rate),
        }
    }
}

impl Filter<f64> for FilterChain {
    fn process_sample(&mut self, input: f64) -> f64 {
        let filtered = self.highpass.process_sample(input);
        self.lowpass.process_sample(filtered)
    }

    fn reset(&mut self) {
        self.highpass.reset();
        self.lowpass.reset();
    }
}

/// Render every element through `voice`, filter, clamp and push to `sink`.
///
/// Stops early once the sink is full; returns the number of samples written.
pub fn render<V, R, S>(
    elements: &[Element],
    params: &AudioParams,
    voice: &mut V,
    rng: &mut R,
    sink: &mut S,
) -> usize
where
    V: Voice,
    R: Rng + ?Sized,
    S: Sink<f32>,
{
    let mut filters = FilterChain::new(params);

    'elements: for element in elements {
        let span = params.samples_for(element.duration);
        voice.begin_element(element.kind, span, rng);
        for index in 0..span {
            let raw = voice.next_sample(index, rng);
            let sample = filters.process_sample(raw).clamp(-1.0, 1.0) as f32;
            if !sink.push(sample) {
                warn!(capacity = sink.written(), "sample buffer full, audio truncated");
                break 'elements;
            }
        }
    }

    sink.written()
}

#[cfg(test)]
mod tests {
    use super::*;
    use morse_core::rng::seeded;

    /// Emits a constant level on tones and silence on gaps
    struct Dc(f64);

    impl Voice for Dc {
        fn begin_element<R: Rng + ?Sized>(
            &mut self,
            _kind: ElementKind,
            _span: usize,
            _rng: &mut R,
        ) {
        }

        fn next_sample<R: Rng + ?Sized>(&mut self, _index: usize, _rng: &mut R) -> f64 {
            self.0
        }
    }

    fn bypassed() -> AudioParams {
        AudioParams {
            sample_rate: 1000,
            low_pass_cutoff: 1000.0,
            high_pass_cutoff: 0.0,
            ..AudioParams::default()
        }
    }

    #[test]
    fn test_render_spans_and_clamps() {
        let elements = [
            Element::new(ElementKind::Dot, 0.01),
            Element::gap(0.005),
        ];
        let mut out = Vec::new();
        let written = render(&elements, &bypassed(), &mut Dc(2.5), &mut seeded(1), &mut out);
        assert_eq!(written, 15);
        assert!(out.iter().all(|&s| s == 1.0));
    }

    #[test]
    fn test_render_stops_at_capacity() {
        let elements = [Element::new(ElementKind::Dash, 0.1)];
        let mut buf = [0.0f32; 7];
        let mut sink = morse_core::buffer::SliceSink::new(&mut buf);
        let written = render(&elements, &bypassed(), &mut Dc(0.25), &mut seeded(1), &mut sink);
        assert_eq!(written, 7);
        assert_eq!(buf, [0.25; 7]);
    }

    #[test]
    fn test_highpass_in_chain_removes_dc() {
        let params = AudioParams {
            sample_rate: 8000,
            high_pass_cutoff: 100.0,
            ..AudioParams::default()
        };
        let elements = [Element::new(ElementKind::Dash, 1.0)];
        let mut out = Vec::new();
        render(&elements, &params, &mut Dc(0.5), &mut seeded(1), &mut out);
        assert!(out.last().unwrap().abs() < 1e-3);
    }
}
