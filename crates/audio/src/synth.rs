//! Element sequences to PCM samples
//!
//! Every element occupies `round(duration * sample_rate)` samples whatever
//! the sound model, so [`synthesize_size`] is exact for both. Output passes
//! a high-pass then a low-pass Butterworth section and is clamped to
//! `[-1, 1]`. Invalid parameters produce no samples.

use crate::common::render;
use crate::noise::DEFAULT_NOISE_SEED;
use crate::params::{AudioParams, SoundModel};
use crate::radio::RadioVoice;
use crate::telegraph::TelegraphVoice;
use crate::Result;
use morse_codecs::element::Element;
use morse_core::buffer::{SampleBuffer, SliceSink, Sink};
use morse_core::rng::{seeded, MorseRng};
use rand::Rng;
use tracing::debug;

/// Exact sample count [`synthesize`] would produce
pub fn synthesize_size(elements: &[Element], params: &AudioParams) -> usize {
    if let Err(err) = params.validate() {
        debug!(%err, "rejecting audio parameters");
        return 0;
    }
    elements.iter().map(|e| params.samples_for(e.duration)).sum()
}

/// Fill `out` with at most `out.len()` samples; returns how many were written
pub fn synthesize_into(elements: &[Element], params: &AudioParams, out: &mut [f32]) -> usize {
    synthesize_into_with_rng(elements, params, &mut noise_rng(), out)
}

/// [`synthesize_into`] with a caller-owned noise generator
pub fn synthesize_into_with_rng<R: Rng + ?Sized>(
    elements: &[Element],
    params: &AudioParams,
    rng: &mut R,
    out: &mut [f32],
) -> usize {
    let mut sink = SliceSink::new(out);
    dispatch(elements, params, rng, &mut sink)
}

/// Render into an owned sample vector.
///
/// Noise comes from a fixed seed, so identical inputs give identical audio.
pub fn synthesize(elements: &[Element], params: &AudioParams) -> Vec<f32> {
    synthesize_with_rng(elements, params, &mut noise_rng())
}

/// [`synthesize`] with a caller-owned noise generator
pub fn synthesize_with_rng<R: Rng + ?Sized>(
    elements: &[Element],
    params: &AudioParams,
    rng: &mut R,
) -> Vec<f32> {
    let mut samples = Vec::with_capacity(synthesize_size(elements, params));
    dispatch(elements, params, rng, &mut samples);
    samples
}

/// Render into a buffer tagged with its sample rate.
///
/// Unlike the other entry points this reports invalid parameters.
pub fn synthesize_buffer(
    elements: &[Element],
    params: &AudioParams,
) -> Result<SampleBuffer<f32>> {
    params.validate()?;
    let samples = synthesize(elements, params);
    Ok(SampleBuffer::from_data(samples, params.sample_rate)?)
}

fn noise_rng() -> MorseRng {
    seeded(DEFAULT_NOISE_SEED)
}

fn dispatch<R, S>(elements: &[Element], params: &AudioParams, rng: &mut R, sink: &mut S) -> usize
where
    R: Rng + ?Sized,
    S: Sink<f32>,
{
    if let Err(err) = params.validate() {
        debug!(%err, "rejecting audio parameters");
        return 0;
    }

    let written = match &params.sound {
        SoundModel::Radio(radio) => {
            let mut voice = RadioVoice::new(radio, params);
            render(elements, params, &mut voice, rng, sink)
        }
        SoundModel::Telegraph(telegraph) => {
            let mut voice = TelegraphVoice::new(telegraph, params);
            render(elements, params, &mut voice, rng, sink)
        }
    };

    debug!(
        mode = params.sound.name(),
        elements = elements.len(),
        samples = written,
        "synthesized audio"
    );
    written
}
