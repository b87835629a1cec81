//! Key-down/key-up detection from recorded audio
//!
//! The signal is full-wave rectified and smoothed into an amplitude
//! envelope. The key is down while the envelope is above a fraction of its
//! peak; a lower release threshold keeps ripple from chattering the key.

use anyhow::{Context, Result};
use morse_codecs::element::Signal;
use morse_core::buffer::SampleBuffer;
use morse_core::filter::{Filter, OnePole};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Peaks below this are treated as silence
const SILENCE_FLOOR: f64 = 1e-4;

/// Envelope detector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Envelope smoothing cutoff in Hz
    pub smoothing_hz: f64,
    /// Key-down threshold as a fraction of the envelope peak
    pub threshold: f64,
    /// Release threshold sits this fraction below the key-down threshold
    pub hysteresis: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            smoothing_hz: 50.0,
            threshold: 0.5,
            hysteresis: 0.1,
        }
    }
}

/// Run-length encode key state from audio
pub fn detect_signals(buffer: &SampleBuffer<f32>, config: &DetectorConfig) -> Result<Vec<Signal>> {
    let sample_rate = buffer.sample_rate() as f64;
    let mut smoother = OnePole::lowpass(config.smoothing_hz, sample_rate)
        .context("Invalid envelope smoothing cutoff")?;

    let envelope: Vec<f64> = buffer
        .data()
        .iter()
        .map(|&s| smoother.process_sample((s as f64).abs()))
        .collect();

    let peak = envelope.iter().copied().fold(0.0, f64::max);
    if peak < SILENCE_FLOOR {
        debug!(peak, "no keyed signal found");
        return Ok(Vec::new());
    }

    let press = peak * config.threshold;
    let release = press * (1.0 - config.hysteresis);

    let mut signals = Vec::new();
    let mut keyed = false;
    let mut run = 0usize;
    for &level in &envelope {
        let next = if keyed { level >= release } else { level >= press };
        if next != keyed {
            if run > 0 {
                signals.push(span(keyed, run, sample_rate));
            }
            keyed = next;
            run = 0;
        }
        run += 1;
    }
    if run > 0 {
        signals.push(span(keyed, run, sample_rate));
    }

    debug!(peak, signals = signals.len(), "detected key transitions");
    Ok(signals)
}

fn span(on: bool, samples: usize, sample_rate: f64) -> Signal {
    Signal {
        on,
        seconds: samples as f64 / sample_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morse_audio::params::{AudioParams, RadioParams};
    use morse_audio::synth::synthesize_buffer;
    use morse_codecs::interpret::{decode, InterpretParams};
    use morse_codecs::timing::{encode, TimingParams};

    fn keyed_tone(text: &str) -> SampleBuffer<f32> {
        let elements = encode(text, &TimingParams::with_wpm(20));
        let params = AudioParams::radio(RadioParams::default()).with_sample_rate(8000);
        synthesize_buffer(&elements, &params).unwrap()
    }

    #[test]
    fn test_silence_has_no_signals() {
        let buffer = SampleBuffer::from_data(vec![0.0f32; 800], 8000).unwrap();
        assert!(detect_signals(&buffer, &DetectorConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn test_square_keying_durations() {
        // 100 ms of full-scale tone, 100 ms silence, 100 ms tone
        let mut samples = Vec::new();
        for block in 0..3 {
            for i in 0..800 {
                let on = block != 1;
                samples.push(if on && i % 2 == 0 { 0.8f32 } else if on { -0.8 } else { 0.0 });
            }
        }
        let buffer = SampleBuffer::from_data(samples, 8000).unwrap();
        let signals = detect_signals(&buffer, &DetectorConfig::default()).unwrap();

        let on: Vec<&Signal> = signals.iter().filter(|s| s.on).collect();
        assert_eq!(on.len(), 2);
        for s in on {
            assert!((s.seconds - 0.1).abs() < 0.01, "{}", s.seconds);
        }
    }

    #[test]
    fn test_synthesized_audio_decodes() {
        for text in ["SOS", "HELLO WORLD"] {
            let signals = detect_signals(&keyed_tone(text), &DetectorConfig::default()).unwrap();
            let result = decode(&signals, &InterpretParams::default());
            assert_eq!(result.text, text);
        }
    }

    #[test]
    fn test_invalid_smoothing() {
        let buffer = SampleBuffer::from_data(vec![0.5f32; 10], 8000).unwrap();
        let config = DetectorConfig {
            smoothing_hz: 0.0,
            ..DetectorConfig::default()
        };
        assert!(detect_signals(&buffer, &config).is_err());
    }
}
