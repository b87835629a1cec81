//! Continuous-wave receiver sound
//!
//! Tones are shaped with a linear attack and release of 5 ms each (capped
//! at half the element) to keep the keying free of clicks. Optional white
//! static runs under tones and gaps alike.

use crate::common::Voice;
use crate::noise::white;
use crate::oscillator::Oscillator;
use crate::params::{unit, AudioParams, RadioParams};
use morse_codecs::element::ElementKind;
use rand::Rng;

const ATTACK_SECONDS: f64 = 0.005;
const RELEASE_SECONDS: f64 = 0.005;

/// Radio sound model
#[derive(Debug, Clone)]
pub struct RadioVoice {
    oscillator: Oscillator,
    volume: f64,
    static_level: f64,
    attack_samples: usize,
    release_samples: usize,
    keyed: bool,
    span: usize,
    attack: usize,
    release: usize,
}

impl RadioVoice {
    pub fn new(radio: &RadioParams, params: &AudioParams) -> Self {
        let sample_rate = params.sample_rate as f64;
        Self {
            oscillator: Oscillator::new(radio.waveform, radio.tone_freq_hz, sample_rate),
            volume: params.clamped_volume(),
            static_level: unit(radio.background_static_level),
            attack_samples: (ATTACK_SECONDS * sample_rate).round() as usize,
            release_samples: (RELEASE_SECONDS * sample_rate).round() as usize,
            keyed: false,
            span: 0,
            attack: 0,
            release: 0,
        }
    }

    fn envelope(&self, index: usize) -> f64 {
        if index < self.attack {
            index as f64 / self.attack as f64
        } else if index >= self.span - self.release {
            (self.span - index) as f64 / self.release as f64
        } else {
            1.0
        }
    }
}

impl Voice for RadioVoice {
    fn begin_element<R: Rng + ?Sized>(&mut self, kind: ElementKind, span: usize, _rng: &mut R) {
        self.keyed = kind.is_tone();
        self.span = span;
        self.attack = self.attack_samples.min(span / 2);
        self.release = self.release_samples.min(span / 2);
        self.oscillator.reset();
    }

    fn next_sample<R: Rng + ?Sized>(&mut self, index: usize, rng: &mut R) -> f64 {
        let mut signal = 0.0;
        if self.keyed {
            signal = self.oscillator.next_sample() * self.volume * self.envelope(index);
        }
        if self.static_level > 0.0 {
            signal += white(rng) * self.static_level * self.volume;
        }
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Waveform;
    use morse_core::rng::seeded;

    fn voice(static_level: f64) -> RadioVoice {
        let radio = RadioParams {
            tone_freq_hz: 1000.0,
            waveform: Waveform::Square,
            background_static_level: static_level,
        };
        let params = AudioParams {
            volume: 1.0,
            ..AudioParams::radio(radio.clone()).with_sample_rate(8000)
        };
        RadioVoice::new(&radio, &params)
    }

    fn element(voice: &mut RadioVoice, kind: ElementKind, span: usize) -> Vec<f64> {
        let mut rng = seeded(9);
        voice.begin_element(kind, span, &mut rng);
        (0..span).map(|i| voice.next_sample(i, &mut rng)).collect()
    }

    #[test]
    fn test_envelope_ramps() {
        let mut v = voice(0.0);
        let samples = element(&mut v, ElementKind::Dash, 400);
        // 5 ms at 8 kHz is 40 samples; the square wave is +1 at phase 0
        assert_eq!(samples[0], 0.0);
        assert!((samples[10] - 0.25).abs() < 1e-9);
        assert_eq!(samples[200].abs(), 1.0);
        assert!((samples[399].abs() - 1.0 / 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_element_caps_ramps() {
        let mut v = voice(0.0);
        element(&mut v, ElementKind::Dot, 10);
        assert_eq!(v.attack, 5);
        assert_eq!(v.release, 5);
        element(&mut v, ElementKind::Dot, 1);
        assert_eq!(v.attack, 0);
        assert_eq!(v.release, 0);
    }

    #[test]
    fn test_gap_silent_without_static() {
        let mut v = voice(0.0);
        assert!(element(&mut v, ElementKind::Gap, 100).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_static_in_gaps() {
        let mut v = voice(0.5);
        let gap = element(&mut v, ElementKind::Gap, 100);
        assert!(gap.iter().any(|&s| s != 0.0));
        assert!(gap.iter().all(|s| s.abs() <= 0.5));
    }
}
