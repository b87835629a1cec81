//! Mechanical telegraph sounder
//!
//! A sounder does not hold a tone. The armature strikes when the key goes
//! down and strikes again, softer and lower, when it is released. Each
//! strike is a short burst of inharmonic partials shaped by a sharp attack
//! transient and the solenoid's slower decay. A 25 ms echo of the strikes
//! and a faint room tone fill the space around them.

use crate::common::Voice;
use crate::noise::RoomTone;
use crate::params::{unit, AudioParams, TelegraphParams};
use morse_codecs::element::ElementKind;
use morse_core::rng::bipolar;
use rand::Rng;
use std::f64::consts::TAU;

const CLICK_SECONDS: f64 = 0.010;
const ECHO_DELAY_SECONDS: f64 = 0.025;
const ECHO_MIX: f64 = 0.35;
/// Echo copies decay this much faster than the direct strike
const ECHO_DECAY_RATIO: f64 = 2.0;
const MAX_PITCH_JITTER: f64 = 0.05;
const SHARPNESS_SPAN: f64 = 999.0;

/// (frequency ratio, amplitude) of each partial, fundamental first
const PARTIALS: [(f64, f64); 6] = [
    (1.0, 1.0),
    (2.3, 0.4),
    (0.6, 0.25),
    (3.7, 0.15),
    (5.1, 0.1),
    (0.4, 0.3),
];
/// Sum of the partial amplitudes
const PARTIAL_SUM: f64 = 2.2;

/// Armature strike character
#[derive(Debug, Clone, Copy)]
struct Stroke {
    freq_ratio: f64,
    sharpness_ratio: f64,
    gain: f64,
}

const KEY_DOWN: Stroke = Stroke {
    freq_ratio: 1.0,
    sharpness_ratio: 1.0,
    gain: 1.0,
};

const KEY_UP: Stroke = Stroke {
    freq_ratio: 0.85,
    sharpness_ratio: 0.7,
    gain: 0.6,
};

/// Fixed delay line, one slot per sample of delay
#[derive(Debug, Clone)]
pub struct EchoLine {
    buf: Vec<f64>,
    pos: usize,
}

impl EchoLine {
    pub fn new(delay_samples: usize) -> Self {
        Self {
            buf: vec![0.0; delay_samples],
            pos: 0,
        }
    }

    /// Store `input` and return the sample written `delay_samples` ago
    pub fn exchange(&mut self, input: f64) -> f64 {
        let Some(slot) = self.buf.get_mut(self.pos) else {
            return input;
        };
        let out = std::mem::replace(slot, input);
        self.pos = (self.pos + 1) % self.buf.len();
        out
    }
}

/// Telegraph sound model
#[derive(Debug, Clone)]
pub struct TelegraphVoice {
    sample_rate: f64,
    volume: f64,
    resonance_hz: f64,
    sharpness: f64,
    solenoid_decay: f64,
    mechanical_noise: f64,
    room_level: f64,
    reverb: f64,
    click_samples: usize,
    room: RoomTone,
    echo: EchoLine,
    keyed: bool,
    span: usize,
    click_len: usize,
    down_hz: f64,
    up_hz: f64,
}

impl TelegraphVoice {
    pub fn new(telegraph: &TelegraphParams, params: &AudioParams) -> Self {
        let sample_rate = params.sample_rate as f64;
        let decay_rate = telegraph.decay_rate.max(0.0);
        let resonance_hz = telegraph.resonance_freq_hz.max(0.0);
        let solenoid_decay =
            decay_rate * (1.0 + resonance_hz / 1000.0 * unit(telegraph.solenoid_response));

        Self {
            sample_rate,
            volume: params.clamped_volume(),
            resonance_hz,
            sharpness: 1.0 + unit(telegraph.click_sharpness) * SHARPNESS_SPAN,
            solenoid_decay,
            mechanical_noise: unit(telegraph.mechanical_noise),
            room_level: unit(telegraph.room_tone_level),
            reverb: unit(telegraph.reverb_amount),
            click_samples: (CLICK_SECONDS * sample_rate).round() as usize,
            room: RoomTone::new(),
            echo: EchoLine::new((ECHO_DELAY_SECONDS * sample_rate).round() as usize),
            keyed: false,
            span: 0,
            click_len: 0,
            down_hz: resonance_hz,
            up_hz: resonance_hz,
        }
    }

    fn strike_hz<R: Rng + ?Sized>(&self, stroke: Stroke, rng: &mut R) -> f64 {
        let base = self.resonance_hz * stroke.freq_ratio;
        if self.mechanical_noise > 0.0 {
            base * (1.0 + bipolar(rng) * self.mechanical_noise * MAX_PITCH_JITTER)
        } else {
            base
        }
    }

    /// Direct and echo-source levels `t` seconds into a strike
    fn strike(&self, stroke: Stroke, freq: f64, t: f64) -> (f64, f64) {
        let body: f64 = PARTIALS
            .iter()
            .map(|&(ratio, amplitude)| amplitude * (TAU * freq * ratio * t).sin())
            .sum::<f64>()
            / PARTIAL_SUM;
        let attack = (-t * self.sharpness * stroke.sharpness_ratio).exp();
        let level = body * attack * self.volume * stroke.gain;

        let direct = level * (-t * self.solenoid_decay).exp();
        let echo = level * (-t * self.solenoid_decay * ECHO_DECAY_RATIO).exp();
        (direct, echo)
    }
}

impl Voice for TelegraphVoice {
    fn begin_element<R: Rng + ?Sized>(&mut self, kind: ElementKind, span: usize, rng: &mut R) {
        self.keyed = kind.is_tone();
        self.span = span;
        self.click_len = self.click_samples.min(span / 2);
        if self.keyed {
            self.down_hz = self.strike_hz(KEY_DOWN, rng);
            self.up_hz = self.strike_hz(KEY_UP, rng);
        }
    }

    fn next_sample<R: Rng + ?Sized>(&mut self, index: usize, rng: &mut R) -> f64 {
        let release_start = self.span - self.click_len;
        let (direct, echo_source) = if !self.keyed {
            (0.0, 0.0)
        } else if index < self.click_len {
            self.strike(KEY_DOWN, self.down_hz, index as f64 / self.sample_rate)
        } else if index >= release_start {
            let t = (index - release_start) as f64 / self.sample_rate;
            self.strike(KEY_UP, self.up_hz, t)
        } else {
            (0.0, 0.0)
        };

        let mut signal = direct + self.echo.exchange(echo_source) * ECHO_MIX * self.reverb;
        if self.room_level > 0.0 {
            signal += self.room.next_sample(rng) * self.room_level * self.volume;
        }
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morse_core::rng::seeded;

    fn dry() -> TelegraphParams {
        TelegraphParams {
            mechanical_noise: 0.0,
            room_tone_level: 0.0,
            reverb_amount: 0.0,
            ..TelegraphParams::default()
        }
    }

    fn voice(telegraph: &TelegraphParams) -> TelegraphVoice {
        let params = AudioParams {
            volume: 1.0,
            ..AudioParams::telegraph(telegraph.clone()).with_sample_rate(8000)
        };
        TelegraphVoice::new(telegraph, &params)
    }

    fn render(voice: &mut TelegraphVoice, elements: &[(ElementKind, usize)]) -> Vec<f64> {
        let mut rng = seeded(11);
        let mut out = Vec::new();
        for &(kind, span) in elements {
            voice.begin_element(kind, span, &mut rng);
            out.extend((0..span).map(|i| voice.next_sample(i, &mut rng)));
        }
        out
    }

    fn energy(samples: &[f64]) -> f64 {
        samples.iter().map(|s| s * s).sum()
    }

    #[test]
    fn test_clicks_at_both_edges() {
        let mut v = voice(&dry());
        let samples = render(&mut v, &[(ElementKind::Dash, 2400)]);
        // 10 ms clicks at 8 kHz are 80 samples long
        assert!(energy(&samples[..80]) > 0.0);
        assert!(energy(&samples[2320..]) > 0.0);
        assert!(samples[80..2320].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_click_capped_to_half_element() {
        let mut v = voice(&dry());
        render(&mut v, &[(ElementKind::Dot, 60)]);
        assert_eq!(v.click_len, 30);
    }

    #[test]
    fn test_sharper_click_is_shorter() {
        let soft = TelegraphParams {
            click_sharpness: 0.0,
            ..dry()
        };
        let hard = TelegraphParams {
            click_sharpness: 1.0,
            ..dry()
        };
        let soft = render(&mut voice(&soft), &[(ElementKind::Dot, 480)]);
        let hard = render(&mut voice(&hard), &[(ElementKind::Dot, 480)]);
        assert!(energy(&hard[..80]) < energy(&soft[..80]));
    }

    #[test]
    fn test_echo_rings_into_gap() {
        let wet = TelegraphParams {
            reverb_amount: 1.0,
            ..dry()
        };
        let elements = [(ElementKind::Dot, 480), (ElementKind::Gap, 800)];
        let samples = render(&mut voice(&wet), &elements);
        assert!(energy(&samples[480..680]) > 0.0);

        let samples = render(&mut voice(&dry()), &elements);
        assert!(samples[480..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_room_tone_fills_gaps() {
        let roomy = TelegraphParams {
            room_tone_level: 1.0,
            ..dry()
        };
        let samples = render(&mut voice(&roomy), &[(ElementKind::Gap, 400)]);
        assert!(energy(&samples) > 0.0);
    }

    #[test]
    fn test_pitch_jitter_bounded() {
        let shaky = TelegraphParams {
            mechanical_noise: 1.0,
            ..dry()
        };
        let v = voice(&shaky);
        let mut rng = seeded(5);
        for _ in 0..1000 {
            let hz = v.strike_hz(KEY_DOWN, &mut rng);
            assert!((760.0..=840.0).contains(&hz), "{}", hz);
        }
    }

    #[test]
    fn test_echo_line_delay() {
        let mut line = EchoLine::new(3);
        let out: Vec<f64> = [1.0, 2.0, 3.0, 4.0, 5.0].iter().map(|&x| line.exchange(x)).collect();
        assert_eq!(out, vec![0.0, 0.0, 0.0, 1.0, 2.0]);
        let mut passthrough = EchoLine::new(0);
        assert_eq!(passthrough.exchange(0.7), 0.7);
    }
}
