//! Noise sources: receiver static and room tone

use morse_core::filter::{Filter, OnePole};
use morse_core::rng::bipolar;
use rand::Rng;

/// Seed used when the caller does not supply a noise generator
pub const DEFAULT_NOISE_SEED: u32 = 12345;

const ROOM_WHITE_GAIN: f64 = 0.6;
const ROOM_SMOOTHING: f64 = 0.02;
const ROOM_WHITE_MIX: f64 = 0.3;
const ROOM_SMOOTH_MIX: f64 = 0.7;

/// Uniform white noise in `[-1, 1)`
pub fn white<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    bipolar(rng)
}

/// Warm background hiss: white noise blended with a heavily smoothed copy
#[derive(Debug, Clone)]
pub struct RoomTone {
    smoother: OnePole,
}

impl RoomTone {
    pub fn new() -> Self {
        Self {
            smoother: OnePole::with_alpha(ROOM_SMOOTHING),
        }
    }

    pub fn next_sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let white = white(rng) * ROOM_WHITE_GAIN;
        let smoothed = self.smoother.process_sample(white);
        white * ROOM_WHITE_MIX + smoothed * ROOM_SMOOTH_MIX
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morse_core::rng::seeded;

    #[test]
    fn test_room_tone_bounded_and_quieter_than_white() {
        let mut rng = seeded(3);
        let mut room = RoomTone::new();
        let samples: Vec<f64> = (0..20_000).map(|_| room.next_sample(&mut rng)).collect();
        assert!(samples.iter().all(|s| s.abs() <= ROOM_WHITE_GAIN));
        let rms = (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt();
        // uniform white noise has rms 1/sqrt(3)
        assert!(rms < 0.2, "rms {}", rms);
        assert!(rms > 0.05, "rms {}", rms);
    }

    #[test]
    fn test_room_tone_reproducible() {
        let mut a = RoomTone::new();
        let mut b = RoomTone::new();
        let mut ra = seeded(DEFAULT_NOISE_SEED);
        let mut rb = seeded(DEFAULT_NOISE_SEED);
        for _ in 0..100 {
            assert_eq!(a.next_sample(&mut ra), b.next_sample(&mut rb));
        }
    }
}
