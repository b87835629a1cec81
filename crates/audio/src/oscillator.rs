//! Phase-accumulating tone oscillator

use crate::params::Waveform;
use std::f64::consts::TAU;

/// Oscillator whose phase is tracked in cycles, `[0, 1)`
#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    increment: f64,
    phase: f64,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f64, sample_rate: f64) -> Self {
        Self {
            waveform,
            increment: frequency / sample_rate,
            phase: 0.0,
        }
    }

    /// Current output, then advance one sample
    pub fn next_sample(&mut self) -> f64 {
        let value = shape(self.waveform, self.phase);
        self.phase += self.increment;
        self.phase -= self.phase.floor();
        value
    }

    /// Restart at phase zero
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Waveform value at `phase` cycles. Square follows the sign of the sine;
/// sawtooth and triangle are piecewise-linear over one cycle.
pub fn shape(waveform: Waveform, phase: f64) -> f64 {
    match waveform {
        Waveform::Sine => (TAU * phase).sin(),
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Sawtooth => 2.0 * phase - 1.0,
        Waveform::Triangle => {
            if phase <= 0.5 {
                4.0 * phase - 1.0
            } else {
                3.0 - 4.0 * phase
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes_at_key_phases() {
        assert!(shape(Waveform::Sine, 0.25) > 0.999);
        assert_eq!(shape(Waveform::Square, 0.1), 1.0);
        assert_eq!(shape(Waveform::Square, 0.6), -1.0);
        assert_eq!(shape(Waveform::Sawtooth, 0.0), -1.0);
        assert_eq!(shape(Waveform::Sawtooth, 0.5), 0.0);
        assert_eq!(shape(Waveform::Triangle, 0.0), -1.0);
        assert_eq!(shape(Waveform::Triangle, 0.5), 1.0);
        assert_eq!(shape(Waveform::Triangle, 0.75), 0.0);
    }

    #[test]
    fn test_all_shapes_bounded() {
        for waveform in [Waveform::Sine, Waveform::Square, Waveform::Sawtooth, Waveform::Triangle] {
            let mut osc = Oscillator::new(waveform, 1234.5, 44_100.0);
            for _ in 0..10_000 {
                let v = osc.next_sample();
                assert!((-1.0..=1.0).contains(&v), "{:?} {}", waveform, v);
            }
        }
    }

    #[test]
    fn test_frequency() {
        // 1 kHz at 8 kHz repeats every eight samples
        let mut osc = Oscillator::new(Waveform::Sine, 1000.0, 8000.0);
        let first: Vec<f64> = (0..8).map(|_| osc.next_sample()).collect();
        let second: Vec<f64> = (0..8).map(|_| osc.next_sample()).collect();
        for (a, b) in first.iter().zip(&second) {
            assert!((a - b).abs() < 1e-9);
        }
        assert!(first[0].abs() < 1e-12);
        assert!((first[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset() {
        let mut osc = Oscillator::new(Waveform::Sawtooth, 100.0, 1000.0);
        let start = osc.next_sample();
        osc.next_sample();
        osc.reset();
        assert_eq!(osc.next_sample(), start);
    }
}
