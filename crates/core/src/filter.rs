//! Digital filter implementations

use crate::{CoreError, Result};
use std::f64::consts::{PI, SQRT_2};

/// Generic filter trait
pub trait Filter<T: Copy> {
    /// Process a single sample
    fn process_sample(&mut self, input: T) -> T;

    /// Process a buffer of samples
    fn process_buffer(&mut self, input: &[T], output: &mut [T]) -> Result<()> {
        if input.len() != output.len() {
            return Err(CoreError::BufferSizeMismatch {
                expected: input.len(),
                actual: output.len(),
            });
        }

        for (out, sample) in output.iter_mut().zip(input) {
            *out = self.process_sample(*sample);
        }

        Ok(())
    }

    /// Reset the filter state
    fn reset(&mut self);
}

/// Highest usable cutoff as a fraction of the sample rate
const MAX_CUTOFF_RATIO: f64 = 0.49;

/// Cutoffs at or below this are treated as "no high-pass"
const MIN_HIGHPASS_HZ: f64 = 1.0;

/// Second-order IIR section (direct form I)
///
/// Coefficients are normalised so that `a0 == 1`. A bypassed section passes
/// its input through unchanged.
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl Biquad {
    /// Identity section
    pub fn bypass() -> Self {
        Self::from_coefficients(1.0, 0.0, 0.0, 0.0, 0.0)
    }

    fn from_coefficients(b0: f64, b1: f64, b2: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0,
            b1,
            b2,
            a1,
            a2,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Butterworth (Q = 1/sqrt 2) low-pass
    ///
    /// Falls back to [`Biquad::bypass`] when the cutoff is not positive or
    /// sits too close to Nyquist to be useful.
    pub fn butterworth_lowpass(cutoff_hz: f64, sample_rate: f64) -> Self {
        if !Self::usable(cutoff_hz, sample_rate) || cutoff_hz <= 0.0 {
            return Self::bypass();
        }

        let (cos_w, alpha) = Self::prewarp(cutoff_hz, sample_rate);
        let norm = 1.0 + alpha;
        Self::from_coefficients(
            (1.0 - cos_w) / (2.0 * norm),
            (1.0 - cos_w) / norm,
            (1.0 - cos_w) / (2.0 * norm),
            (-2.0 * cos_w) / norm,
            (1.0 - alpha) / norm,
        )
    }

    /// Butterworth (Q = 1/sqrt 2) high-pass
    ///
    /// Cutoffs at or below 1 Hz are below the audible band and bypass the
    /// section, as do cutoffs too close to Nyquist.
    pub fn butterworth_highpass(cutoff_hz: f64, sample_rate: f64) -> Self {
        if !Self::usable(cutoff_hz, sample_rate) || cutoff_hz <= MIN_HIGHPASS_HZ {
            return Self::bypass();
        }

        let (cos_w, alpha) = Self::prewarp(cutoff_hz, sample_rate);
        let norm = 1.0 + alpha;
        Self::from_coefficients(
            (1.0 + cos_w) / (2.0 * norm),
            -(1.0 + cos_w) / norm,
            (1.0 + cos_w) / (2.0 * norm),
            (-2.0 * cos_w) / norm,
            (1.0 - alpha) / norm,
        )
    }

    fn usable(cutoff_hz: f64, sample_rate: f64) -> bool {
        cutoff_hz.is_finite()
            && sample_rate.is_finite()
            && sample_rate > 0.0
            && cutoff_hz < sample_rate * MAX_CUTOFF_RATIO
    }

    fn prewarp(cutoff_hz: f64, sample_rate: f64) -> (f64, f64) {
        let w = 2.0 * PI * cutoff_hz / sample_rate;
        (w.cos(), w.sin() / SQRT_2)
    }

    pub fn is_bypass(&self) -> bool {
        self.b0 == 1.0 && self.b1 == 0.0 && self.b2 == 0.0 && self.a1 == 0.0 && self.a2 == 0.0
    }
}

impl Filter<f64> for Biquad {
    fn process_sample(&mut self, input: f64) -> f64 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// First-order low-pass smoother: `y += alpha * (x - y)`
#[derive(Debug, Clone)]
pub struct OnePole {
    alpha: f64,
    state: f64,
}

impl OnePole {
    /// Create from a raw smoothing coefficient.
    ///
    /// The coefficient is clamped to `(0, 1]`; NaN passes input through.
    pub fn with_alpha(alpha: f64) -> Self {
        let alpha = if alpha.is_nan() {
            1.0
        } else {
            alpha.clamp(f64::MIN_POSITIVE, 1.0)
        };
        Self { alpha, state: 0.0 }
    }

    /// RC low-pass with the given cutoff
    pub fn lowpass(cutoff_freq: f64, sample_rate: f64) -> Result<Self> {
        if sample_rate <= 0.0 {
            return Err(CoreError::InvalidSampleRate { rate: sample_rate });
        }
        if cutoff_freq <= 0.0 || cutoff_freq >= sample_rate / 2.0 {
            return Err(CoreError::InvalidFilterParameters {
                msg: format!("Invalid cutoff frequency: {}", cutoff_freq),
            });
        }

        let rc = 1.0 / (2.0 * PI * cutoff_freq);
        let dt = 1.0 / sample_rate;
        Ok(Self::with_alpha(dt / (rc + dt)))
    }
}

impl Filter<f64> for OnePole {
    fn process_sample(&mut self, input: f64) -> f64 {
        self.state += self.alpha * (input - self.state);
        self.state
    }

    fn reset(&mut self) {
        self.state = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rms(samples: &[f64]) -> f64 {
        (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
    }

    fn sine(freq: f64, sample_rate: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_bypass_is_identity() {
        let mut filter = Biquad::bypass();
        for x in [0.5, -0.25, 1.0, 0.0] {
            assert_eq!(filter.process_sample(x), x);
        }
    }

    #[test]
    fn test_out_of_range_cutoffs_bypass() {
        assert!(Biquad::butterworth_lowpass(20000.0, 8000.0).is_bypass());
        assert!(Biquad::butterworth_lowpass(0.0, 8000.0).is_bypass());
        assert!(Biquad::butterworth_lowpass(f64::NAN, 8000.0).is_bypass());
        assert!(Biquad::butterworth_highpass(0.5, 8000.0).is_bypass());
        assert!(Biquad::butterworth_highpass(5000.0, 8000.0).is_bypass());
        assert!(!Biquad::butterworth_highpass(20.0, 44100.0).is_bypass());
        assert!(!Biquad::butterworth_lowpass(3000.0, 44100.0).is_bypass());
    }

    #[test]
    fn test_lowpass_attenuates_high_frequencies() {
        let sample_rate = 48000.0;
        let mut filter = Biquad::butterworth_lowpass(1000.0, sample_rate);
        let input = sine(10000.0, sample_rate, 4800);
        let mut output = vec![0.0; input.len()];
        filter.process_buffer(&input, &mut output).unwrap();
        assert!(rms(&output[480..]) < 0.05 * rms(&input[480..]));
    }

    #[test]
    fn test_highpass_removes_dc() {
        let mut filter = Biquad::butterworth_highpass(100.0, 8000.0);
        let mut last = 1.0;
        for _ in 0..8000 {
            last = filter.process_sample(1.0);
        }
        assert!(last.abs() < 1e-3);
    }

    #[test]
    fn test_passband_preserved() {
        let sample_rate = 44100.0;
        let mut filter = Biquad::butterworth_lowpass(5000.0, sample_rate);
        let input = sine(440.0, sample_rate, 4410);
        let output: Vec<f64> = input.iter().map(|&x| filter.process_sample(x)).collect();
        let ratio = rms(&output[441..]) / rms(&input[441..]);
        assert!((ratio - 1.0).abs() < 0.05, "gain {}", ratio);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut filter = Biquad::butterworth_lowpass(1000.0, 8000.0);
        let first = filter.process_sample(1.0);
        filter.process_sample(0.3);
        filter.reset();
        assert_eq!(filter.process_sample(1.0), first);
    }

    #[test]
    fn test_buffer_size_mismatch() {
        let mut filter = Biquad::bypass();
        let err = filter.process_buffer(&[1.0, 2.0], &mut [0.0]).unwrap_err();
        assert_eq!(
            err,
            CoreError::BufferSizeMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_one_pole_converges() {
        let mut smoother = OnePole::lowpass(50.0, 8000.0).unwrap();
        let mut y = 0.0;
        for _ in 0..8000 {
            y = smoother.process_sample(1.0);
        }
        assert!((y - 1.0).abs() < 1e-6);
        assert!(OnePole::lowpass(5000.0, 8000.0).is_err());
    }

    #[test]
    fn test_one_pole_coefficient_clamped() {
        let mut passthrough = OnePole::with_alpha(f64::NAN);
        assert_eq!(passthrough.process_sample(0.7), 0.7);
        let mut full = OnePole::with_alpha(4.0);
        assert_eq!(full.process_sample(-0.3), -0.3);
        let mut frozen = OnePole::with_alpha(-1.0);
        assert!(frozen.process_sample(1.0).abs() < 1e-300);
    }
}
