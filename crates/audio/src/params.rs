//! Audio rendering parameters

use crate::{AudioError, Result};
use serde::{Deserialize, Serialize};

pub const MAX_SAMPLE_RATE: u32 = 192_000;
pub const MAX_TONE_FREQ_HZ: f64 = 20_000.0;

/// Oscillator shape for radio mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Continuous-wave receiver tone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioParams {
    pub tone_freq_hz: f64,
    pub waveform: Waveform,
    /// White noise level mixed into tones and gaps, 0..1
    pub background_static_level: f64,
}

impl Default for RadioParams {
    fn default() -> Self {
        Self {
            tone_freq_hz: 440.0,
            waveform: Waveform::Sine,
            background_static_level: 0.0,
        }
    }
}

/// Mechanical sounder model
///
/// Level-like fields are clamped to `[0, 1]` when rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegraphParams {
    /// 0 = soft, slow-attack click; 1 = hard, instant click
    pub click_sharpness: f64,
    pub resonance_freq_hz: f64,
    /// Exponential decay rate of the click body, per second
    pub decay_rate: f64,
    /// Click-to-click pitch jitter, up to 5% at 1.0
    pub mechanical_noise: f64,
    /// How strongly the resonance frequency lengthens the decay
    pub solenoid_response: f64,
    pub room_tone_level: f64,
    pub reverb_amount: f64,
}

impl Default for TelegraphParams {
    fn default() -> Self {
        Self {
            click_sharpness: 0.5,
            resonance_freq_hz: 800.0,
            decay_rate: 10.0,
            mechanical_noise: 0.1,
            solenoid_response: 0.7,
            room_tone_level: 0.05,
            reverb_amount: 0.3,
        }
    }
}

/// Sound model with its mode-specific settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SoundModel {
    Radio(RadioParams),
    Telegraph(TelegraphParams),
}

impl Default for SoundModel {
    fn default() -> Self {
        SoundModel::Radio(RadioParams::default())
    }
}

impl SoundModel {
    pub fn name(&self) -> &'static str {
        match self {
            SoundModel::Radio(_) => "radio",
            SoundModel::Telegraph(_) => "telegraph",
        }
    }
}

/// Synthesis configuration shared by both sound models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioParams {
    pub sample_rate: u32,
    /// Output gain, clamped to `[0, 1]`
    pub volume: f64,
    pub low_pass_cutoff: f64,
    pub high_pass_cutoff: f64,
    pub sound: SoundModel,
}

impl Default for AudioParams {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            volume: 0.5,
            low_pass_cutoff: 20_000.0,
            high_pass_cutoff: 20.0,
            sound: SoundModel::default(),
        }
    }
}

impl AudioParams {
    pub fn radio(radio: RadioParams) -> Self {
        Self {
            sound: SoundModel::Radio(radio),
            ..Self::default()
        }
    }

    pub fn telegraph(telegraph: TelegraphParams) -> Self {
        Self {
            sound: SoundModel::Telegraph(telegraph),
            ..Self::default()
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Check the settings that make rendering impossible.
    ///
    /// Out-of-range levels are not errors; they are clamped when used.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 || self.sample_rate > MAX_SAMPLE_RATE {
            return Err(AudioError::InvalidSampleRate {
                rate: self.sample_rate,
            });
        }
        if let SoundModel::Radio(radio) = &self.sound {
            let freq = radio.tone_freq_hz;
            if !(freq > 0.0 && freq <= MAX_TONE_FREQ_HZ) {
                return Err(AudioError::InvalidFrequency { freq });
            }
        }
        Ok(())
    }

    /// Volume clamped to `[0, 1]`; NaN counts as silence
    pub fn clamped_volume(&self) -> f64 {
        if self.volume.is_nan() {
            0.0
        } else {
            self.volume.clamp(0.0, 1.0)
        }
    }

    /// Samples occupied by an element of `seconds` duration
    pub fn samples_for(&self, seconds: f64) -> usize {
        if seconds.is_finite() && seconds > 0.0 {
            (seconds * self.sample_rate as f64).round() as usize
        } else {
            0
        }
    }
}

/// Clamp a level-like setting into `[0, 1]`
pub(crate) fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
