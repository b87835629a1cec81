//! Configuration management for the morse tool

use crate::common::{load_config, save_config};
use anyhow::{Context, Result};
use morse_audio::params::AudioParams;
use morse_codecs::interpret::InterpretParams;
use morse_codecs::timing::TimingParams;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Every tunable of the encoder, synthesizer and decoder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorseConfig {
    pub timing: TimingParams,
    pub audio: AudioParams,
    pub interpret: InterpretParams,
}

impl MorseConfig {
    /// Load configuration from a TOML or JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: Self = load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration; `.json` files get JSON, anything else TOML
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        save_config(self, path)
    }

    pub fn validate(&self) -> Result<()> {
        self.timing.validate().context("Invalid timing section")?;
        self.audio.validate().context("Invalid audio section")?;
        self.interpret
            .validate()
            .context("Invalid interpret section")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morse_audio::params::{SoundModel, TelegraphParams};
    use tempfile::{Builder, NamedTempFile};

    fn temp_with_suffix(suffix: &str) -> NamedTempFile {
        Builder::new().suffix(suffix).tempfile().unwrap()
    }

    fn sample() -> MorseConfig {
        MorseConfig {
            timing: TimingParams {
                wpm: 25,
                humanization_factor: 0.2,
                random_seed: 42,
                ..TimingParams::default()
            },
            audio: AudioParams::telegraph(TelegraphParams {
                reverb_amount: 0.5,
                ..TelegraphParams::default()
            }),
            interpret: InterpretParams::default(),
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let temp_file = temp_with_suffix(".toml");
        let config = sample();
        config.save_to_file(temp_file.path()).unwrap();

        let text = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(text.contains("mode = \"telegraph\""));

        let loaded = MorseConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_json_round_trip() {
        let temp_file = temp_with_suffix(".json");
        let config = sample();
        config.save_to_file(temp_file.path()).unwrap();
        let loaded = MorseConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_file = temp_with_suffix(".toml");
        std::fs::write(temp_file.path(), "[timing]\nwpm = 30\n").unwrap();
        let loaded = MorseConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.timing.wpm, 30);
        assert_eq!(loaded.timing.word_gap_multiplier, 1.0);
        assert_eq!(loaded.audio, AudioParams::default());
        assert!(matches!(loaded.audio.sound, SoundModel::Radio(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_file = temp_with_suffix(".json");
        std::fs::write(temp_file.path(), r#"{"timing":{"wpm":0}}"#).unwrap();
        let err = MorseConfig::from_file(temp_file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("timing"));
    }
}
