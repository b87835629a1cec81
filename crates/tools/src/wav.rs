//! WAV file input and output

use anyhow::{bail, Context, Result};
use morse_core::buffer::SampleBuffer;
use std::path::Path;
use tracing::info;

const PCM_SCALE: f32 = 32767.0;

/// Convert a float sample to 16-bit PCM, saturating outside `[-1, 1]`
pub fn to_pcm(sample: f32) -> i16 {
    (sample * PCM_SCALE)
        .round()
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Write a mono 16-bit PCM WAV file
pub fn write_wav(buffer: &SampleBuffer<f32>, path: &Path) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {:?}", path))?;

    for &sample in buffer.data() {
        writer.write_sample(to_pcm(sample))?;
    }

    writer.finalize()?;
    info!("Wrote {} samples to {:?}", buffer.len(), path);
    Ok(())
}

/// Read a WAV file as mono floats; multi-channel input is averaged
pub fn read_wav(path: &Path) -> Result<SampleBuffer<f32>> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file: {:?}", path))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                bail!("Unsupported bit depth: {}", spec.bits_per_sample);
            }
            let scale = ((1u64 << (spec.bits_per_sample - 1)) - 1) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .context("Failed to read audio samples")?
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .context("Failed to read audio samples")?,
    };

    let channels = spec.channels.max(1) as usize;
    let mono: Vec<f32> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    info!("Read {} samples from {:?}", mono.len(), path);
    SampleBuffer::from_data(mono, spec.sample_rate).context("Invalid WAV sample rate")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use tempfile::Builder;

    #[test]
    fn test_pcm_conversion() {
        assert_eq!(to_pcm(0.0), 0);
        assert_eq!(to_pcm(1.0), 32767);
        assert_eq!(to_pcm(-1.0), -32767);
        assert_eq!(to_pcm(0.5), 16384);
        assert_eq!(to_pcm(4.0), i16::MAX);
        assert_eq!(to_pcm(-4.0), i16::MIN);
    }

    #[quickcheck]
    fn pcm_is_monotonic(a: i16, b: i16) -> bool {
        let (x, y) = (a as f32 / 20000.0, b as f32 / 20000.0);
        if x <= y {
            to_pcm(x) <= to_pcm(y)
        } else {
            to_pcm(x) >= to_pcm(y)
        }
    }

    #[test]
    fn test_wav_round_trip() {
        let file = Builder::new().suffix(".wav").tempfile().unwrap();
        let samples = vec![0.0f32, 0.25, -0.5, 1.0, -1.0];
        let buffer = SampleBuffer::from_data(samples.clone(), 8000).unwrap();
        write_wav(&buffer, file.path()).unwrap();

        let loaded = read_wav(file.path()).unwrap();
        assert_eq!(loaded.sample_rate(), 8000);
        assert_eq!(loaded.len(), samples.len());
        for (a, b) in loaded.data().iter().zip(&samples) {
            assert!((a - b).abs() < 1e-4, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_stereo_is_averaged() {
        let file = Builder::new().suffix(".wav").tempfile().unwrap();
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(file.path(), spec).unwrap();
        for _ in 0..4 {
            writer.write_sample(32767i16).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let loaded = read_wav(file.path()).unwrap();
        assert_eq!(loaded.len(), 4);
        assert!(loaded.data().iter().all(|&s| (s - 0.5).abs() < 1e-4));
    }

    #[test]
    fn test_missing_file() {
        assert!(read_wav(Path::new("/nonexistent/input.wav")).is_err());
    }
}
