//! morse - encode text to Morse audio and decode it back
//!
//! This is the main entry point for the Morse codec command-line tool

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;

use morse_audio::prelude::*;
use morse_codecs::prelude::*;
use morse_tools::{
    detect_signals, init_logging, read_wav, to_notation, write_wav, DetectorConfig, GlobalConfig,
    MorseConfig,
};

/// Morse code encoder, synthesizer and decoder
#[derive(Parser)]
#[command(name = "morse")]
#[command(about = "Morse code encoding, audio synthesis and decoding")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode text to a WAV file
    Encode(EncodeArgs),
    /// Print the element timing of a text
    Timing(TimingCommandArgs),
    /// Decode signals from a WAV or JSON file
    Decode(DecodeArgs),
    /// Write the default configuration to a file
    Config(ConfigArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Radio,
    Telegraph,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum WaveformArg {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl From<WaveformArg> for Waveform {
    fn from(arg: WaveformArg) -> Self {
        match arg {
            WaveformArg::Sine => Waveform::Sine,
            WaveformArg::Square => Waveform::Square,
            WaveformArg::Sawtooth => Waveform::Sawtooth,
            WaveformArg::Triangle => Waveform::Triangle,
        }
    }
}

/// Text and timing overrides shared by `encode` and `timing`
#[derive(Args, Clone)]
struct TimingArgs {
    /// Text to encode; `[...]` sends a prosign
    text: String,

    /// Speed in words per minute
    #[arg(long)]
    wpm: Option<u32>,

    /// Word gap multiplier
    #[arg(long)]
    word_gap: Option<f64>,

    /// Timing humanization (0.0-1.0)
    #[arg(long)]
    humanize: Option<f64>,

    /// Seed for humanization; 0 draws from entropy
    #[arg(long)]
    seed: Option<u32>,
}

#[derive(Parser, Clone)]
struct TimingCommandArgs {
    #[command(flatten)]
    timing: TimingArgs,

    /// Print dot/dash notation instead of JSON
    #[arg(long)]
    notation: bool,
}

#[derive(Parser, Clone)]
struct EncodeArgs {
    #[command(flatten)]
    timing: TimingArgs,

    /// Output WAV file
    #[arg(short, long)]
    output: PathBuf,

    /// Sound model
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Radio tone frequency in Hz
    #[arg(long)]
    freq: Option<f64>,

    /// Radio tone waveform
    #[arg(long, value_enum)]
    waveform: Option<WaveformArg>,

    /// Sample rate in Hz
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Output volume (0.0-1.0)
    #[arg(long)]
    volume: Option<f64>,
}

#[derive(Parser, Clone)]
struct DecodeArgs {
    /// Input WAV file, or a JSON array of `{on, seconds}` signals
    input: PathBuf,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Clone)]
struct ConfigArgs {
    /// Output file; `.json` writes JSON, anything else TOML
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.global);

    let config = match &cli.global.config {
        Some(path) => MorseConfig::from_file(path)?,
        None => MorseConfig::default(),
    };

    match cli.command {
        Commands::Encode(args) => encode_command(config, &args),
        Commands::Timing(args) => timing_command(config, &args),
        Commands::Decode(args) => decode_command(config, &args),
        Commands::Config(args) => {
            config.save_to_file(&args.output)?;
            println!("Configuration written to {:?}", args.output);
            Ok(())
        }
    }
}

fn timing_params(mut params: TimingParams, args: &TimingArgs) -> Result<TimingParams> {
    if let Some(wpm) = args.wpm {
        params.wpm = wpm;
    }
    if let Some(word_gap) = args.word_gap {
        params.word_gap_multiplier = word_gap;
    }
    if let Some(humanize) = args.humanize {
        params.humanization_factor = humanize;
    }
    if let Some(seed) = args.seed {
        params.random_seed = seed;
    }
    params.validate().context("Invalid timing options")?;
    Ok(params)
}

fn audio_params(mut params: AudioParams, args: &EncodeArgs) -> Result<AudioParams> {
    match args.mode {
        Some(ModeArg::Radio) if !matches!(params.sound, SoundModel::Radio(_)) => {
            params.sound = SoundModel::Radio(RadioParams::default());
        }
        Some(ModeArg::Telegraph) if !matches!(params.sound, SoundModel::Telegraph(_)) => {
            params.sound = SoundModel::Telegraph(TelegraphParams::default());
        }
        _ => {}
    }

    if let SoundModel::Radio(radio) = &mut params.sound {
        if let Some(freq) = args.freq {
            radio.tone_freq_hz = freq;
        }
        if let Some(waveform) = args.waveform {
            radio.waveform = waveform.into();
        }
    }
    if let Some(sample_rate) = args.sample_rate {
        params.sample_rate = sample_rate;
    }
    if let Some(volume) = args.volume {
        params.volume = volume;
    }

    params.validate().context("Invalid audio options")?;
    Ok(params)
}

fn encode_command(config: MorseConfig, args: &EncodeArgs) -> Result<()> {
    let timing = timing_params(config.timing, &args.timing)?;
    let audio = audio_params(config.audio, args)?;

    let elements = encode(&args.timing.text, &timing);
    info!(
        "Encoded {} elements at {} WPM, {} mode",
        elements.len(),
        timing.wpm,
        audio.sound.name()
    );

    let buffer = synthesize_buffer(&elements, &audio)?;
    write_wav(&buffer, &args.output)?;

    println!(
        "Wrote {:.2} s of audio ({} samples) to {:?}",
        buffer.duration_seconds(),
        buffer.len(),
        args.output
    );
    Ok(())
}

fn timing_command(config: MorseConfig, args: &TimingCommandArgs) -> Result<()> {
    let timing = timing_params(config.timing, &args.timing)?;
    let elements = encode(&args.timing.text, &timing);

    if args.notation {
        println!("{}", to_notation(&elements, timing.dot_duration()));
    } else {
        println!("{}", serde_json::to_string_pretty(&elements)?);
    }
    Ok(())
}

fn decode_command(config: MorseConfig, args: &DecodeArgs) -> Result<()> {
    config
        .interpret
        .validate()
        .context("Invalid interpret options")?;

    let signals = load_signals(&args.input)?;
    info!("Decoding {} signals from {:?}", signals.len(), args.input);

    let result = decode(&signals, &config.interpret);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.text);
        info!(
            "Confidence {:.2}: {} of {} signals used, {} characters recognized",
            result.confidence,
            result.signals_processed,
            signals.len(),
            result.patterns_recognized
        );
    }
    Ok(())
}

fn load_signals(path: &Path) -> Result<Vec<Signal>> {
    let is_wav = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));

    if is_wav {
        let buffer = read_wav(path)?;
        return detect_signals(&buffer, &DetectorConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read signal file: {:?}", path))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse signal file: {:?}", path))
}
