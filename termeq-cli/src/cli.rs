//! Command-line argument parsing.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use termeq_core::EqSettings;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "termeq")]
#[command(about = "Capture, equalize, and visualize audio from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Capture live audio: draw the spectrum and write an equalized WAV
    Live(LiveArgs),
    /// Capture live audio straight to a WAV file, unprocessed
    Record(RecordArgs),
    /// Equalize an existing WAV file offline
    Process(ProcessArgs),
}

#[derive(Args, Debug)]
pub struct CaptureOpts {
    /// Sample rate in Hz
    #[arg(long, default_value_t = 44_100)]
    pub sample_rate: u32,

    /// Input channel count (only the first channel is analyzed)
    #[arg(long, default_value_t = 1)]
    pub channels: u16,

    /// Samples per block; must be a power of two
    #[arg(long, default_value_t = 256)]
    pub block_size: usize,

    /// Capture duration in seconds
    #[arg(long, default_value_t = 15)]
    pub duration: u64,
}

#[derive(Args, Debug)]
pub struct EqOpts {
    /// Gain for frequencies below 250 Hz
    #[arg(long)]
    pub bass: Option<f32>,

    /// Gain for frequencies from 250 Hz up to 4 kHz
    #[arg(long)]
    pub mid: Option<f32>,

    /// Gain for frequencies of 4 kHz and above
    #[arg(long)]
    pub treble: Option<f32>,

    /// JSON preset file with the three gains; explicit flags override it
    #[arg(long)]
    pub preset: Option<PathBuf>,
}

impl EqOpts {
    /// Settings from the preset file (or the defaults), with explicit
    /// gain flags applied on top.
    pub fn resolve(&self) -> Result<EqSettings> {
        let mut settings = match &self.preset {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("could not read preset {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("invalid preset {}", path.display()))?
            }
            None => EqSettings::default(),
        };

        if let Some(bass) = self.bass {
            settings.bass_gain = bass;
        }
        if let Some(mid) = self.mid {
            settings.mid_gain = mid;
        }
        if let Some(treble) = self.treble {
            settings.treble_gain = treble;
        }
        Ok(settings)
    }
}

#[derive(Args, Debug)]
pub struct DisplayOpts {
    /// Number of spectrum bars
    #[arg(long, default_value_t = 50)]
    pub bars: usize,

    /// Tallest bar, in characters
    #[arg(long, default_value_t = 30)]
    pub max_height: usize,
}

#[derive(Args, Debug)]
pub struct LiveArgs {
    #[command(flatten)]
    pub capture: CaptureOpts,

    #[command(flatten)]
    pub eq: EqOpts,

    #[command(flatten)]
    pub display: DisplayOpts,

    /// Output file for the equalized recording
    #[arg(short, long, default_value = "processed.wav")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    #[command(flatten)]
    pub capture: CaptureOpts,

    /// Output file for the raw recording
    #[arg(short, long, default_value = "recording.wav")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Input WAV file
    pub input: PathBuf,

    #[command(flatten)]
    pub eq: EqOpts,

    /// Samples per block; must be a power of two
    #[arg(long, default_value_t = 256)]
    pub block_size: usize,

    /// Output file for the equalized audio
    #[arg(short, long, default_value = "processed.wav")]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_gain_flags_override_the_defaults() {
        let opts = EqOpts {
            bass: Some(2.0),
            mid: None,
            treble: Some(0.0),
            preset: None,
        };

        let settings = opts.resolve().unwrap();

        assert_eq!(settings.bass_gain, 2.0);
        assert_eq!(settings.mid_gain, 1.0);
        assert_eq!(settings.treble_gain, 0.0);
    }

    #[test]
    fn preset_file_supplies_missing_gains() {
        let path = std::env::temp_dir().join(format!("termeq-{}-preset.json", std::process::id()));
        std::fs::write(&path, r#"{ "bass_gain": 0.5, "treble_gain": 2.5 }"#).unwrap();

        let opts = EqOpts {
            bass: None,
            mid: Some(0.25),
            treble: None,
            preset: Some(path.clone()),
        };

        let settings = opts.resolve().unwrap();

        assert_eq!(settings.bass_gain, 0.5);
        assert_eq!(settings.mid_gain, 0.25);
        assert_eq!(settings.treble_gain, 2.5);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn command_line_parses() {
        let cli =
            Cli::try_parse_from(["termeq", "live", "--duration", "5", "--bass", "2.0"]).unwrap();

        match cli.command {
            Command::Live(args) => {
                assert_eq!(args.capture.duration, 5);
                assert_eq!(args.eq.bass, Some(2.0));
                assert_eq!(args.display.bars, 50);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
