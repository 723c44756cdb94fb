//! audiocat: pipe raw PCM audio between stdin/stdout and the sound system.
//!
//! Three modes:
//! - `--listen` captures from an input device and writes PCM (or text, or a
//!   Fourier histogram) to stdout.
//! - `--play` reads PCM from stdin (or a WAV file) and plays it.
//! - `--wave=KIND` synthesizes a waveform and writes it to stdout, or plays
//!   it together with `--play`.

mod listen;
mod play;
mod wave;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser, ValueEnum};

use audiocat_core::models::note::{frequency_for_note, note_for_name};
use audiocat_core::{AudioBackend, DeviceKind, SampleFormat, StreamConfiguration, Waveform};
use audiocat_cpal::CpalBackend;

#[derive(Parser, Debug)]
#[command(name = "audiocat", about = "Play, capture, and synthesize raw PCM audio", version)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .multiple(true)
        .args(["listen", "play", "wave", "list_devices"])
))]
pub struct Args {
    /// Capture audio and write it to stdout
    #[arg(long)]
    listen: bool,

    /// Play audio from stdin, a WAV file, or the generated waveform
    #[arg(long)]
    play: bool,

    /// Generate a waveform (sine, square, triangle, front-triangle,
    /// white-noise, split-noise)
    #[arg(long, value_name = "KIND")]
    wave: Option<Waveform>,

    /// List capture and playback devices
    #[arg(long)]
    list_devices: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Staging region size in frames
    #[arg(long, default_value_t = 2048)]
    buffer_limit: usize,

    /// Playback buffers in the pool
    #[arg(long, default_value_t = 4)]
    buffer_count: usize,

    #[arg(long, default_value_t = 44100)]
    sample_rate: u32,

    /// Sample format (mono-i8, mono-i16, mono-f32, stereo-i8, stereo-i16,
    /// stereo-f32)
    #[arg(long, default_value = "mono-i16")]
    format: SampleFormat,

    /// Byteswap samples read from stdin or written to stdout
    #[arg(long)]
    reverse_endian: bool,

    /// Waveform frequency in Hz
    #[arg(long, default_value_t = 440.0)]
    freq: f64,

    /// Waveform frequency as a note name, e.g. A5 or C#4 (overrides --freq)
    #[arg(long)]
    note: Option<String>,

    /// Seconds to listen or generate; 0 listens indefinitely
    #[arg(long, default_value_t = 0.0)]
    duration: f64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Binary)]
    output_format: OutputFormat,

    /// Frames per Fourier histogram line (power of two)
    #[arg(long, default_value_t = 4096)]
    fourier_width: usize,

    /// Write a JSON capture summary here after listening
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// WAV file to play instead of stdin
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Container for generated waveforms written to stdout
    #[arg(long, value_enum, default_value_t = Container::Raw)]
    container: Container,

    /// Fade generated split noise out to silence
    #[arg(long)]
    fade_out: bool,

    /// Device name (default: the system default device)
    #[arg(long, env = "AUDIOCAT_DEVICE")]
    device: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Binary,
    Text,
    FourierHistogram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Container {
    Raw,
    Wav,
}

impl Args {
    fn stream_configuration(&self) -> StreamConfiguration {
        StreamConfiguration {
            sample_rate: self.sample_rate,
            format: self.format,
            buffer_count: self.buffer_count,
            buffer_limit: self.buffer_limit,
            low_watermark: None,
            reverse_endian: self.reverse_endian,
        }
    }

    fn frequency(&self) -> Result<f64> {
        match &self.note {
            Some(name) => {
                let note = note_for_name(name)?;
                Ok(frequency_for_note(note)?)
            }
            None => Ok(self.freq),
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn list_devices(backend: &CpalBackend) -> Result<()> {
    let devices = backend.list_devices().context("failed to enumerate devices")?;
    for device in devices {
        let kind = match device.kind {
            DeviceKind::Capture => "capture",
            DeviceKind::Playback => "playback",
        };
        let marker = if device.is_default { "*" } else { " " };
        println!("{marker} {kind:<8} {}", device.name);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let backend = CpalBackend::new();

    if args.list_devices {
        list_devices(&backend)?;
    }

    if args.listen {
        listen::run(&backend, &args)
    } else if let Some(waveform) = args.wave {
        wave::run(&backend, &args, waveform)
    } else if args.play {
        play::run(&backend, &args)
    } else {
        Ok(())
    }
}
