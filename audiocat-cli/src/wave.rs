use std::io::{self, Write};

use anyhow::{Context, Result};

use audiocat_core::processing::convert;
use audiocat_core::{AudioBackend, PlaybackStream, Sound, SynthParams, Waveform};

use crate::{Args, Container};

/// Synthesize `waveform`, then play it or write it to stdout.
pub fn run<B: AudioBackend>(backend: &B, args: &Args, waveform: Waveform) -> Result<()> {
    let frequency = args.frequency()?;
    let params = SynthParams {
        frequency,
        seconds: args.duration,
        volume: 1.0,
        sample_rate: args.sample_rate,
        fade_out: args.fade_out,
    };
    let sound = Sound::synthesize(waveform, params).with_context(|| format!("failed to generate {waveform}"))?;

    if args.play {
        log::info!(
            "playing generated {frequency} Hz {waveform} waveform at {} Hz for {} seconds",
            args.sample_rate,
            args.duration
        );
        let config = args.stream_configuration();
        let device = backend
            .open_playback(args.device.as_deref())
            .context("failed to open playback device")?;
        let mut stream = PlaybackStream::from_config(device, &config)?;
        sound.play(&mut stream, &config)?;
        return Ok(());
    }

    log::info!(
        "generating {frequency} Hz {waveform} waveform at {} Hz ({} seconds)",
        args.sample_rate,
        args.duration
    );
    let mut out = io::stdout().lock();
    match args.container {
        Container::Wav => sound.write_wav(&mut out, args.format)?,
        Container::Raw if args.reverse_endian => {
            let mut pcm = sound.to_pcm(args.format);
            let frames = pcm.len() / args.format.bytes_per_frame();
            convert::byteswap(&mut pcm, frames, args.format);
            out.write_all(&pcm)?;
            out.flush()?;
        }
        Container::Raw => {
            sound.write(&mut out, args.format)?;
        }
    }
    Ok(())
}
