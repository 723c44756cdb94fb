use std::fs::File;
use std::io::{self, BufReader};

use anyhow::{Context, Result};

use audiocat_core::{pump, AudioBackend, PlaybackStream, Sound};

use crate::Args;

/// Play a WAV file given with `--file`, otherwise raw PCM from stdin.
pub fn run<B: AudioBackend>(backend: &B, args: &Args) -> Result<()> {
    let config = args.stream_configuration();
    let device = backend
        .open_playback(args.device.as_deref())
        .context("failed to open playback device")?;

    match &args.file {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            let sound = Sound::load(&mut BufReader::new(file))
                .with_context(|| format!("failed to load {}", path.display()))?;
            log::info!(
                "playing {} ({} channels, {:.2} seconds at {} Hz)",
                path.display(),
                sound.channels(),
                sound.seconds(),
                sound.sample_rate()
            );
            // the stream takes the file's rate so nothing plays at the wrong pitch
            let mut stream = PlaybackStream::new(
                device,
                sound.sample_rate(),
                args.format,
                config.buffer_count,
            )?;
            sound.play(&mut stream, &config)?;
        }
        None => {
            log::info!(
                "playing {} data at {} Hz from stdin",
                config.format,
                config.sample_rate
            );
            let mut stream = PlaybackStream::from_config(device, &config)?;
            let report = pump(&mut io::stdin().lock(), &mut stream, &config)?;
            log::debug!("{} pushes", report.pushes);
        }
    }
    Ok(())
}
