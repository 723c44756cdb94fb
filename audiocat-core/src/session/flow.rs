//! Staging between a byte source and a [`PlaybackStream`].
//!
//! Input is accumulated in a [`StagingRegion`] of `buffer_limit` frames.
//! As soon as the low watermark is reached the staged frames are pushed as
//! one buffer; at end of input whatever is left is pushed regardless and the
//! stream is drained.

use std::io::{ErrorKind, Read};

use crate::models::config::StreamConfiguration;
use crate::models::error::AudioError;
use crate::models::format::SampleFormat;
use crate::processing::convert;
use crate::traits::playback_device::PlaybackDevice;

use super::stream::PlaybackStream;

/// Caller-side byte buffer that collects whole frames from a reader.
///
/// Partial frames at the tail of a read are kept and completed by the next
/// read.
#[derive(Debug)]
pub struct StagingRegion {
    data: Vec<u8>,
    filled: usize,
    bytes_per_frame: usize,
}

impl StagingRegion {
    pub fn new(limit_frames: usize, format: SampleFormat) -> Self {
        let bytes_per_frame = format.bytes_per_frame();
        Self {
            data: vec![0; limit_frames * bytes_per_frame],
            filled: 0,
            bytes_per_frame,
        }
    }

    /// Whole frames currently staged.
    pub fn frames(&self) -> usize {
        self.filled / self.bytes_per_frame
    }

    pub fn capacity_frames(&self) -> usize {
        self.data.len() / self.bytes_per_frame
    }

    pub fn is_full(&self) -> bool {
        self.filled == self.data.len()
    }

    /// Read once into the free tail. Returns the byte count, 0 at end of input.
    pub fn fill_from<R: Read>(&mut self, reader: &mut R) -> Result<usize, AudioError> {
        loop {
            match reader.read(&mut self.data[self.filled..]) {
                Ok(n) => {
                    self.filled += n;
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// The staged whole frames, mutable so they can be byteswapped in place.
    pub fn staged_mut(&mut self) -> &mut [u8] {
        let len = self.frames() * self.bytes_per_frame;
        &mut self.data[..len]
    }

    /// Drop the staged whole frames, keeping any trailing partial frame.
    pub fn consume_frames(&mut self) {
        let len = self.frames() * self.bytes_per_frame;
        self.data.copy_within(len..self.filled, 0);
        self.filled -= len;
    }

    /// Bytes of an incomplete trailing frame.
    pub fn partial_bytes(&self) -> usize {
        self.filled % self.bytes_per_frame
    }
}

/// Totals from one [`pump`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PumpReport {
    pub frames_submitted: u64,
    pub pushes: usize,
}

/// Feed `reader` into `stream` until end of input, then wait for playback
/// to finish.
pub fn pump<R, D>(
    reader: &mut R,
    stream: &mut PlaybackStream<D>,
    config: &StreamConfiguration,
) -> Result<PumpReport, AudioError>
where
    R: Read,
    D: PlaybackDevice,
{
    config.validate()?;
    if config.format != stream.format() {
        return Err(AudioError::InvalidConfiguration(format!(
            "staging {} frames into a {} stream",
            config.format,
            stream.format()
        )));
    }

    let low_watermark = config.effective_low_watermark();
    let mut region = StagingRegion::new(config.buffer_limit, config.format);
    let mut report = PumpReport::default();
    log::debug!(
        "pumping {} frames per stage, low watermark {low_watermark}",
        region.capacity_frames()
    );

    loop {
        let read = region.fill_from(reader)?;
        if read == 0 {
            break;
        }
        if region.frames() >= low_watermark {
            submit(&mut region, stream, config, &mut report)?;
        }
    }

    if region.frames() > 0 {
        submit(&mut region, stream, config, &mut report)?;
    }
    if region.partial_bytes() > 0 {
        log::warn!(
            "input ended mid-frame, dropping {} trailing bytes",
            region.partial_bytes()
        );
    }

    stream.wait()?;
    log::info!(
        "played {} frames in {} buffers",
        report.frames_submitted,
        report.pushes
    );
    Ok(report)
}

fn submit<D: PlaybackDevice>(
    region: &mut StagingRegion,
    stream: &mut PlaybackStream<D>,
    config: &StreamConfiguration,
    report: &mut PumpReport,
) -> Result<(), AudioError> {
    let frames = region.frames();
    let staged = region.staged_mut();
    if config.reverse_endian {
        convert::byteswap(staged, frames, config.format);
    }
    stream.push(staged, frames)?;
    region.consume_frames();
    report.frames_submitted += frames as u64;
    report.pushes += 1;
    Ok(())
}
