//! Sound sources: decoded WAV files and synthesized waveforms.
//!
//! Both variants boil down to an interleaved `f32` sample array plus a
//! channel count and sample rate. Everything else (playing, writing raw
//! PCM, printing) works from that array.

use std::io::{Cursor, Write};

use crate::models::config::StreamConfiguration;
use crate::models::error::AudioError;
use crate::models::format::SampleFormat;
use crate::processing::convert;
use crate::processing::wav_format::{self, WavContents};
use crate::session::flow::{self, PumpReport};
use crate::session::stream::PlaybackStream;
use crate::traits::playback_device::PlaybackDevice;

pub mod generators;

pub use generators::{SynthParams, Waveform};

#[derive(Debug, Clone, PartialEq)]
pub enum Sound {
    FromFile(WavContents),
    Synthesized {
        waveform: Waveform,
        params: SynthParams,
        samples: Vec<f32>,
    },
}

impl Sound {
    /// Run the generator for `waveform` and keep the result.
    pub fn synthesize(waveform: Waveform, params: SynthParams) -> Result<Self, AudioError> {
        let samples = generators::generate(waveform, &params)?;
        log::debug!(
            "generated {} samples of {waveform} at {} Hz",
            samples.len(),
            params.sample_rate
        );
        Ok(Self::Synthesized {
            waveform,
            params,
            samples,
        })
    }

    pub fn load<R: std::io::Read>(reader: &mut R) -> Result<Self, AudioError> {
        let wav = wav_format::load_wav(reader)?;
        log::debug!(
            "loaded {} frames ({} channels) at {} Hz",
            wav.frame_count(),
            wav.channels,
            wav.sample_rate
        );
        Ok(Self::FromFile(wav))
    }

    /// Interleaved normalized samples.
    pub fn samples(&self) -> &[f32] {
        match self {
            Self::FromFile(wav) => &wav.samples,
            Self::Synthesized { samples, .. } => samples,
        }
    }

    pub fn channels(&self) -> u16 {
        match self {
            Self::FromFile(wav) => wav.channels,
            Self::Synthesized { .. } => 1,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        match self {
            Self::FromFile(wav) => wav.sample_rate,
            Self::Synthesized { params, .. } => params.sample_rate,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.samples().len() / usize::from(self.channels().max(1))
    }

    pub fn seconds(&self) -> f64 {
        self.frame_count() as f64 / f64::from(self.sample_rate().max(1))
    }

    /// Samples remixed to `channels` interleaved channels.
    pub fn samples_for(&self, channels: u16) -> Vec<f32> {
        match (self.channels(), channels) {
            (from, to) if from == to => self.samples().to_vec(),
            (1, to) => convert::upmix_from_mono(self.samples(), usize::from(to)),
            (from, 1) => convert::downmix_to_mono(self.samples(), usize::from(from)),
            (from, to) => {
                let mono = convert::downmix_to_mono(self.samples(), usize::from(from));
                convert::upmix_from_mono(&mono, usize::from(to))
            }
        }
    }

    /// Encode as headerless native-endian PCM in `format`.
    pub fn to_pcm(&self, format: SampleFormat) -> Vec<u8> {
        convert::encode_from_f32(&self.samples_for(format.channels()), format)
    }

    /// Write headerless PCM. Returns the byte count.
    pub fn write<W: Write>(&self, writer: &mut W, format: SampleFormat) -> Result<usize, AudioError> {
        let data = self.to_pcm(format);
        writer.write_all(&data)?;
        writer.flush()?;
        Ok(data.len())
    }

    /// Write a complete WAV file.
    pub fn write_wav<W: Write>(&self, writer: &mut W, format: SampleFormat) -> Result<(), AudioError> {
        wav_format::save_wav(
            writer,
            &self.samples_for(format.channels()),
            self.sample_rate(),
            format,
        )
    }

    /// One `index: value` line per sample.
    pub fn print<W: Write>(&self, writer: &mut W) -> Result<(), AudioError> {
        for (index, sample) in self.samples().iter().enumerate() {
            writeln!(writer, "{index}: {sample}")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Stage the sound through `stream` and wait until it has played.
    ///
    /// Samples are converted to the stream's format. The stream's sample
    /// rate is used as is; no resampling happens.
    pub fn play<D: PlaybackDevice>(
        &self,
        stream: &mut PlaybackStream<D>,
        config: &StreamConfiguration,
    ) -> Result<PumpReport, AudioError> {
        if self.sample_rate() != stream.sample_rate() {
            log::warn!(
                "playing {} Hz sound on a {} Hz stream",
                self.sample_rate(),
                stream.sample_rate()
            );
        }
        let config = StreamConfiguration {
            sample_rate: stream.sample_rate(),
            format: stream.format(),
            reverse_endian: false,
            ..config.clone()
        };
        let mut pcm = Cursor::new(self.to_pcm(stream.format()));
        flow::pump(&mut pcm, stream, &config)
    }
}
