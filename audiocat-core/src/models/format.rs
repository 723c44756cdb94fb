use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::AudioError;

/// Platform format code for 8-bit mono PCM.
pub const FORMAT_MONO8: u32 = 0x1100;
/// Platform format code for 16-bit mono PCM.
pub const FORMAT_MONO16: u32 = 0x1101;
/// Platform format code for 8-bit stereo PCM.
pub const FORMAT_STEREO8: u32 = 0x1102;
/// Platform format code for 16-bit stereo PCM.
pub const FORMAT_STEREO16: u32 = 0x1103;
/// Platform format code for 32-bit float mono.
pub const FORMAT_MONO_FLOAT32: u32 = 0x10010;
/// Platform format code for 32-bit float stereo.
pub const FORMAT_STEREO_FLOAT32: u32 = 0x10011;

/// Layout of one interleaved PCM frame.
///
/// Only the six layouts in [`SampleFormat::ALL`] can be constructed:
/// mono or stereo, 8/16-bit integer or 32-bit float. 8-bit samples are
/// stored unsigned (WAV convention), 16-bit samples signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SampleFormat {
    channels: u16,
    bits_per_sample: u16,
    is_float: bool,
}

impl SampleFormat {
    pub const MONO_I8: Self = Self::raw(1, 8, false);
    pub const STEREO_I8: Self = Self::raw(2, 8, false);
    pub const MONO_I16: Self = Self::raw(1, 16, false);
    pub const STEREO_I16: Self = Self::raw(2, 16, false);
    pub const MONO_F32: Self = Self::raw(1, 32, true);
    pub const STEREO_F32: Self = Self::raw(2, 32, true);

    pub const ALL: [Self; 6] = [
        Self::MONO_I8,
        Self::STEREO_I8,
        Self::MONO_I16,
        Self::STEREO_I16,
        Self::MONO_F32,
        Self::STEREO_F32,
    ];

    const fn raw(channels: u16, bits_per_sample: u16, is_float: bool) -> Self {
        Self {
            channels,
            bits_per_sample,
            is_float,
        }
    }

    /// Builds a format from its parts, rejecting combinations outside the
    /// supported set (e.g. 16-bit float or 32-bit integer).
    pub fn new(channels: u16, bits_per_sample: u16, is_float: bool) -> Result<Self, AudioError> {
        let format = Self::raw(channels, bits_per_sample, is_float);
        if Self::ALL.contains(&format) {
            Ok(format)
        } else {
            Err(AudioError::InvalidFormat(format!(
                "{channels} channel(s), {bits_per_sample}-bit{}",
                if is_float { " float" } else { "" }
            )))
        }
    }

    /// Looks up a format by its command-line name (`mono-i16`, `stereo-f32`, ...).
    pub fn from_name(name: &str) -> Result<Self, AudioError> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| AudioError::InvalidFormat(format!("unknown format name: {name}")))
    }

    /// Looks up a format by its platform format code.
    pub fn from_code(code: u32) -> Result<Self, AudioError> {
        Self::ALL
            .into_iter()
            .find(|f| f.code() == code)
            .ok_or_else(|| AudioError::InvalidFormat(format!("unknown format code: {code:#x}")))
    }

    pub fn name(&self) -> &'static str {
        match (self.channels, self.bits_per_sample) {
            (1, 8) => "mono-i8",
            (2, 8) => "stereo-i8",
            (1, 16) => "mono-i16",
            (2, 16) => "stereo-i16",
            (1, _) => "mono-f32",
            _ => "stereo-f32",
        }
    }

    pub fn code(&self) -> u32 {
        match (self.channels, self.bits_per_sample) {
            (1, 8) => FORMAT_MONO8,
            (2, 8) => FORMAT_STEREO8,
            (1, 16) => FORMAT_MONO16,
            (2, 16) => FORMAT_STEREO16,
            (1, _) => FORMAT_MONO_FLOAT32,
            _ => FORMAT_STEREO_FLOAT32,
        }
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    pub fn is_float(&self) -> bool {
        self.is_float
    }

    pub fn is_stereo(&self) -> bool {
        self.channels == 2
    }

    /// Size of a single sample element (one channel of one frame).
    pub fn bytes_per_sample(&self) -> usize {
        usize::from(self.bits_per_sample / 8)
    }

    /// `channels * bits_per_sample / 8`.
    pub fn bytes_per_frame(&self) -> usize {
        usize::from(self.channels) * self.bytes_per_sample()
    }

    /// Same sample encoding with a different channel count.
    pub fn with_channels(&self, channels: u16) -> Result<Self, AudioError> {
        Self::new(channels, self.bits_per_sample, self.is_float)
    }
}

impl Default for SampleFormat {
    fn default() -> Self {
        Self::MONO_I16
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleFormat {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl TryFrom<String> for SampleFormat {
    type Error = AudioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_name(&value)
    }
}

impl From<SampleFormat> for String {
    fn from(format: SampleFormat) -> Self {
        format.name().to_string()
    }
}

/// Free-function spelling of [`SampleFormat::bytes_per_frame`].
pub fn bytes_per_frame(format: SampleFormat) -> usize {
    format.bytes_per_frame()
}

/// Free-function spelling of [`SampleFormat::from_name`].
pub fn format_for_name(name: &str) -> Result<SampleFormat, AudioError> {
    SampleFormat::from_name(name)
}

/// Free-function spelling of [`SampleFormat::name`].
pub fn name_for_format(format: SampleFormat) -> &'static str {
    format.name()
}
