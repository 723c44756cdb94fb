use super::error::AudioError;
use super::format::SampleFormat;

/// Configuration for a playback session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfiguration {
    /// Playback sample rate in Hz (default: 44100).
    pub sample_rate: u32,

    /// Layout of the frames pushed into the stream (default: mono-i16).
    pub format: SampleFormat,

    /// Number of device buffers in the pool (default: 16).
    pub buffer_count: usize,

    /// Capacity of the staging region in frames (default: 2048).
    pub buffer_limit: usize,

    /// Frames that must be staged before they are pushed.
    /// `None` means one eighth of `buffer_limit`.
    pub low_watermark: Option<usize>,

    /// Byteswap each sample element before it is pushed.
    pub reverse_endian: bool,
}

impl StreamConfiguration {
    pub fn validate(&self) -> Result<(), AudioError> {
        if self.sample_rate == 0 {
            return Err(AudioError::InvalidConfiguration(
                "sample rate must be positive".into(),
            ));
        }
        if self.buffer_count == 0 {
            return Err(AudioError::InvalidConfiguration(
                "buffer count must be at least 1".into(),
            ));
        }
        if self.buffer_limit == 0 {
            return Err(AudioError::InvalidConfiguration(
                "buffer limit must be at least 1 frame".into(),
            ));
        }
        if let Some(mark) = self.low_watermark {
            if mark == 0 || mark > self.buffer_limit {
                return Err(AudioError::InvalidConfiguration(format!(
                    "low watermark {mark} must be within 1..={}",
                    self.buffer_limit
                )));
            }
        }
        Ok(())
    }

    /// Effective low watermark in frames, never below one.
    pub fn effective_low_watermark(&self) -> usize {
        self.low_watermark
            .unwrap_or(self.buffer_limit / 8)
            .clamp(1, self.buffer_limit.max(1))
    }
}

impl Default for StreamConfiguration {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            format: SampleFormat::MONO_I16,
            buffer_count: 16,
            buffer_limit: 2048,
            low_watermark: None,
            reverse_endian: false,
        }
    }
}

/// Configuration for a capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfiguration {
    /// Specific capture device name, or None for the system default.
    pub device_name: Option<String>,

    /// Capture sample rate in Hz (default: 44100).
    pub sample_rate: u32,

    /// Layout of the frames handed back by `pull` (default: mono-i16).
    pub format: SampleFormat,

    /// Capacity of the device-side ring in frames (default: one second).
    pub ring_capacity: usize,
}

impl CaptureConfiguration {
    pub fn validate(&self) -> Result<(), AudioError> {
        if self.sample_rate == 0 {
            return Err(AudioError::InvalidConfiguration(
                "sample rate must be positive".into(),
            ));
        }
        if self.ring_capacity == 0 {
            return Err(AudioError::InvalidConfiguration(
                "capture ring capacity must be at least 1 frame".into(),
            ));
        }
        Ok(())
    }
}

impl Default for CaptureConfiguration {
    fn default() -> Self {
        Self {
            device_name: None,
            sample_rate: 44100,
            format: SampleFormat::MONO_I16,
            ring_capacity: 44100,
        }
    }
}
