//! # audiocat-core
//!
//! Platform-agnostic buffered audio I/O engine.
//!
//! Provides the sample format model, a polling capture session, a playback
//! stream over a fixed buffer pool, the staging policy that feeds it, sound
//! sources, WAV I/O and capture summaries. Platform backends (cpal) implement
//! the device traits and plug into the generic sessions.
//!
//! ## Architecture
//!
//! ```text
//! audiocat-core (this crate)
//! ├── traits/       ← PlaybackDevice, CaptureDevice, AudioBackend
//! ├── models/       ← AudioError, SampleFormat, configurations, notes, states
//! ├── processing/   ← sample conversion, RingBuffer, WAV container, Fourier histogram
//! ├── session/      ← CaptureSession, PlaybackStream, staging pump
//! ├── sound/        ← Sound (file or synthesized), waveform generators
//! └── storage/      ← ChecksumWriter, capture summary sidecar
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod sound;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{AudioDevice, BufferHandle, DeviceKind};
pub use models::capture_summary::CaptureSummary;
pub use models::config::{CaptureConfiguration, StreamConfiguration};
pub use models::error::AudioError;
pub use models::format::{bytes_per_frame, format_for_name, name_for_format, SampleFormat};
pub use models::state::{BufferState, PlayState};
pub use processing::ring_buffer::RingBuffer;
pub use processing::wav_format::{WavContents, WavLoop};
pub use session::capture::CaptureSession;
pub use session::flow::{pump, PumpReport, StagingRegion};
pub use session::stream::PlaybackStream;
pub use session::POLL_INTERVAL;
pub use sound::{Sound, SynthParams, Waveform};
pub use storage::checksum_writer::ChecksumWriter;
pub use traits::backend::AudioBackend;
pub use traits::capture_device::CaptureDevice;
pub use traits::playback_device::PlaybackDevice;
