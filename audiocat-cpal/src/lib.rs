//! # audiocat-cpal
//!
//! cpal backend for audiocat.
//!
//! Provides:
//! - `CpalCapture` — input stream feeding a pollable frame ring
//! - `CpalPlayback` — output stream draining a FIFO of device buffers
//! - `DeviceEnumerator` — device listing and lookup by name
//! - `CpalBackend` — the `AudioBackend` tying them together
//!
//! ## Usage
//! ```ignore
//! use audiocat_core::{CaptureConfiguration, CaptureSession};
//! use audiocat_cpal::CpalBackend;
//!
//! let backend = CpalBackend::new();
//! let mut capture = CaptureSession::open(&backend, &CaptureConfiguration::default())?;
//! ```

pub mod cpal_capture;
pub mod cpal_playback;
pub mod device_enumerator;
mod stream_config;

pub use cpal_capture::CpalCapture;
pub use cpal_playback::CpalPlayback;
pub use device_enumerator::DeviceEnumerator;

use audiocat_core::{AudioBackend, AudioDevice, AudioError, CaptureConfiguration};

/// Backend over the platform's default cpal host.
#[derive(Default)]
pub struct CpalBackend {
    enumerator: DeviceEnumerator,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioBackend for CpalBackend {
    type Capture = CpalCapture;
    type Playback = CpalPlayback;

    fn open_capture(&self, config: &CaptureConfiguration) -> Result<CpalCapture, AudioError> {
        let device = self.enumerator.input_device(config.device_name.as_deref())?;
        CpalCapture::open(device, config)
    }

    fn open_playback(&self, device_name: Option<&str>) -> Result<CpalPlayback, AudioError> {
        let device = self.enumerator.output_device(device_name)?;
        Ok(CpalPlayback::new(device))
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>, AudioError> {
        let mut devices = self.enumerator.list_capture_devices()?;
        devices.extend(self.enumerator.list_playback_devices()?);
        Ok(devices)
    }
}
