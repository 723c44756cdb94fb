use crate::models::audio_models::AudioDevice;
use crate::models::config::CaptureConfiguration;
use crate::models::error::AudioError;

use super::capture_device::CaptureDevice;
use super::playback_device::PlaybackDevice;

/// Entry point into a platform audio API.
pub trait AudioBackend {
    type Capture: CaptureDevice;
    type Playback: PlaybackDevice;

    /// Open (but do not start) the configured capture device.
    fn open_capture(&self, config: &CaptureConfiguration) -> Result<Self::Capture, AudioError>;

    /// Open a playback source on the named device, or the default one.
    fn open_playback(&self, device_name: Option<&str>) -> Result<Self::Playback, AudioError>;

    fn list_devices(&self) -> Result<Vec<AudioDevice>, AudioError>;
}
