//! Audio device enumeration through the default cpal host.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};

use audiocat_core::{AudioDevice, AudioError, DeviceKind};

/// Lists and looks up capture and playback devices by name.
pub struct DeviceEnumerator {
    host: Host,
}

impl DeviceEnumerator {
    pub fn new() -> Self {
        let host = cpal::default_host();
        log::debug!("using audio host {:?}", host.id());
        Self { host }
    }

    /// List capture (input) devices.
    pub fn list_capture_devices(&self) -> Result<Vec<AudioDevice>, AudioError> {
        let devices = self
            .host
            .input_devices()
            .map_err(|e| AudioError::device("input_devices", e.to_string()))?;
        let default = self.host.default_input_device().and_then(|d| d.name().ok());
        Ok(describe(device_names(devices), default.as_deref(), DeviceKind::Capture))
    }

    /// List playback (output) devices.
    pub fn list_playback_devices(&self) -> Result<Vec<AudioDevice>, AudioError> {
        let devices = self
            .host
            .output_devices()
            .map_err(|e| AudioError::device("output_devices", e.to_string()))?;
        let default = self.host.default_output_device().and_then(|d| d.name().ok());
        Ok(describe(device_names(devices), default.as_deref(), DeviceKind::Playback))
    }

    /// The named input device, or the default one.
    pub fn input_device(&self, name: Option<&str>) -> Result<Device, AudioError> {
        match name {
            None => self
                .host
                .default_input_device()
                .ok_or_else(|| AudioError::DeviceNotAvailable("no default capture device".into())),
            Some(name) => {
                let mut devices = self
                    .host
                    .input_devices()
                    .map_err(|e| AudioError::device("input_devices", e.to_string()))?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| AudioError::DeviceNotAvailable(name.to_string()))
            }
        }
    }

    /// The named output device, or the default one.
    pub fn output_device(&self, name: Option<&str>) -> Result<Device, AudioError> {
        match name {
            None => self
                .host
                .default_output_device()
                .ok_or_else(|| AudioError::DeviceNotAvailable("no default playback device".into())),
            Some(name) => {
                let mut devices = self
                    .host
                    .output_devices()
                    .map_err(|e| AudioError::device("output_devices", e.to_string()))?;
                devices
                    .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                    .ok_or_else(|| AudioError::DeviceNotAvailable(name.to_string()))
            }
        }
    }
}

impl Default for DeviceEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

fn device_names(devices: impl Iterator<Item = Device>) -> Vec<String> {
    devices
        .filter_map(|d| match d.name() {
            Ok(name) => Some(name),
            Err(e) => {
                log::warn!("skipping unnamed device: {e}");
                None
            }
        })
        .collect()
}

/// Build device records, flagging the first one named like the default.
fn describe(names: Vec<String>, default: Option<&str>, kind: DeviceKind) -> Vec<AudioDevice> {
    let mut default_seen = false;
    names
        .into_iter()
        .map(|name| {
            let is_default = !default_seen && Some(name.as_str()) == default;
            default_seen |= is_default;
            AudioDevice {
                name,
                kind,
                is_default,
            }
        })
        .collect()
}
