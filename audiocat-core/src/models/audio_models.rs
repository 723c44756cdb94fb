use serde::{Deserialize, Serialize};

/// Direction of an audio device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Capture,
    Playback,
}

/// An audio device available for capture or playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioDevice {
    pub name: String,
    pub kind: DeviceKind,
    pub is_default: bool,
}

/// Opaque handle to one native playback buffer.
///
/// Only meaningful to the device that generated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u32);
