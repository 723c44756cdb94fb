pub mod backend;
pub mod capture_device;
pub mod playback_device;
