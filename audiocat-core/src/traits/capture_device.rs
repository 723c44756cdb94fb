use crate::models::error::AudioError;
use crate::models::format::SampleFormat;

/// A native capture device exposing a pollable count of buffered frames.
///
/// The device fills an internal ring on its own; callers poll
/// `available_frames` and drain with `read_frames`. Closing is dropping.
pub trait CaptureDevice {
    fn start(&mut self) -> Result<(), AudioError>;

    fn stop(&mut self) -> Result<(), AudioError>;

    /// Frames buffered by the device and ready to read.
    fn available_frames(&self) -> Result<usize, AudioError>;

    /// Copy exactly `frames` buffered frames into the front of `out`.
    ///
    /// `frames` must not exceed `available_frames()` and `out` must hold at
    /// least `frames * format().bytes_per_frame()` bytes.
    fn read_frames(&mut self, out: &mut [u8], frames: usize) -> Result<(), AudioError>;

    /// Layout of the frames returned by `read_frames`.
    fn format(&self) -> SampleFormat;
}
