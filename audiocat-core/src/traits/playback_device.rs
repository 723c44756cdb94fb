use crate::models::audio_models::BufferHandle;
use crate::models::error::AudioError;
use crate::models::format::SampleFormat;
use crate::models::state::PlayState;

/// A native playback source with a FIFO queue of device buffers.
///
/// Opening the device creates the source; dropping it releases the source.
/// Buffers are generated and deleted explicitly by their owner. Every call
/// is synchronous and may fail with a device-specific code.
///
/// Implemented by:
/// - `CpalPlayback` (audiocat-cpal)
/// - the scripted mock used by the core's tests
pub trait PlaybackDevice {
    /// Allocate `count` native buffers.
    fn generate_buffers(&mut self, count: usize) -> Result<Vec<BufferHandle>, AudioError>;

    /// Release buffers previously returned by `generate_buffers`.
    fn delete_buffers(&mut self, handles: &[BufferHandle]) -> Result<(), AudioError>;

    /// Fill a buffer with raw interleaved PCM. The buffer must not be queued.
    fn buffer_data(
        &mut self,
        handle: BufferHandle,
        data: &[u8],
        format: SampleFormat,
        sample_rate: u32,
    ) -> Result<(), AudioError>;

    /// Append buffers to the source queue, in order.
    fn queue_buffers(&mut self, handles: &[BufferHandle]) -> Result<(), AudioError>;

    /// Remove `count` processed buffers from the front of the queue.
    ///
    /// Asking for more than `processed_buffers()` is a device error.
    fn unqueue_buffers(&mut self, count: usize) -> Result<Vec<BufferHandle>, AudioError>;

    /// Buffers currently attached to the source, processed ones included.
    fn queued_buffers(&self) -> Result<usize, AudioError>;

    /// Buffers the source has finished consuming but not yet unqueued.
    fn processed_buffers(&self) -> Result<usize, AudioError>;

    /// Start (or restart) consuming the queue.
    fn play(&mut self) -> Result<(), AudioError>;

    fn state(&self) -> Result<PlayState, AudioError>;
}
