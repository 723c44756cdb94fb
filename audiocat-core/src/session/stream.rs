use std::collections::{HashMap, VecDeque};
use std::thread;

use crate::models::audio_models::BufferHandle;
use crate::models::config::StreamConfiguration;
use crate::models::error::AudioError;
use crate::models::format::SampleFormat;
use crate::models::state::BufferState;
use crate::traits::playback_device::PlaybackDevice;

use super::{logged, POLL_INTERVAL};

/// One slot of the pool: the native handle plus the bytes last handed to it.
#[derive(Debug)]
struct PooledBuffer {
    handle: BufferHandle,
    data: Vec<u8>,
    state: BufferState,
}

/// Continuous playback through a fixed pool of device buffers.
///
/// Data flow:
/// ```text
/// push ─▶ [free buffer] ─buffer_data─▶ queue_buffers ─▶ device
///   ▲                                                     │
///   └──────── reclaim ◀── unqueue_buffers ◀── processed ──┘
/// ```
///
/// Buffers are addressed by their index in the pool; native handles never
/// leave this type. The pool is allocated once and every buffer is always
/// either free or queued. When no buffer is free, `push` blocks until the
/// device finishes one, which back-pressures the caller.
pub struct PlaybackStream<D: PlaybackDevice> {
    device: D,
    sample_rate: u32,
    format: SampleFormat,
    buffers: Vec<PooledBuffer>,
    free: Vec<usize>,
    queued: VecDeque<usize>,
    index_of: HashMap<BufferHandle, usize>,
}

impl<D: PlaybackDevice> PlaybackStream<D> {
    pub fn new(
        mut device: D,
        sample_rate: u32,
        format: SampleFormat,
        buffer_count: usize,
    ) -> Result<Self, AudioError> {
        if buffer_count == 0 {
            return Err(AudioError::InvalidConfiguration(
                "buffer count must be at least 1".into(),
            ));
        }
        if sample_rate == 0 {
            return Err(AudioError::InvalidConfiguration(
                "sample rate must be positive".into(),
            ));
        }

        let handles = logged(device.generate_buffers(buffer_count))?;
        if handles.len() != buffer_count {
            if let Err(e) = device.delete_buffers(&handles) {
                log::error!("failed to release short buffer allocation: {e}");
            }
            return logged(Err(AudioError::device(
                "generate_buffers",
                format!("asked for {buffer_count} buffers, got {}", handles.len()),
            )));
        }

        let buffers: Vec<PooledBuffer> = handles
            .iter()
            .map(|&handle| PooledBuffer {
                handle,
                data: Vec::new(),
                state: BufferState::Free,
            })
            .collect();
        let index_of = handles.iter().enumerate().map(|(i, &h)| (h, i)).collect();

        log::debug!("playback stream: {buffer_count} buffers, {format} at {sample_rate} Hz");
        Ok(Self {
            device,
            sample_rate,
            format,
            free: (0..buffer_count).rev().collect(),
            queued: VecDeque::with_capacity(buffer_count),
            buffers,
            index_of,
        })
    }

    pub fn from_config(device: D, config: &StreamConfiguration) -> Result<Self, AudioError> {
        config.validate()?;
        Self::new(device, config.sample_rate, config.format, config.buffer_count)
    }

    /// Copy `frame_count` frames from `frames` into a free buffer and queue it.
    ///
    /// Blocks while every buffer is queued. Restarts the device if it has
    /// gone idle. A failed submission leaves the buffer free and the frames
    /// are dropped.
    pub fn push(&mut self, frames: &[u8], frame_count: usize) -> Result<(), AudioError> {
        let len = frame_count * self.format.bytes_per_frame();
        if frames.len() < len {
            return Err(AudioError::InvalidConfiguration(format!(
                "{frame_count} frames need {len} bytes, got {}",
                frames.len()
            )));
        }

        if self.free.is_empty() {
            self.wait_for_free(1)?;
        } else {
            self.reclaim()?;
        }

        let index = self
            .free
            .pop()
            .ok_or_else(|| AudioError::InvalidConfiguration("buffer pool is empty".into()))?;
        let buffer = &mut self.buffers[index];
        buffer.data.clear();
        buffer.data.extend_from_slice(&frames[..len]);

        let submitted = self
            .device
            .buffer_data(buffer.handle, &buffer.data, self.format, self.sample_rate)
            .and_then(|()| self.device.queue_buffers(&[buffer.handle]));
        if let Err(e) = submitted {
            self.free.push(index);
            return logged(Err(e));
        }
        buffer.state = BufferState::Queued;
        self.queued.push_back(index);

        if !logged(self.device.state())?.is_playing() {
            log::debug!("starting playback ({} buffers queued)", self.queued.len());
            logged(self.device.play())?;
        }
        Ok(())
    }

    /// Like [`push`](Self::push), counted in samples instead of frames.
    pub fn push_samples(&mut self, samples: &[u8], sample_count: usize) -> Result<(), AudioError> {
        self.push(samples, sample_count / usize::from(self.format.channels()))
    }

    /// Take back every buffer the device has finished with. Never blocks.
    pub fn reclaim(&mut self) -> Result<usize, AudioError> {
        let processed = logged(self.device.processed_buffers())?;
        if processed == 0 {
            return Ok(0);
        }
        let handles = logged(self.device.unqueue_buffers(processed))?;
        for handle in &handles {
            let index = *self.index_of.get(handle).ok_or_else(|| {
                AudioError::device("unqueue_buffers", format!("unknown buffer {}", handle.0))
            })?;
            if let Some(at) = self.queued.iter().position(|&i| i == index) {
                self.queued.remove(at);
            }
            let buffer = &mut self.buffers[index];
            if buffer.state.is_queued() {
                buffer.state = BufferState::Free;
                self.free.push(index);
            }
        }
        Ok(handles.len())
    }

    /// Block until the device has consumed everything queued.
    pub fn wait(&mut self) -> Result<(), AudioError> {
        self.wait_for_free(self.buffers.len())
    }

    fn wait_for_free(&mut self, wanted: usize) -> Result<(), AudioError> {
        loop {
            self.reclaim()?;
            if self.free.len() >= wanted {
                return Ok(());
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn queued_count(&self) -> usize {
        self.queued.len()
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<D: PlaybackDevice> Drop for PlaybackStream<D> {
    fn drop(&mut self) {
        if !self.queued.is_empty() {
            log::warn!("dropping playback stream with {} buffers in flight", self.queued.len());
        }
        let handles: Vec<BufferHandle> = self.buffers.iter().map(|b| b.handle).collect();
        if let Err(e) = self.device.delete_buffers(&handles) {
            log::error!("failed to release playback buffers: {e}");
        }
    }
}
