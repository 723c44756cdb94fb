//! Playback through a cpal output stream, exposed as a buffer queue.
//!
//! cpal pulls audio from a callback. [`CpalPlayback`] turns that into the
//! queued-buffer model of [`PlaybackDevice`]: filled buffers wait in a FIFO,
//! the output callback drains them in order, and each finished buffer is
//! parked as processed until its owner unqueues it.
//!
//! ```text
//! buffer_data ─▶ [stored] ─queue_buffers─▶ [pending] ─callback─▶ [processed] ─unqueue─▶ owner
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SizedSample, Stream, StreamConfig};
use parking_lot::Mutex;

use audiocat_core::processing::convert;
use audiocat_core::{AudioError, BufferHandle, PlayState, PlaybackDevice, SampleFormat};

use crate::stream_config;

#[derive(Debug, Default)]
struct StoredBuffer {
    samples: Vec<f32>,
    channels: usize,
}

/// State shared between the owner and the output callback.
#[derive(Debug, Default)]
pub(crate) struct PlaybackQueue {
    stored: HashMap<BufferHandle, StoredBuffer>,
    pending: VecDeque<BufferHandle>,
    /// Next sample of the front pending buffer.
    cursor: usize,
    processed: VecDeque<BufferHandle>,
    state: PlayState,
    next_handle: u32,
}

impl PlaybackQueue {
    fn is_queued(&self, handle: BufferHandle) -> bool {
        self.pending.contains(&handle) || self.processed.contains(&handle)
    }

    /// Fill `out` (interleaved, `out_channels` wide) from the pending buffers.
    ///
    /// Finished buffers move to processed. Once nothing is pending the
    /// source stops and the rest of `out` is silence.
    pub(crate) fn render(&mut self, out: &mut [f32], out_channels: usize) {
        let mut frames = out.chunks_exact_mut(out_channels.max(1));
        if self.state.is_playing() {
            'fill: for frame in frames.by_ref() {
                loop {
                    let Some(&front) = self.pending.front() else {
                        self.state = PlayState::Stopped;
                        frame.fill(0.0);
                        break 'fill;
                    };
                    let buffer = self.stored.get(&front);
                    let channels = buffer.map_or(1, |b| b.channels.max(1));
                    let remaining = buffer.map_or(0, |b| b.samples.len().saturating_sub(self.cursor));
                    if remaining < channels {
                        self.pending.pop_front();
                        self.processed.push_back(front);
                        self.cursor = 0;
                        continue;
                    }
                    if let Some(buffer) = buffer {
                        let source = &buffer.samples[self.cursor..self.cursor + channels];
                        remix_frame(source, frame);
                    }
                    self.cursor += channels;
                    break;
                }
            }
        }
        for frame in frames {
            frame.fill(0.0);
        }
        // a buffer whose last frame was just played is finished
        while let Some(&front) = self.pending.front() {
            let done = self
                .stored
                .get(&front)
                .map_or(true, |b| self.cursor >= b.samples.len());
            if !done {
                break;
            }
            self.pending.pop_front();
            self.processed.push_back(front);
            self.cursor = 0;
        }
        if self.pending.is_empty() && self.state.is_playing() {
            self.state = PlayState::Stopped;
        }
    }
}

/// Map one source frame onto one output frame.
fn remix_frame(source: &[f32], out: &mut [f32]) {
    match (source.len(), out.len()) {
        (a, b) if a == b => out.copy_from_slice(source),
        (1, _) => out.fill(source[0]),
        (_, 1) => out[0] = source.iter().sum::<f32>() / source.len() as f32,
        _ => {
            let shared = source.len().min(out.len());
            out[..shared].copy_from_slice(&source[..shared]);
            out[shared..].fill(0.0);
        }
    }
}

/// A cpal output device driven through [`PlaybackDevice`].
///
/// The output stream is built on the first `play` call, at the sample rate
/// of the most recently filled buffer.
pub struct CpalPlayback {
    device: Device,
    queue: Arc<Mutex<PlaybackQueue>>,
    stream: Option<Stream>,
    stream_rate: Option<u32>,
    sample_rate: u32,
    channels: u16,
}

impl CpalPlayback {
    pub fn new(device: Device) -> Self {
        Self {
            device,
            queue: Arc::new(Mutex::new(PlaybackQueue::default())),
            stream: None,
            stream_rate: None,
            sample_rate: 44100,
            channels: 2,
        }
    }

    fn open_stream(&mut self) -> Result<Stream, AudioError> {
        let ranges: Vec<_> = self
            .device
            .supported_output_configs()
            .map_err(|e| AudioError::device("supported_output_configs", e.to_string()))?
            .collect();
        let supported = stream_config::select(ranges, self.channels, self.sample_rate, "play")?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        let stream = match sample_format {
            cpal::SampleFormat::F32 => self.build_stream::<f32>(&config)?,
            cpal::SampleFormat::I16 => self.build_stream::<i16>(&config)?,
            cpal::SampleFormat::U16 => self.build_stream::<u16>(&config)?,
            other => {
                return Err(AudioError::device(
                    "play",
                    format!("unsupported sample type {other:?}"),
                ))
            }
        };
        self.stream_rate = Some(self.sample_rate);
        Ok(stream)
    }

    fn build_stream<T>(&self, config: &StreamConfig) -> Result<Stream, AudioError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        let queue = Arc::clone(&self.queue);
        let out_channels = usize::from(config.channels);
        let mut scratch: Vec<f32> = Vec::new();

        self.device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    scratch.resize(data.len(), 0.0);
                    queue.lock().render(&mut scratch, out_channels);
                    for (out, &sample) in data.iter_mut().zip(scratch.iter()) {
                        *out = T::from_sample(sample);
                    }
                },
                move |err| {
                    log::error!("playback stream error: {err}");
                },
                None,
            )
            .map_err(|e| AudioError::device("build_output_stream", e.to_string()))
    }
}

impl PlaybackDevice for CpalPlayback {
    fn generate_buffers(&mut self, count: usize) -> Result<Vec<BufferHandle>, AudioError> {
        let mut queue = self.queue.lock();
        let handles: Vec<BufferHandle> = (0..count)
            .map(|_| {
                queue.next_handle += 1;
                BufferHandle(queue.next_handle)
            })
            .collect();
        for &handle in &handles {
            queue.stored.insert(handle, StoredBuffer::default());
        }
        Ok(handles)
    }

    fn delete_buffers(&mut self, handles: &[BufferHandle]) -> Result<(), AudioError> {
        let mut queue = self.queue.lock();
        for &handle in handles {
            if queue.is_queued(handle) {
                // the stream is going away with it; nothing else plays it
                queue.pending.retain(|&h| h != handle);
                queue.processed.retain(|&h| h != handle);
            }
            if queue.stored.remove(&handle).is_none() {
                return Err(AudioError::device(
                    "delete_buffers",
                    format!("unknown buffer {}", handle.0),
                ));
            }
        }
        Ok(())
    }

    fn buffer_data(
        &mut self,
        handle: BufferHandle,
        data: &[u8],
        format: SampleFormat,
        sample_rate: u32,
    ) -> Result<(), AudioError> {
        let mut queue = self.queue.lock();
        if queue.is_queued(handle) {
            return Err(AudioError::device(
                "buffer_data",
                format!("buffer {} is queued", handle.0),
            ));
        }
        let stored = queue.stored.get_mut(&handle).ok_or_else(|| {
            AudioError::device("buffer_data", format!("unknown buffer {}", handle.0))
        })?;
        stored.samples = convert::decode_to_f32(data, format);
        stored.channels = usize::from(format.channels());
        drop(queue);

        if let Some(rate) = self.stream_rate.filter(|&r| r != sample_rate) {
            log::warn!("buffer at {sample_rate} Hz queued on a {rate} Hz stream");
        }
        self.sample_rate = sample_rate;
        self.channels = format.channels();
        Ok(())
    }

    fn queue_buffers(&mut self, handles: &[BufferHandle]) -> Result<(), AudioError> {
        let mut queue = self.queue.lock();
        for &handle in handles {
            if !queue.stored.contains_key(&handle) || queue.is_queued(handle) {
                return Err(AudioError::device(
                    "queue_buffers",
                    format!("buffer {} cannot be queued", handle.0),
                ));
            }
            queue.pending.push_back(handle);
        }
        Ok(())
    }

    fn unqueue_buffers(&mut self, count: usize) -> Result<Vec<BufferHandle>, AudioError> {
        let mut queue = self.queue.lock();
        if count > queue.processed.len() {
            return Err(AudioError::device(
                "unqueue_buffers",
                format!("{count} requested, {} processed", queue.processed.len()),
            ));
        }
        Ok(queue.processed.drain(..count).collect())
    }

    fn queued_buffers(&self) -> Result<usize, AudioError> {
        let queue = self.queue.lock();
        Ok(queue.pending.len() + queue.processed.len())
    }

    fn processed_buffers(&self) -> Result<usize, AudioError> {
        Ok(self.queue.lock().processed.len())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if self.stream.is_none() {
            let stream = self.open_stream()?;
            stream
                .play()
                .map_err(|e| AudioError::device("play", e.to_string()))?;
            self.stream = Some(stream);
        }
        self.queue.lock().state = PlayState::Playing;
        Ok(())
    }

    fn state(&self) -> Result<PlayState, AudioError> {
        Ok(self.queue.lock().state)
    }
}
