//! Capture through a cpal input stream, exposed as a pollable ring.
//!
//! The input callback converts whatever the device delivers into the
//! requested [`SampleFormat`] and appends it to a byte ring. When the ring is
//! full the oldest frames are overwritten; nothing reports the loss.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SizedSample, Stream, StreamConfig};
use parking_lot::Mutex;

use audiocat_core::processing::convert;
use audiocat_core::{AudioError, CaptureConfiguration, CaptureDevice, RingBuffer, SampleFormat};

use crate::stream_config;

/// A cpal input device polled through [`CaptureDevice`].
pub struct CpalCapture {
    device: Device,
    config: StreamConfig,
    device_format: cpal::SampleFormat,
    format: SampleFormat,
    ring: Arc<Mutex<RingBuffer<u8>>>,
    stream: Option<Stream>,
}

impl CpalCapture {
    /// Prepare `device` for capture at the configured rate. Capture does
    /// not begin until [`CaptureDevice::start`].
    pub fn open(device: Device, config: &CaptureConfiguration) -> Result<Self, AudioError> {
        let ranges: Vec<_> = device
            .supported_input_configs()
            .map_err(|e| AudioError::device("supported_input_configs", e.to_string()))?
            .collect();
        let supported = stream_config::select(
            ranges,
            config.format.channels(),
            config.sample_rate,
            "open_capture",
        )?;

        let bytes_per_frame = config.format.bytes_per_frame();
        let name = device.name().unwrap_or_else(|_| "unknown".into());
        log::info!(
            "capture device {name}: {} channels, {:?}",
            supported.channels(),
            supported.sample_format()
        );

        Ok(Self {
            device,
            device_format: supported.sample_format(),
            config: supported.into(),
            format: config.format,
            ring: Arc::new(Mutex::new(RingBuffer::new(config.ring_capacity * bytes_per_frame))),
            stream: None,
        })
    }

    fn build_stream<T>(&self) -> Result<Stream, AudioError>
    where
        T: SizedSample + Send + 'static,
        f32: FromSample<T>,
    {
        let ring = Arc::clone(&self.ring);
        let device_channels = usize::from(self.config.channels);
        let format = self.format;
        let mut scratch: Vec<f32> = Vec::new();

        self.device
            .build_input_stream(
                &self.config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    scratch.clear();
                    scratch.extend(data.iter().map(|&s| <f32 as Sample>::from_sample(s)));
                    deliver(&ring, &scratch, device_channels, format);
                },
                move |err| {
                    log::error!("capture stream error: {err}");
                },
                None,
            )
            .map_err(|e| AudioError::device("build_input_stream", e.to_string()))
    }
}

/// Remix device samples to `format`, encode them and append to the ring.
pub(crate) fn deliver(
    ring: &Mutex<RingBuffer<u8>>,
    samples: &[f32],
    device_channels: usize,
    format: SampleFormat,
) {
    let target = usize::from(format.channels());
    let bytes = if device_channels == target {
        convert::encode_from_f32(samples, format)
    } else {
        let mono = convert::downmix_to_mono(samples, device_channels);
        convert::encode_from_f32(&convert::upmix_from_mono(&mono, target), format)
    };
    ring.lock().write(&bytes);
}

impl CaptureDevice for CpalCapture {
    fn start(&mut self) -> Result<(), AudioError> {
        if self.stream.is_some() {
            return Ok(());
        }
        let stream = match self.device_format {
            cpal::SampleFormat::F32 => self.build_stream::<f32>()?,
            cpal::SampleFormat::I16 => self.build_stream::<i16>()?,
            cpal::SampleFormat::U16 => self.build_stream::<u16>()?,
            other => {
                return Err(AudioError::device(
                    "start_capture",
                    format!("unsupported sample type {other:?}"),
                ))
            }
        };
        stream
            .play()
            .map_err(|e| AudioError::device("start_capture", e.to_string()))?;
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        if let Some(stream) = self.stream.take() {
            stream
                .pause()
                .map_err(|e| AudioError::device("stop_capture", e.to_string()))?;
        }
        Ok(())
    }

    fn available_frames(&self) -> Result<usize, AudioError> {
        Ok(self.ring.lock().count() / self.format.bytes_per_frame())
    }

    fn read_frames(&mut self, out: &mut [u8], frames: usize) -> Result<(), AudioError> {
        let len = frames * self.format.bytes_per_frame();
        if out.len() < len {
            return Err(AudioError::device("read_frames", "output buffer too small"));
        }
        let mut ring = self.ring.lock();
        if ring.count() < len {
            return Err(AudioError::device(
                "read_frames",
                format!("{frames} frames requested, {} available", ring.count() / self.format.bytes_per_frame()),
            ));
        }
        ring.read_into(&mut out[..len]);
        Ok(())
    }

    fn format(&self) -> SampleFormat {
        self.format
    }
}
