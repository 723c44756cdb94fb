use std::thread;

use crate::models::config::CaptureConfiguration;
use crate::models::error::AudioError;
use crate::models::format::SampleFormat;
use crate::traits::backend::AudioBackend;
use crate::traits::capture_device::CaptureDevice;

use super::{logged, POLL_INTERVAL};

/// An open, running capture device.
///
/// Capture starts when the session is opened and stops when it is dropped,
/// including when the caller bails out early with an error.
pub struct CaptureSession<D: CaptureDevice> {
    device: D,
    format: SampleFormat,
    sample_rate: u32,
}

impl<D: CaptureDevice> CaptureSession<D> {
    /// Open the configured device through `backend` and start capturing.
    pub fn open<B>(backend: &B, config: &CaptureConfiguration) -> Result<Self, AudioError>
    where
        B: AudioBackend<Capture = D>,
    {
        config.validate()?;
        let device = logged(backend.open_capture(config))?;
        Self::start(device, config.sample_rate)
    }

    /// Start an already opened device. On failure the device is dropped
    /// without being stopped.
    pub fn start(mut device: D, sample_rate: u32) -> Result<Self, AudioError> {
        logged(device.start())?;
        let format = device.format();
        log::info!("capture started: {format} at {sample_rate} Hz");
        Ok(Self {
            device,
            format,
            sample_rate,
        })
    }

    pub fn format(&self) -> SampleFormat {
        self.format
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Read up to `max_frames` frames into `out`.
    ///
    /// Non-blocking pulls return whatever the device had buffered, possibly
    /// nothing, and never more than fits in `out`. Blocking pulls keep
    /// polling until exactly `max_frames` frames have been delivered; there
    /// is no timeout, and `out` must hold all of them.
    pub fn pull(&mut self, out: &mut [u8], max_frames: usize, blocking: bool) -> Result<usize, AudioError> {
        let bytes_per_frame = self.format.bytes_per_frame();
        let max_frames = if blocking {
            max_frames
        } else {
            max_frames.min(out.len() / bytes_per_frame)
        };
        if out.len() < max_frames * bytes_per_frame {
            return Err(AudioError::InvalidConfiguration(format!(
                "output buffer holds {} bytes, {} frames need {}",
                out.len(),
                max_frames,
                max_frames * bytes_per_frame
            )));
        }

        let mut frames_read = 0;
        while frames_read < max_frames {
            let available = logged(self.device.available_frames())?;
            let take = available.min(max_frames - frames_read);
            if take > 0 {
                let offset = frames_read * bytes_per_frame;
                logged(self.device.read_frames(&mut out[offset..], take))?;
                frames_read += take;
            }

            if !blocking {
                break;
            }
            if frames_read < max_frames {
                thread::sleep(POLL_INTERVAL);
            }
        }
        Ok(frames_read)
    }

    /// Like [`pull`](Self::pull), counted in samples instead of frames.
    pub fn pull_samples(&mut self, out: &mut [u8], max_samples: usize, blocking: bool) -> Result<usize, AudioError> {
        let channels = usize::from(self.format.channels());
        let frames = self.pull(out, max_samples / channels, blocking)?;
        Ok(frames * channels)
    }
}

impl<D: CaptureDevice> Drop for CaptureSession<D> {
    fn drop(&mut self) {
        match self.device.stop() {
            Ok(()) => log::debug!("capture stopped"),
            Err(e) => log::error!("failed to stop capture: {e}"),
        }
    }
}
