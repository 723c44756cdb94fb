//! Scripted in-memory devices for exercising the sessions without hardware.

use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use crate::models::audio_models::{AudioDevice, BufferHandle, DeviceKind};
use crate::models::config::CaptureConfiguration;
use crate::models::error::AudioError;
use crate::models::format::SampleFormat;
use crate::models::state::PlayState;
use crate::traits::backend::AudioBackend;
use crate::traits::capture_device::CaptureDevice;
use crate::traits::playback_device::PlaybackDevice;

/// How the mock source consumes its queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReleaseMode {
    /// Every queued buffer is already processed when asked.
    Instant,
    /// Nothing is ever processed.
    Held,
    /// Everything queued becomes processed once `processed_buffers` has been
    /// polled this many times since the mode was set.
    AfterPolls(usize),
}

/// What the mock playback device observed.
#[derive(Debug, Default)]
pub(crate) struct PlaybackLog {
    /// Buffer contents in the order they were queued.
    pub submitted: Vec<Vec<u8>>,
    pub plays: usize,
    pub polls: usize,
    pub generated: usize,
    pub deleted: usize,
}

impl PlaybackLog {
    pub fn submitted_bytes(&self) -> usize {
        self.submitted.iter().map(Vec::len).sum()
    }
}

pub(crate) struct MockPlayback {
    mode: ReleaseMode,
    polls_since_mode: Cell<usize>,
    next_handle: u32,
    live: HashSet<BufferHandle>,
    contents: Vec<(BufferHandle, Vec<u8>)>,
    queue: VecDeque<BufferHandle>,
    state: Cell<PlayState>,
    fail_queue: bool,
    short_by: usize,
    log: Rc<RefCell<PlaybackLog>>,
}

impl MockPlayback {
    pub fn new(mode: ReleaseMode) -> Self {
        Self {
            mode,
            polls_since_mode: Cell::new(0),
            next_handle: 1,
            live: HashSet::new(),
            contents: Vec::new(),
            queue: VecDeque::new(),
            state: Cell::new(PlayState::Initial),
            fail_queue: false,
            short_by: 0,
            log: Rc::new(RefCell::new(PlaybackLog::default())),
        }
    }

    /// Make every subsequent `queue_buffers` call fail.
    pub fn failing_queue(mut self) -> Self {
        self.fail_queue = true;
        self
    }

    /// Hand out `missing` fewer buffers than asked for.
    pub fn short_allocation(mut self, missing: usize) -> Self {
        self.short_by = missing;
        self
    }

    pub fn set_mode(&mut self, mode: ReleaseMode) {
        self.mode = mode;
        self.polls_since_mode.set(0);
    }

    pub fn log(&self) -> Rc<RefCell<PlaybackLog>> {
        Rc::clone(&self.log)
    }

    fn done(&self) -> usize {
        match self.mode {
            ReleaseMode::Instant => self.queue.len(),
            ReleaseMode::Held => 0,
            ReleaseMode::AfterPolls(n) if self.polls_since_mode.get() >= n => self.queue.len(),
            ReleaseMode::AfterPolls(_) => 0,
        }
    }
}

impl PlaybackDevice for MockPlayback {
    fn generate_buffers(&mut self, count: usize) -> Result<Vec<BufferHandle>, AudioError> {
        let handles: Vec<BufferHandle> = (0..count.saturating_sub(self.short_by))
            .map(|_| {
                let handle = BufferHandle(self.next_handle);
                self.next_handle += 1;
                handle
            })
            .collect();
        self.live.extend(handles.iter().copied());
        self.log.borrow_mut().generated += handles.len();
        Ok(handles)
    }

    fn delete_buffers(&mut self, handles: &[BufferHandle]) -> Result<(), AudioError> {
        for handle in handles {
            if !self.live.remove(handle) {
                return Err(AudioError::device("delete_buffers", "AL_INVALID_NAME"));
            }
        }
        self.log.borrow_mut().deleted += handles.len();
        Ok(())
    }

    fn buffer_data(
        &mut self,
        handle: BufferHandle,
        data: &[u8],
        _format: SampleFormat,
        _sample_rate: u32,
    ) -> Result<(), AudioError> {
        if !self.live.contains(&handle) || self.queue.contains(&handle) {
            return Err(AudioError::device("buffer_data", "AL_INVALID_OPERATION"));
        }
        self.contents.retain(|(h, _)| *h != handle);
        self.contents.push((handle, data.to_vec()));
        Ok(())
    }

    fn queue_buffers(&mut self, handles: &[BufferHandle]) -> Result<(), AudioError> {
        if self.fail_queue {
            return Err(AudioError::device("queue_buffers", "AL_INVALID_OPERATION"));
        }
        for &handle in handles {
            let data = self
                .contents
                .iter()
                .find(|(h, _)| *h == handle)
                .map(|(_, d)| d.clone())
                .unwrap_or_default();
            self.log.borrow_mut().submitted.push(data);
            self.queue.push_back(handle);
        }
        Ok(())
    }

    fn unqueue_buffers(&mut self, count: usize) -> Result<Vec<BufferHandle>, AudioError> {
        if count > self.done() {
            return Err(AudioError::device("unqueue_buffers", "AL_INVALID_VALUE"));
        }
        Ok(self.queue.drain(..count).collect())
    }

    fn queued_buffers(&self) -> Result<usize, AudioError> {
        Ok(self.queue.len())
    }

    fn processed_buffers(&self) -> Result<usize, AudioError> {
        self.polls_since_mode.set(self.polls_since_mode.get() + 1);
        self.log.borrow_mut().polls += 1;
        Ok(self.done())
    }

    fn play(&mut self) -> Result<(), AudioError> {
        self.state.set(PlayState::Playing);
        self.log.borrow_mut().plays += 1;
        Ok(())
    }

    fn state(&self) -> Result<PlayState, AudioError> {
        // the source idles once it has consumed everything
        if self.state.get().is_playing() && self.done() == self.queue.len() {
            self.state.set(PlayState::Stopped);
        }
        Ok(self.state.get())
    }
}

/// What the mock capture device observed.
#[derive(Debug, Default)]
pub(crate) struct CaptureLog {
    pub started: bool,
    pub stopped: bool,
    pub polls: usize,
}

/// Capture device whose ring grows by a scripted number of frames per poll.
///
/// Frame bytes count upward from zero (wrapping), so readers can check order.
pub(crate) struct MockCapture {
    format: SampleFormat,
    arrivals: RefCell<VecDeque<usize>>,
    steady_arrival: usize,
    buffered: Cell<usize>,
    next_byte: u8,
    log: Rc<RefCell<CaptureLog>>,
}

impl MockCapture {
    /// `arrivals[i]` frames land before the i-th availability query; after
    /// the script runs out `steady_arrival` frames land per query.
    pub fn new(format: SampleFormat, arrivals: &[usize], steady_arrival: usize) -> Self {
        Self {
            format,
            arrivals: RefCell::new(arrivals.iter().copied().collect()),
            steady_arrival,
            buffered: Cell::new(0),
            next_byte: 0,
            log: Rc::new(RefCell::new(CaptureLog::default())),
        }
    }

    pub fn log(&self) -> Rc<RefCell<CaptureLog>> {
        Rc::clone(&self.log)
    }
}

impl CaptureDevice for MockCapture {
    fn start(&mut self) -> Result<(), AudioError> {
        self.log.borrow_mut().started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.log.borrow_mut().stopped = true;
        Ok(())
    }

    fn available_frames(&self) -> Result<usize, AudioError> {
        let arrived = self
            .arrivals
            .borrow_mut()
            .pop_front()
            .unwrap_or(self.steady_arrival);
        self.buffered.set(self.buffered.get() + arrived);
        self.log.borrow_mut().polls += 1;
        Ok(self.buffered.get())
    }

    fn read_frames(&mut self, out: &mut [u8], frames: usize) -> Result<(), AudioError> {
        if frames > self.buffered.get() {
            return Err(AudioError::device("read_frames", "ALC_INVALID_VALUE"));
        }
        let len = frames * self.format.bytes_per_frame();
        for byte in &mut out[..len] {
            *byte = self.next_byte;
            self.next_byte = self.next_byte.wrapping_add(1);
        }
        self.buffered.set(self.buffered.get() - frames);
        Ok(())
    }

    fn format(&self) -> SampleFormat {
        self.format
    }
}

/// Backend handing out scripted devices.
pub(crate) struct MockBackend {
    pub capture_available: bool,
    pub arrivals: Vec<usize>,
}

impl AudioBackend for MockBackend {
    type Capture = MockCapture;
    type Playback = MockPlayback;

    fn open_capture(&self, config: &CaptureConfiguration) -> Result<MockCapture, AudioError> {
        if !self.capture_available {
            return Err(AudioError::DeviceNotAvailable(
                config.device_name.clone().unwrap_or_else(|| "default".into()),
            ));
        }
        Ok(MockCapture::new(config.format, &self.arrivals, 0))
    }

    fn open_playback(&self, _device_name: Option<&str>) -> Result<MockPlayback, AudioError> {
        Ok(MockPlayback::new(ReleaseMode::Instant))
    }

    fn list_devices(&self) -> Result<Vec<AudioDevice>, AudioError> {
        Ok(vec![AudioDevice {
            name: "mock".into(),
            kind: DeviceKind::Playback,
            is_default: true,
        }])
    }
}
