use std::io::{self, ErrorKind, Write};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use audiocat_core::processing::{convert, fourier};
use audiocat_core::storage::metadata::write_summary;
use audiocat_core::{AudioBackend, CaptureConfiguration, CaptureDevice, CaptureSession, CaptureSummary, ChecksumWriter};

use crate::{Args, OutputFormat};

/// Pause between non-blocking pulls.
const LISTEN_PERIOD: Duration = Duration::from_millis(10);

pub fn run<B: AudioBackend>(backend: &B, args: &Args) -> Result<()> {
    let config = CaptureConfiguration {
        device_name: args.device.clone(),
        sample_rate: args.sample_rate,
        format: args.format,
        ring_capacity: args.sample_rate as usize,
    };
    if args.duration > 0.0 {
        log::info!(
            "listening for {} seconds of {} data at {} Hz, writing to stdout",
            args.duration,
            args.format,
            args.sample_rate
        );
    } else {
        log::info!(
            "listening for {} data at {} Hz, writing to stdout",
            args.format,
            args.sample_rate
        );
    }

    let mut session = CaptureSession::open(backend, &config).context("failed to open capture device")?;
    let frame_limit = (args.duration.max(0.0) * f64::from(args.sample_rate)) as u64;

    let mut out = ChecksumWriter::new(io::stdout().lock());
    let frames = match args.output_format {
        OutputFormat::FourierHistogram => histogram(&mut session, &mut out, args.fourier_width, frame_limit)?,
        output => stream(&mut session, &mut out, output, args.reverse_endian, frame_limit)?,
    };
    drop(session);
    log::info!("done listening ({frames} frames)");

    if let Some(path) = &args.summary {
        let summary = CaptureSummary::new(
            args.format,
            args.sample_rate,
            frames,
            out.bytes_written(),
            &out.checksum(),
        );
        write_summary(&summary, path).with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote capture summary to {}", path.display());
    }
    Ok(())
}

/// Poll the session every [`LISTEN_PERIOD`] and forward whatever arrived.
/// Returns the frames captured; a closed stdout ends the capture early.
fn stream<D, W>(
    session: &mut CaptureSession<D>,
    out: &mut W,
    output: OutputFormat,
    reverse_endian: bool,
    frame_limit: u64,
) -> Result<u64>
where
    D: CaptureDevice,
    W: Write,
{
    let format = session.format();
    // the device ring holds one second, so no pull returns more than that
    let period_frames = session.sample_rate() as usize;
    let mut buffer = vec![0u8; period_frames * format.bytes_per_frame()];
    let mut captured: u64 = 0;
    let mut sample_index: u64 = 0;

    while frame_limit == 0 || captured < frame_limit {
        thread::sleep(LISTEN_PERIOD);
        // a finite listen asks for everything still outstanding
        let wanted = if frame_limit == 0 {
            period_frames
        } else {
            (frame_limit - captured) as usize
        };
        let frames = session.pull(&mut buffer, wanted, false)?;
        if frames == 0 {
            continue;
        }
        let data = &mut buffer[..frames * format.bytes_per_frame()];

        let written = match output {
            OutputFormat::Text => write_text(out, &convert::decode_to_f32(data, format), &mut sample_index),
            _ => {
                if reverse_endian {
                    convert::byteswap(data, frames, format);
                }
                out.write_all(data).and_then(|()| out.flush())
            }
        };
        captured += frames as u64;
        match written {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                log::info!("stdout closed, stopping capture");
                break;
            }
            Err(e) => return Err(e).context("failed to write captured audio"),
        }
    }
    Ok(captured)
}

fn write_text<W: Write>(out: &mut W, samples: &[f32], index: &mut u64) -> io::Result<()> {
    for sample in samples {
        writeln!(out, "{index}: {sample}")?;
        *index += 1;
    }
    out.flush()
}

/// One histogram line per `width` frames, pulled blocking.
fn histogram<D, W>(session: &mut CaptureSession<D>, out: &mut W, width: usize, frame_limit: u64) -> Result<u64>
where
    D: CaptureDevice,
    W: Write,
{
    if !width.is_power_of_two() {
        bail!("--fourier-width must be a power of two (got {width})");
    }
    let format = session.format();
    let channels = usize::from(format.channels());
    let mut buffer = vec![0u8; width * format.bytes_per_frame()];
    let mut captured: u64 = 0;

    while frame_limit == 0 || captured < frame_limit {
        let frames = session.pull(&mut buffer, width, true)?;
        if frames != width {
            bail!("blocking pull returned {frames} of {width} frames");
        }
        let samples = convert::decode_to_f32(&buffer, format);
        let mono = convert::downmix_to_mono(&samples, channels);
        let line = fourier::histogram_line(&mono)?;
        match writeln!(out, "{line}").and_then(|()| out.flush()) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::BrokenPipe => break,
            Err(e) => return Err(e).context("failed to write histogram"),
        }
        captured += width as u64;
    }
    Ok(captured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    use audiocat_core::{AudioError, SampleFormat};

    /// Capture device whose buffered frame count grows by a scripted amount
    /// on every availability query. Bytes count upward from zero.
    struct ScriptedCapture {
        format: SampleFormat,
        arrivals: RefCell<VecDeque<usize>>,
        steady: usize,
        buffered: Cell<usize>,
        next_byte: u8,
    }

    impl ScriptedCapture {
        fn new(format: SampleFormat, arrivals: &[usize], steady: usize) -> Self {
            Self {
                format,
                arrivals: RefCell::new(arrivals.iter().copied().collect()),
                steady,
                buffered: Cell::new(0),
                next_byte: 0,
            }
        }
    }

    impl CaptureDevice for ScriptedCapture {
        fn start(&mut self) -> Result<(), AudioError> {
            Ok(())
        }

        fn stop(&mut self) -> Result<(), AudioError> {
            Ok(())
        }

        fn available_frames(&self) -> Result<usize, AudioError> {
            let arrived = self.arrivals.borrow_mut().pop_front().unwrap_or(self.steady);
            self.buffered.set(self.buffered.get() + arrived);
            Ok(self.buffered.get())
        }

        fn read_frames(&mut self, out: &mut [u8], frames: usize) -> Result<(), AudioError> {
            for byte in &mut out[..frames * self.format.bytes_per_frame()] {
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

    /// Accepts the first write, then reports the reader as gone.
    #[derive(Default)]
    struct ClosingPipe {
        written: Vec<u8>,
    }

    impl Write for ClosingPipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if !self.written.is_empty() {
                return Err(io::Error::from(ErrorKind::BrokenPipe));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn session(format: SampleFormat, rate: u32, arrivals: &[usize], steady: usize) -> CaptureSession<ScriptedCapture> {
        CaptureSession::start(ScriptedCapture::new(format, arrivals, steady), rate).unwrap()
    }

    #[test]
    fn binary_output_stops_at_the_frame_limit() {
        let mut session = session(SampleFormat::MONO_I16, 44100, &[3, 0, 4], 10);
        let mut out = ChecksumWriter::new(Vec::new());

        let frames = stream(&mut session, &mut out, OutputFormat::Binary, false, 8).unwrap();

        assert_eq!(frames, 8);
        assert_eq!(out.bytes_written(), 16);
        assert_eq!(out.get_ref(), &(0..16).collect::<Vec<u8>>());
    }

    #[test]
    fn long_listen_reads_through_a_one_second_buffer() {
        // 4 Hz gives a 4-frame buffer; 10 frames arrive at once
        let mut session = session(SampleFormat::MONO_I8, 4, &[10], 0);
        let mut out = Vec::new();

        let frames = stream(&mut session, &mut out, OutputFormat::Binary, false, 10).unwrap();

        assert_eq!(frames, 10);
        assert_eq!(out, (0..10).collect::<Vec<u8>>());
    }

    #[test]
    fn reverse_endian_swaps_each_sample() {
        let mut session = session(SampleFormat::STEREO_I16, 44100, &[2], 0);
        let mut out = Vec::new();

        stream(&mut session, &mut out, OutputFormat::Binary, true, 2).unwrap();

        assert_eq!(out, vec![1, 0, 3, 2, 5, 4, 7, 6]);
    }

    #[test]
    fn text_numbering_continues_across_pulls() {
        let mut session = session(SampleFormat::MONO_I8, 44100, &[2, 0, 1], 0);
        let mut out = Vec::new();

        stream(&mut session, &mut out, OutputFormat::Text, false, 3).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "0: -1");
        assert!(lines[1].starts_with("1: -0.99"));
        assert!(lines[2].starts_with("2: -0.98"));
    }

    #[test]
    fn text_ignores_reverse_endian() {
        let mut session = session(SampleFormat::MONO_I8, 44100, &[1], 0);
        let mut out = Vec::new();
        stream(&mut session, &mut out, OutputFormat::Text, true, 1).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0: -1\n");
    }

    #[test]
    fn closed_output_ends_an_indefinite_listen() {
        let mut session = session(SampleFormat::MONO_I16, 44100, &[], 3);
        let mut out = ClosingPipe::default();

        let frames = stream(&mut session, &mut out, OutputFormat::Binary, false, 0).unwrap();

        assert_eq!(out.written, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(frames, 6);
    }

    #[test]
    fn histogram_prints_one_line_per_window() {
        let mut session = session(SampleFormat::MONO_I16, 44100, &[3, 3], 2);
        let mut out = Vec::new();

        let frames = histogram(&mut session, &mut out, 8, 16).unwrap();

        assert_eq!(frames, 16);
        assert_eq!(String::from_utf8(out).unwrap(), "@\n@\n");
    }

    #[test]
    fn histogram_width_must_be_a_power_of_two() {
        let mut session = session(SampleFormat::MONO_I16, 44100, &[], 1);
        assert!(histogram(&mut session, &mut Vec::new(), 12, 12).is_err());
    }
}
