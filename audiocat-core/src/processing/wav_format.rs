//! RIFF/WAVE container support.
//!
//! Loading understands `fmt `, `smpl` (base note + loop points) and `data`
//! chunks and skips everything else. Saving always emits the plain 44-byte
//! header followed by little-endian sample data.

use std::io::{Read, Write};

use crate::models::error::AudioError;
use crate::models::format::SampleFormat;
use crate::processing::convert;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

const FORMAT_PCM: u16 = 1;
const FORMAT_IEEE_FLOAT: u16 = 3;

/// One loop from a `smpl` chunk, in sample offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavLoop {
    pub start: u32,
    pub end: u32,
    /// 0 = forward, 1 = ping-pong, 2 = reverse.
    pub kind: u32,
}

/// Decoded contents of a WAV file: normalized interleaved samples plus metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WavContents {
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
    pub base_note: Option<u8>,
    pub loops: Vec<WavLoop>,
}

impl WavContents {
    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / usize::from(self.channels)
        }
    }

    pub fn seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frame_count() as f64 / f64::from(self.sample_rate)
        }
    }
}

/// Generate a 44-byte WAV RIFF header.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (format chunk size)
/// [20-21]  1 (PCM) or 3 (IEEE float)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * channels * bit_depth / 8
/// [32-33]  block_align = channels * bit_depth / 8
/// [34-35]  bit_depth
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn generate_wav_header(
    sample_rate: u32,
    bit_depth: u16,
    channels: u16,
    is_float: bool,
    data_size: u32,
) -> [u8; WAV_HEADER_SIZE] {
    let byte_rate = sample_rate * u32::from(channels) * u32::from(bit_depth) / 8;
    let block_align = channels * bit_depth / 8;
    let format_code = if is_float { FORMAT_IEEE_FLOAT } else { FORMAT_PCM };

    let mut header = [0u8; WAV_HEADER_SIZE];

    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&data_size.saturating_add(36).to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&format_code.to_le_bytes());
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&bit_depth.to_le_bytes());

    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Largest data chunk whose RIFF size (`36 + data_size`) still fits a u32.
pub const MAX_WAV_DATA_SIZE: u32 = u32::MAX - 36;

fn checked_data_size(len: usize) -> Result<u32, AudioError> {
    u32::try_from(len)
        .ok()
        .filter(|&size| size <= MAX_WAV_DATA_SIZE)
        .ok_or_else(|| AudioError::Wav(format!("{len} bytes of sample data do not fit a WAV file")))
}

/// Write interleaved normalized samples as a complete WAV file.
///
/// `format` picks the stored encoding; its channel count must divide the
/// sample count.
pub fn save_wav<W: Write>(
    writer: &mut W,
    samples: &[f32],
    sample_rate: u32,
    format: SampleFormat,
) -> Result<(), AudioError> {
    let channels = usize::from(format.channels());
    if samples.len() % channels != 0 {
        return Err(AudioError::Wav(format!(
            "{} samples do not fill whole {}-channel frames",
            samples.len(),
            channels
        )));
    }

    let data = encode_le(samples, format);
    let data_size = checked_data_size(data.len())?;
    let header = generate_wav_header(
        sample_rate,
        format.bits_per_sample(),
        format.channels(),
        format.is_float(),
        data_size,
    );
    writer.write_all(&header)?;
    writer.write_all(&data)?;
    writer.flush()?;
    Ok(())
}

fn encode_le(samples: &[f32], format: SampleFormat) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * format.bytes_per_sample());
    for &sample in samples {
        match format.bits_per_sample() {
            8 => data.push(convert::f32_to_u8(sample)),
            16 => data.extend_from_slice(&convert::f32_to_s16(sample).to_le_bytes()),
            _ => data.extend_from_slice(&sample.to_le_bytes()),
        }
    }
    data
}

#[derive(Debug, Clone, Copy)]
struct FmtChunk {
    format: u16,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

/// Read and decode a whole WAV stream.
pub fn load_wav<R: Read>(reader: &mut R) -> Result<WavContents, AudioError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    parse_wav(&data)
}

fn parse_wav(data: &[u8]) -> Result<WavContents, AudioError> {
    if data.len() < 12 || &data[0..4] != b"RIFF" {
        return Err(AudioError::Wav("unknown file format (missing RIFF magic)".into()));
    }
    if &data[8..12] != b"WAVE" {
        return Err(AudioError::Wav("RIFF file is not WAVE".into()));
    }

    let mut contents = WavContents::default();
    let mut fmt: Option<FmtChunk> = None;
    let mut offset = 12;

    while offset + 8 <= data.len() {
        let magic = &data[offset..offset + 4];
        let size = le_u32(data, offset + 4) as usize;
        let body_start = offset + 8;
        let body_end = body_start
            .checked_add(size)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                AudioError::Wav(format!(
                    "chunk {} overruns the file",
                    String::from_utf8_lossy(magic)
                ))
            })?;
        let body = &data[body_start..body_end];

        match magic {
            b"fmt " => {
                let chunk = parse_fmt(body)?;
                contents.channels = chunk.channels;
                contents.sample_rate = chunk.sample_rate;
                fmt = Some(chunk);
            }
            b"smpl" => {
                let chunk = fmt.ok_or_else(|| AudioError::Wav("smpl chunk is before fmt chunk".into()))?;
                parse_smpl(body, chunk, &mut contents)?;
            }
            b"data" => {
                let chunk = fmt.ok_or_else(|| AudioError::Wav("data chunk is before fmt chunk".into()))?;
                contents.samples = decode_data(body, chunk)?;
                return Ok(contents);
            }
            _ => {}
        }

        // chunks are word-aligned
        offset = body_end + (size & 1);
    }

    Err(AudioError::Wav("no data chunk".into()))
}

fn parse_fmt(body: &[u8]) -> Result<FmtChunk, AudioError> {
    if body.len() < 16 {
        return Err(AudioError::Wav(format!("fmt chunk too short ({} bytes)", body.len())));
    }
    let chunk = FmtChunk {
        format: le_u16(body, 0),
        channels: le_u16(body, 2),
        sample_rate: le_u32(body, 4),
        bits_per_sample: le_u16(body, 14),
    };
    if chunk.channels == 0 || chunk.channels > 2 {
        return Err(AudioError::Wav(format!(
            "only mono and stereo are supported ({} channels)",
            chunk.channels
        )));
    }
    Ok(chunk)
}

fn parse_smpl(body: &[u8], fmt: FmtChunk, contents: &mut WavContents) -> Result<(), AudioError> {
    const HEADER: usize = 36;
    const LOOP: usize = 24;

    if body.len() < HEADER {
        return Err(AudioError::Wav("smpl chunk too short".into()));
    }
    let base_note = le_u32(body, 12);
    contents.base_note = u8::try_from(base_note).ok().filter(|&n| n <= 0x7F);

    let num_loops = le_u32(body, 28) as usize;
    let bytes_per_sample = u32::from(fmt.bits_per_sample / 8).max(1);
    contents.loops.clear();
    for index in 0..num_loops {
        let at = HEADER + index * LOOP;
        if at + LOOP > body.len() {
            return Err(AudioError::Wav("sound has malformed loop information".into()));
        }
        contents.loops.push(WavLoop {
            kind: le_u32(body, at + 4),
            start: le_u32(body, at + 8) / bytes_per_sample,
            end: le_u32(body, at + 12) / bytes_per_sample,
        });
    }
    Ok(())
}

fn decode_data(body: &[u8], fmt: FmtChunk) -> Result<Vec<f32>, AudioError> {
    match (fmt.format, fmt.bits_per_sample) {
        (FORMAT_IEEE_FLOAT, 32) => Ok(body
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()),
        (FORMAT_PCM, 16) => Ok(body
            .chunks_exact(2)
            .map(|b| convert::s16_to_f32(i16::from_le_bytes([b[0], b[1]])))
            .collect()),
        (FORMAT_PCM, 8) => Ok(convert::convert_u8_to_f32(body)),
        (format, bits) => Err(AudioError::Wav(format!(
            "sample width is not supported (format={format}, bits_per_sample={bits})"
        ))),
    }
}

fn le_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn le_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn chunk(magic: &[u8; 4], body: &[u8]) -> Vec<u8> {
        let mut out = magic.to_vec();
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(body);
        if body.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = chunks.concat();
        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&(4 + body.len() as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(&body);
        out
    }

    fn fmt_body(format: u16, channels: u16, rate: u32, bits: u16) -> Vec<u8> {
        let header = generate_wav_header(rate, bits, channels, format == FORMAT_IEEE_FLOAT, 0);
        header[20..36].to_vec()
    }

    #[test]
    fn header_fields_48khz_stereo_16bit() {
        let header = generate_wav_header(48000, 16, 2, false, 9600);

        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(&header[36..40], b"data");
        assert_eq!(le_u16(&header, 20), 1);
        assert_eq!(le_u16(&header, 22), 2);
        assert_eq!(le_u32(&header, 24), 48000);
        assert_eq!(le_u32(&header, 28), 192000);
        assert_eq!(le_u16(&header, 32), 4);
        assert_eq!(le_u16(&header, 34), 16);
        assert_eq!(le_u32(&header, 40), 9600);
        assert_eq!(le_u32(&header, 4), 36 + 9600);
    }

    #[test]
    fn float_header_uses_format_code_3() {
        let header = generate_wav_header(44100, 32, 1, true, 0);
        assert_eq!(le_u16(&header, 20), 3);
        assert_eq!(le_u16(&header, 32), 4);
    }

    #[test]
    fn save_then_load_16_bit_stereo() {
        let samples = vec![0.0f32, 0.5, -0.5, -1.0];
        let mut out = Vec::new();
        save_wav(&mut out, &samples, 22050, SampleFormat::STEREO_I16).unwrap();
        assert_eq!(out.len(), WAV_HEADER_SIZE + 8);

        let wav = load_wav(&mut Cursor::new(out)).unwrap();
        assert_eq!(wav.channels, 2);
        assert_eq!(wav.sample_rate, 22050);
        assert_eq!(wav.frame_count(), 2);
        assert_eq!(wav.samples[3], -1.0);
        assert!((wav.samples[1] - 0.5).abs() < 1.0 / 32767.0);
    }

    #[test]
    fn save_then_load_float_is_exact() {
        let samples = vec![0.1f32, -0.7, 0.33];
        let mut out = Vec::new();
        save_wav(&mut out, &samples, 8000, SampleFormat::MONO_F32).unwrap();
        let wav = load_wav(&mut Cursor::new(out)).unwrap();
        assert_eq!(wav.samples, samples);
        assert!((wav.seconds() - 3.0 / 8000.0).abs() < 1e-12);
    }

    #[test]
    fn eight_bit_data_is_unsigned() {
        let file = riff(&[
            chunk(b"fmt ", &fmt_body(1, 1, 8000, 8)),
            chunk(b"data", &[0, 128, 255]),
        ]);
        let wav = load_wav(&mut Cursor::new(file)).unwrap();
        assert_eq!(wav.samples[0], -1.0);
        assert_eq!(wav.samples[1], 0.0);
        assert!(wav.samples[2] > 0.99);
    }

    #[test]
    fn unknown_chunks_are_skipped_with_padding() {
        let file = riff(&[
            chunk(b"LIST", &[1, 2, 3]),
            chunk(b"fmt ", &fmt_body(1, 1, 8000, 16)),
            chunk(b"data", &0i16.to_le_bytes()),
        ]);
        let wav = load_wav(&mut Cursor::new(file)).unwrap();
        assert_eq!(wav.samples, vec![0.0]);
    }

    #[test]
    fn smpl_chunk_supplies_base_note_and_loops() {
        let mut smpl = vec![0u8; 36];
        smpl[12..16].copy_from_slice(&60u32.to_le_bytes());
        smpl[28..32].copy_from_slice(&1u32.to_le_bytes());
        let mut lp = vec![0u8; 24];
        lp[4..8].copy_from_slice(&1u32.to_le_bytes());
        lp[8..12].copy_from_slice(&200u32.to_le_bytes());
        lp[12..16].copy_from_slice(&400u32.to_le_bytes());
        smpl.extend_from_slice(&lp);

        let file = riff(&[
            chunk(b"fmt ", &fmt_body(1, 1, 8000, 16)),
            chunk(b"smpl", &smpl),
            chunk(b"data", &[0, 0]),
        ]);
        let wav = load_wav(&mut Cursor::new(file)).unwrap();
        assert_eq!(wav.base_note, Some(60));
        assert_eq!(wav.loops, vec![WavLoop { start: 100, end: 200, kind: 1 }]);
    }

    #[test]
    fn truncated_loop_table_is_rejected() {
        let mut smpl = vec![0u8; 36];
        smpl[28..32].copy_from_slice(&2u32.to_le_bytes());
        let file = riff(&[
            chunk(b"fmt ", &fmt_body(1, 1, 8000, 16)),
            chunk(b"smpl", &smpl),
            chunk(b"data", &[0, 0]),
        ]);
        assert!(matches!(load_wav(&mut Cursor::new(file)), Err(AudioError::Wav(_))));
    }

    #[test]
    fn rejects_non_riff_and_misordered_chunks() {
        assert!(load_wav(&mut Cursor::new(b"OggS0000WAVE".to_vec())).is_err());

        let data_first = riff(&[chunk(b"data", &[0, 0])]);
        assert!(load_wav(&mut Cursor::new(data_first)).is_err());

        let no_data = riff(&[chunk(b"fmt ", &fmt_body(1, 1, 8000, 16))]);
        assert!(load_wav(&mut Cursor::new(no_data)).is_err());
    }

    #[test]
    fn rejects_unsupported_layouts() {
        let surround = riff(&[
            chunk(b"fmt ", &fmt_body(1, 6, 48000, 16)),
            chunk(b"data", &[]),
        ]);
        assert!(load_wav(&mut Cursor::new(surround)).is_err());

        let pcm24 = riff(&[
            chunk(b"fmt ", &fmt_body(1, 1, 48000, 24)),
            chunk(b"data", &[0, 0, 0]),
        ]);
        assert!(load_wav(&mut Cursor::new(pcm24)).is_err());
    }

    #[test]
    fn data_size_is_bounded_by_the_riff_size_field() {
        assert_eq!(checked_data_size(MAX_WAV_DATA_SIZE as usize).unwrap(), u32::MAX - 36);
        assert!(matches!(
            checked_data_size(MAX_WAV_DATA_SIZE as usize + 1),
            Err(AudioError::Wav(_))
        ));
        assert!(checked_data_size(usize::MAX).is_err());

        let header = generate_wav_header(8000, 8, 1, false, MAX_WAV_DATA_SIZE);
        assert_eq!(le_u32(&header, 4), u32::MAX);
    }
}
