//! Sample conversions between integer PCM and normalized `f32`.
//!
//! Integer → float divides by the signed positive maximum (127 / 32767);
//! the most negative code maps to exactly -1.0. Float → integer clamps at
//! ±1.0 and otherwise scales by the positive maximum and truncates.
//! Unsigned codes are re-centered around the midpoint (128 / 32768).

use crate::models::format::SampleFormat;

/// Reverse the byte order of every sample element in the first
/// `frame_count` frames of `buffer`.
///
/// 8-bit formats are left untouched. Trailing bytes that do not form a
/// whole element are ignored.
pub fn byteswap(buffer: &mut [u8], frame_count: usize, format: SampleFormat) {
    let element = format.bytes_per_sample();
    if element < 2 {
        return;
    }
    let elements = frame_count * usize::from(format.channels());
    let len = (elements * element).min(buffer.len());
    for sample in buffer[..len].chunks_exact_mut(element) {
        sample.reverse();
    }
}

// Conversion from f32

#[inline]
pub fn f32_to_s16(sample: f32) -> i16 {
    if sample >= 1.0 {
        i16::MAX
    } else if sample <= -1.0 {
        i16::MIN
    } else {
        (sample * 32767.0) as i16
    }
}

#[inline]
pub fn f32_to_u16(sample: f32) -> u16 {
    if sample >= 1.0 {
        u16::MAX
    } else if sample <= -1.0 {
        0
    } else {
        ((sample + 1.0) * 32768.0) as u16
    }
}

#[inline]
pub fn f32_to_s8(sample: f32) -> i8 {
    if sample >= 1.0 {
        i8::MAX
    } else if sample <= -1.0 {
        i8::MIN
    } else {
        (sample * 127.0) as i8
    }
}

#[inline]
pub fn f32_to_u8(sample: f32) -> u8 {
    if sample >= 1.0 {
        u8::MAX
    } else if sample <= -1.0 {
        0
    } else {
        ((sample + 1.0) * 128.0) as u8
    }
}

// Conversion to f32

#[inline]
pub fn s16_to_f32(sample: i16) -> f32 {
    if sample == i16::MIN {
        -1.0
    } else {
        f32::from(sample) / 32767.0
    }
}

#[inline]
pub fn u16_to_f32(sample: u16) -> f32 {
    f32::from(sample) / 32768.0 - 1.0
}

#[inline]
pub fn s8_to_f32(sample: i8) -> f32 {
    if sample == i8::MIN {
        -1.0
    } else {
        f32::from(sample) / 127.0
    }
}

#[inline]
pub fn u8_to_f32(sample: u8) -> f32 {
    f32::from(sample) / 128.0 - 1.0
}

pub fn convert_s16_to_f32(samples: &[i16]) -> Vec<f32> {
    samples.iter().copied().map(s16_to_f32).collect()
}

pub fn convert_u16_to_f32(samples: &[u16]) -> Vec<f32> {
    samples.iter().copied().map(u16_to_f32).collect()
}

pub fn convert_s8_to_f32(samples: &[i8]) -> Vec<f32> {
    samples.iter().copied().map(s8_to_f32).collect()
}

pub fn convert_u8_to_f32(samples: &[u8]) -> Vec<f32> {
    samples.iter().copied().map(u8_to_f32).collect()
}

pub fn convert_f32_to_s16(samples: &[f32]) -> Vec<i16> {
    samples.iter().copied().map(f32_to_s16).collect()
}

pub fn convert_f32_to_u16(samples: &[f32]) -> Vec<u16> {
    samples.iter().copied().map(f32_to_u16).collect()
}

pub fn convert_f32_to_s8(samples: &[f32]) -> Vec<i8> {
    samples.iter().copied().map(f32_to_s8).collect()
}

pub fn convert_f32_to_u8(samples: &[f32]) -> Vec<u8> {
    samples.iter().copied().map(f32_to_u8).collect()
}

/// Decode interleaved native-endian PCM bytes into normalized samples.
///
/// 8-bit data is read as unsigned. A trailing partial element is dropped.
pub fn decode_to_f32(bytes: &[u8], format: SampleFormat) -> Vec<f32> {
    match format.bits_per_sample() {
        8 => convert_u8_to_f32(bytes),
        16 => bytes
            .chunks_exact(2)
            .map(|b| s16_to_f32(i16::from_ne_bytes([b[0], b[1]])))
            .collect(),
        _ => bytes
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
    }
}

/// Encode normalized samples as interleaved native-endian PCM bytes.
pub fn encode_from_f32(samples: &[f32], format: SampleFormat) -> Vec<u8> {
    match format.bits_per_sample() {
        8 => convert_f32_to_u8(samples),
        16 => {
            let mut data = Vec::with_capacity(samples.len() * 2);
            for &sample in samples {
                data.extend_from_slice(&f32_to_s16(sample).to_ne_bytes());
            }
            data
        }
        _ => {
            let mut data = Vec::with_capacity(samples.len() * 4);
            for &sample in samples {
                data.extend_from_slice(&sample.to_ne_bytes());
            }
            data
        }
    }
}

/// Downmix interleaved multi-channel audio to mono by averaging channels per frame.
pub fn downmix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let scale = 1.0 / channels as f32;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect()
}

/// Repeat each mono sample across `channels` interleaved channels.
pub fn upmix_from_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .iter()
        .flat_map(|&s| std::iter::repeat(s).take(channels))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byteswap_reverses_each_element() {
        let mut buf = vec![0x01, 0x02, 0x03, 0x04];
        byteswap(&mut buf, 1, SampleFormat::STEREO_I16);
        assert_eq!(buf, vec![0x02, 0x01, 0x04, 0x03]);

        let mut buf = vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        byteswap(&mut buf, 2, SampleFormat::MONO_F32);
        assert_eq!(buf, vec![0x04, 0x03, 0x02, 0x01, 0x08, 0x07, 0x06, 0x05]);
    }

    #[test]
    fn byteswap_only_touches_requested_frames() {
        let mut buf = vec![0x01, 0x02, 0x03, 0x04];
        byteswap(&mut buf, 1, SampleFormat::MONO_I16);
        assert_eq!(buf, vec![0x02, 0x01, 0x03, 0x04]);
    }

    #[test]
    fn byteswap_is_noop_for_8_bit() {
        let mut buf = vec![0x01, 0x02, 0x03];
        byteswap(&mut buf, 3, SampleFormat::MONO_I8);
        assert_eq!(buf, vec![0x01, 0x02, 0x03]);
    }

    #[test]
    fn byteswap_is_self_inverse() {
        let original: Vec<u8> = (0..64).collect();
        for format in SampleFormat::ALL {
            let frames = original.len() / format.bytes_per_frame();
            let mut buf = original.clone();
            byteswap(&mut buf, frames, format);
            byteswap(&mut buf, frames, format);
            assert_eq!(buf, original, "{format}");
        }
    }

    #[test]
    fn most_negative_codes_map_to_minus_one() {
        assert_eq!(s16_to_f32(i16::MIN), -1.0);
        assert_eq!(s8_to_f32(i8::MIN), -1.0);
        assert_eq!(s16_to_f32(-i16::MAX), -1.0);
        assert_eq!(s16_to_f32(i16::MAX), 1.0);
    }

    #[test]
    fn float_to_int_clamps() {
        assert_eq!(f32_to_s16(1.0), i16::MAX);
        assert_eq!(f32_to_s16(3.5), i16::MAX);
        assert_eq!(f32_to_s16(-1.0), i16::MIN);
        assert_eq!(f32_to_s16(-7.0), i16::MIN);
        assert_eq!(f32_to_s8(2.0), i8::MAX);
        assert_eq!(f32_to_s8(-2.0), i8::MIN);
        assert_eq!(f32_to_u8(1.0), u8::MAX);
        assert_eq!(f32_to_u8(-1.0), 0);
        assert_eq!(f32_to_u16(1.5), u16::MAX);
        assert_eq!(f32_to_u16(-1.5), 0);
    }

    #[test]
    fn float_to_int_truncates() {
        // 0.5 * 32767 = 16383.5
        assert_eq!(f32_to_s16(0.5), 16383);
        assert_eq!(f32_to_s16(-0.5), -16383);
        assert_eq!(f32_to_s8(0.999), 126);
    }

    #[test]
    fn unsigned_is_centered_on_midpoint() {
        assert_eq!(f32_to_u8(0.0), 128);
        assert_eq!(u8_to_f32(128), 0.0);
        assert_eq!(f32_to_u16(0.0), 32768);
        assert_eq!(u16_to_f32(32768), 0.0);
        assert_eq!(u8_to_f32(0), -1.0);
    }

    #[test]
    fn s16_round_trip_within_one_step() {
        // allow for f32 rounding on top of the truncation step
        let step = 1.0001 / 32767.0;
        let mut x = -1.0f32;
        while x <= 1.0 {
            let back = s16_to_f32(f32_to_s16(x));
            assert!((back - x).abs() <= step, "{x} -> {back}");
            x += 0.001;
        }
        assert_eq!(s16_to_f32(f32_to_s16(-1.0)), -1.0);
    }

    #[test]
    fn slice_conversions_preserve_length() {
        let samples = [0.0f32, 0.25, -0.25, 1.0];
        assert_eq!(convert_f32_to_s16(&samples).len(), 4);
        assert_eq!(convert_s16_to_f32(&[0, 1, 2]).len(), 3);
        assert_eq!(convert_f32_to_u8(&samples)[0], 128);
        assert_eq!(convert_u16_to_f32(&[0])[0], -1.0);
        assert_eq!(convert_s8_to_f32(&[127])[0], 1.0);
        assert_eq!(convert_f32_to_s8(&samples)[3], 127);
        assert_eq!(convert_f32_to_u16(&samples)[0], 32768);
    }

    #[test]
    fn encode_then_decode_16_bit() {
        let samples = [0.0f32, 0.5, -1.0];
        let bytes = encode_from_f32(&samples, SampleFormat::MONO_I16);
        assert_eq!(bytes.len(), 6);
        let back = decode_to_f32(&bytes, SampleFormat::MONO_I16);
        assert_eq!(back[0], 0.0);
        assert!((back[1] - 0.5).abs() < 1.0 / 32767.0);
        assert_eq!(back[2], -1.0);
    }

    #[test]
    fn float_formats_are_passed_through_bit_exact() {
        let samples = [0.123f32, -0.987, 2.5];
        let bytes = encode_from_f32(&samples, SampleFormat::STEREO_F32);
        assert_eq!(decode_to_f32(&bytes, SampleFormat::STEREO_F32), samples.to_vec());
    }

    #[test]
    fn downmix_stereo_to_mono() {
        let mono = downmix_to_mono(&[0.2, 0.8, 0.4, 0.6], 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.5).abs() < 1e-6);
        assert!((mono[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn upmix_duplicates_samples() {
        assert_eq!(upmix_from_mono(&[0.1, 0.2], 2), vec![0.1, 0.1, 0.2, 0.2]);
        assert_eq!(upmix_from_mono(&[0.1], 1), vec![0.1]);
    }
}
