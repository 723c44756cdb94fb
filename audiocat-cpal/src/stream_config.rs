//! Picking a cpal stream configuration for a requested rate and layout.

use cpal::{SampleFormat as CpalFormat, SampleRate, SupportedStreamConfig, SupportedStreamConfigRange};

use audiocat_core::AudioError;

/// Sample types the callbacks know how to convert.
pub(crate) const HANDLED_FORMATS: [CpalFormat; 3] = [CpalFormat::F32, CpalFormat::I16, CpalFormat::U16];

/// The parts of a supported range that matter when choosing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub channels: u16,
    pub min_rate: u32,
    pub max_rate: u32,
    pub sample_format: CpalFormat,
}

impl From<&SupportedStreamConfigRange> for Candidate {
    fn from(range: &SupportedStreamConfigRange) -> Self {
        Self {
            channels: range.channels(),
            min_rate: range.min_sample_rate().0,
            max_rate: range.max_sample_rate().0,
            sample_format: range.sample_format(),
        }
    }
}

/// Index of the best candidate for `channels` at `rate`.
///
/// The rate must be in range and the sample type handled. An exact channel
/// match wins, then stereo-or-more, then anything; `f32` breaks ties.
pub(crate) fn best_candidate(candidates: &[Candidate], channels: u16, rate: u32) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            c.min_rate <= rate && rate <= c.max_rate && HANDLED_FORMATS.contains(&c.sample_format)
        })
        .max_by_key(|(_, c)| {
            let layout = if c.channels == channels {
                2
            } else if c.channels >= 2 {
                1
            } else {
                0
            };
            (layout, c.sample_format == CpalFormat::F32)
        })
        .map(|(i, _)| i)
}

/// Choose among a device's supported ranges.
pub(crate) fn select(
    ranges: Vec<SupportedStreamConfigRange>,
    channels: u16,
    rate: u32,
    operation: &str,
) -> Result<SupportedStreamConfig, AudioError> {
    let candidates: Vec<Candidate> = ranges.iter().map(Candidate::from).collect();
    let index = best_candidate(&candidates, channels, rate).ok_or_else(|| {
        AudioError::device(
            operation,
            format!("no supported {channels}-channel configuration at {rate} Hz"),
        )
    })?;
    let chosen = ranges[index].clone().with_sample_rate(SampleRate(rate));
    log::debug!(
        "{operation}: {} channels, {:?} at {rate} Hz",
        chosen.channels(),
        chosen.sample_format()
    );
    Ok(chosen)
}
