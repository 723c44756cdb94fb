//! Closed-form waveform generators producing mono `f32` samples.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::models::error::AudioError;

/// Kind of synthesized sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waveform {
    Sine,
    Square,
    /// Symmetric rise and fall, one full cycle per period.
    Triangle,
    /// Rising ramp that snaps back at the end of each period (sawtooth).
    FrontTriangle,
    WhiteNoise,
    /// Random points `frequency` samples apart, linearly interpolated.
    SplitNoise,
}

impl Waveform {
    pub const ALL: [Self; 6] = [
        Self::Sine,
        Self::Square,
        Self::Triangle,
        Self::FrontTriangle,
        Self::WhiteNoise,
        Self::SplitNoise,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sine => "sine",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::FrontTriangle => "front-triangle",
            Self::WhiteNoise => "white-noise",
            Self::SplitNoise => "split-noise",
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|w| w.name() == s)
            .ok_or_else(|| AudioError::UnsupportedWaveform(s.to_string()))
    }
}

/// Parameters shared by every generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthParams {
    /// Tone frequency in Hz. For split noise, the distance in samples
    /// between random points.
    pub frequency: f64,
    pub seconds: f64,
    pub volume: f32,
    pub sample_rate: u32,
    /// Fade linearly to silence over the whole sound (split noise only).
    pub fade_out: bool,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            frequency: 440.0,
            seconds: 1.0,
            volume: 1.0,
            sample_rate: 44100,
            fade_out: false,
        }
    }
}

impl SynthParams {
    pub fn sample_count(&self) -> usize {
        (self.seconds * f64::from(self.sample_rate)) as usize
    }

    fn validate(&self, waveform: Waveform) -> Result<(), AudioError> {
        if self.sample_rate == 0 {
            return Err(AudioError::InvalidConfiguration("sample rate must be positive".into()));
        }
        if !self.seconds.is_finite() || self.seconds < 0.0 {
            return Err(AudioError::InvalidConfiguration(format!(
                "duration must be a non-negative number of seconds (got {})",
                self.seconds
            )));
        }
        if waveform != Waveform::WhiteNoise && !(self.frequency.is_finite() && self.frequency > 0.0) {
            return Err(AudioError::InvalidConfiguration(format!(
                "{waveform} needs a positive frequency (got {})",
                self.frequency
            )));
        }
        Ok(())
    }

    /// Whole samples per period of `divisor` cycles, at least one.
    fn period_length(&self, waveform: Waveform, divisor: f64) -> Result<usize, AudioError> {
        let length = (f64::from(self.sample_rate) / (divisor * self.frequency)) as usize;
        if length == 0 {
            return Err(AudioError::InvalidConfiguration(format!(
                "{} Hz is too high for a {waveform} wave at {} Hz",
                self.frequency, self.sample_rate
            )));
        }
        Ok(length)
    }
}

/// Generate `waveform` using the thread-local RNG for the noise kinds.
pub fn generate(waveform: Waveform, params: &SynthParams) -> Result<Vec<f32>, AudioError> {
    generate_with_rng(waveform, params, &mut rand::thread_rng())
}

pub fn generate_with_rng<R: Rng + ?Sized>(
    waveform: Waveform,
    params: &SynthParams,
    rng: &mut R,
) -> Result<Vec<f32>, AudioError> {
    params.validate(waveform)?;
    let count = params.sample_count();
    let volume = params.volume;
    let rate = f64::from(params.sample_rate);

    let samples = match waveform {
        Waveform::Sine => {
            let step = std::f64::consts::TAU * params.frequency / rate;
            (0..count)
                .map(|x| (step * x as f64).sin() as f32 * volume)
                .collect()
        }
        Waveform::Square => {
            let half_cycles_per_sample = 2.0 * params.frequency / rate;
            (0..count)
                .map(|x| {
                    if (half_cycles_per_sample * x as f64) as u64 & 1 == 1 {
                        volume
                    } else {
                        -volume
                    }
                })
                .collect()
        }
        Waveform::Triangle => {
            let half_period = params.period_length(waveform, 2.0)?;
            (0..count)
                .map(|x| {
                    let factor = (x % half_period) as f32 / half_period as f32;
                    if (x / half_period) & 1 == 1 {
                        (1.0 - 2.0 * factor) * volume
                    } else {
                        (-1.0 + 2.0 * factor) * volume
                    }
                })
                .collect()
        }
        Waveform::FrontTriangle => {
            let period = params.period_length(waveform, 1.0)?;
            (0..count)
                .map(|x| {
                    let factor = (x % period) as f32 / period as f32;
                    (-1.0 + 2.0 * factor) * volume
                })
                .collect()
        }
        Waveform::WhiteNoise => (0..count)
            .map(|_| rng.gen_range(-1.0f32..=1.0) * volume)
            .collect(),
        Waveform::SplitNoise => split_noise(params, count, rng),
    };
    Ok(samples)
}

fn split_noise<R: Rng + ?Sized>(params: &SynthParams, count: usize, rng: &mut R) -> Vec<f32> {
    let distance = (params.frequency as usize).max(1);
    let mut samples = vec![0.0f32; count];
    for x in (0..count).step_by(distance) {
        samples[x] = rng.gen_range(-1.0f32..=1.0) * params.volume;
    }

    for x in 0..count {
        if x % distance == 0 {
            continue;
        }
        let first = x - x % distance;
        let second = first + distance;
        // no right-hand point past the end
        samples[x] = if second >= count {
            0.0
        } else {
            let t = (x - first) as f32 / distance as f32;
            (1.0 - t) * samples[first] + t * samples[second]
        };
    }

    if params.fade_out && count > 0 {
        for (x, sample) in samples.iter_mut().enumerate() {
            *sample *= (count - x) as f32 / count as f32;
        }
    }
    samples
}
