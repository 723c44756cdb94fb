//! Radix-2 discrete Fourier transform and the text histogram rendered from it.

use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

use crate::models::error::AudioError;

/// Number of adjacent bins summed into one histogram cell.
pub const HISTOGRAM_COMPRESS_FACTOR: usize = 21;

/// Intensity ramp, quietest first.
pub const HISTOGRAM_CHARS: &[u8] = b" .:+*#@";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    pub fn from_polar(magnitude: f64, phase: f64) -> Self {
        Self::new(magnitude * phase.cos(), magnitude * phase.sin())
    }

    pub fn magnitude(self) -> f64 {
        self.re.hypot(self.im)
    }
}

impl Add for Complex {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

/// Forward DFT of real samples. The input length must be a power of two.
pub fn fourier_transform(samples: &[f32]) -> Result<Vec<Complex>, AudioError> {
    let n = samples.len();
    if n == 0 || !n.is_power_of_two() {
        return Err(AudioError::InvalidConfiguration(format!(
            "fourier width must be a nonzero power of two (got {n})"
        )));
    }
    let input: Vec<Complex> = samples
        .iter()
        .map(|&s| Complex::new(f64::from(s), 0.0))
        .collect();
    let mut output = vec![Complex::default(); n];
    transform_recursive(&input, 0, 1, n, &mut output, 0);
    Ok(output)
}

fn transform_recursive(
    input: &[Complex],
    start: usize,
    stride: usize,
    count: usize,
    output: &mut [Complex],
    out_start: usize,
) {
    if count == 1 {
        output[out_start] = input[start];
        return;
    }

    let half = count / 2;
    transform_recursive(input, start, stride * 2, half, output, out_start);
    transform_recursive(input, start + stride, stride * 2, half, output, out_start + half);

    for k in 0..half {
        let index = out_start + k;
        let twiddle = Complex::from_polar(1.0, -2.0 * PI * k as f64 / count as f64);
        let odd = twiddle * output[index + half];
        let even = output[index];
        output[index] = even + odd;
        output[index + half] = even - odd;
    }
}

/// Render one histogram line from a window of samples.
///
/// Bin magnitudes are summed in groups of [`HISTOGRAM_COMPRESS_FACTOR`] and
/// each cell is scaled against the loudest one onto [`HISTOGRAM_CHARS`].
pub fn histogram_line(samples: &[f32]) -> Result<String, AudioError> {
    let bins = fourier_transform(samples)?;

    let cell_count = bins.len().div_ceil(HISTOGRAM_COMPRESS_FACTOR);
    let mut cells = vec![0.0f64; cell_count];
    for (i, bin) in bins.iter().enumerate() {
        cells[i / HISTOGRAM_COMPRESS_FACTOR] += bin.magnitude();
    }
    let max = cells.iter().copied().fold(0.0f64, f64::max);

    let levels = HISTOGRAM_CHARS.len();
    let line = cells
        .iter()
        .map(|&cell| {
            let class = if max > 0.0 {
                ((cell * levels as f64 / max) as usize).min(levels - 1)
            } else {
                0
            };
            char::from(HISTOGRAM_CHARS[class])
        })
        .collect();
    Ok(line)
}
