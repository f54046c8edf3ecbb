//! FFT helpers and power spectral density estimation.

use num_complex::Complex64;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Forward DFT, unnormalized.
pub fn fft(input: &[Complex64]) -> Vec<Complex64> {
    let mut buffer = input.to_vec();
    if buffer.is_empty() {
        return buffer;
    }
    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(buffer.len()).process(&mut buffer);
    buffer
}

/// Inverse DFT, scaled by `1/N` so that `ifft(fft(x)) == x`.
pub fn ifft(input: &[Complex64]) -> Vec<Complex64> {
    let mut buffer = input.to_vec();
    if buffer.is_empty() {
        return buffer;
    }
    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_inverse(buffer.len()).process(&mut buffer);
    let scale = 1.0 / buffer.len() as f64;
    for sample in buffer.iter_mut() {
        *sample *= scale;
    }
    buffer
}

/// Bin frequencies in FFT order: `0, df, ..., -df`.
pub fn fft_frequencies(n: usize, sample_rate: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let df = sample_rate / n as f64;
    (0..n)
        .map(|k| {
            if k <= (n - 1) / 2 {
                k as f64 * df
            } else {
                (k as f64 - n as f64) * df
            }
        })
        .collect()
}

/// Two-sided power spectral density with ascending frequency axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerSpectrum {
    pub frequencies_hz: Vec<f64>,
    /// Power per hertz.
    pub density: Vec<f64>,
}

impl PowerSpectrum {
    /// Integral of the density over frequency.
    pub fn total_power(&self) -> f64 {
        if self.frequencies_hz.len() < 2 {
            return 0.0;
        }
        let df = self.frequencies_hz[1] - self.frequencies_hz[0];
        self.density.iter().sum::<f64>() * df
    }

    pub fn density_db(&self) -> Vec<f64> {
        self.density
            .iter()
            .map(|d| 10.0 * d.max(1e-300).log10())
            .collect()
    }
}

/// Welch estimate with a Hann window and 50 % overlap.
///
/// `segment_len` is clipped to the signal length.
pub fn welch_psd(signal: &[Complex64], sample_rate: f64, segment_len: usize) -> PowerSpectrum {
    let segment_len = segment_len.min(signal.len());
    if segment_len < 2 {
        return PowerSpectrum::default();
    }
    let step = (segment_len / 2).max(1);
    let window: Vec<f64> = (0..segment_len)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / segment_len as f64).cos())
        .collect();
    let window_power: f64 = window.iter().map(|w| w * w).sum();

    let mut planner = FftPlanner::<f64>::new();
    let plan = planner.plan_fft_forward(segment_len);

    let mut accumulated = vec![0.0; segment_len];
    let mut segments = 0usize;
    let mut start = 0;
    while start + segment_len <= signal.len() {
        let mut buffer: Vec<Complex64> = signal[start..start + segment_len]
            .iter()
            .zip(&window)
            .map(|(s, w)| s * w)
            .collect();
        plan.process(&mut buffer);
        for (acc, bin) in accumulated.iter_mut().zip(&buffer) {
            *acc += bin.norm_sqr();
        }
        segments += 1;
        start += step;
    }

    let scale = 1.0 / (segments as f64 * sample_rate * window_power);
    let frequencies = fft_frequencies(segment_len, sample_rate);

    let mut pairs: Vec<(f64, f64)> = frequencies
        .into_iter()
        .zip(accumulated.into_iter().map(|p| p * scale))
        .collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    PowerSpectrum {
        frequencies_hz: pairs.iter().map(|p| p.0).collect(),
        density: pairs.iter().map(|p| p.1).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fft_round_trip() {
        let signal: Vec<Complex64> = (0..37)
            .map(|i| Complex64::new((i as f64 * 0.3).sin(), (i as f64 * 0.7).cos()))
            .collect();
        let back = ifft(&fft(&signal));
        for (a, b) in signal.iter().zip(&back) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_fft_frequencies_layout() {
        let f = fft_frequencies(4, 8.0);
        assert_eq!(f, vec![0.0, 2.0, -4.0, -2.0]);
        let f = fft_frequencies(5, 5.0);
        assert_eq!(f, vec![0.0, 1.0, 2.0, -2.0, -1.0]);
    }

    #[test]
    fn test_welch_preserves_power_and_locates_tone() {
        let fs = 1e6;
        let f0 = 125e3;
        let signal: Vec<Complex64> = (0..8192)
            .map(|i| Complex64::from_polar(2.0, 2.0 * PI * f0 * i as f64 / fs))
            .collect();
        let psd = welch_psd(&signal, fs, 1024);

        assert_eq!(psd.frequencies_hz.len(), 1024);
        assert!(psd.frequencies_hz.windows(2).all(|w| w[0] < w[1]));
        assert!((psd.total_power() - 4.0).abs() / 4.0 < 0.05, "power {}", psd.total_power());

        let peak = psd
            .density
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| psd.frequencies_hz[i])
            .unwrap();
        assert!((peak - f0).abs() < 1e3);
    }
}
