//! Windowed-sinc low-pass design used to band-limit detector outputs.

use super::pulse::convolve_same;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Hamming window of the given length.
pub fn hamming_window(length: usize) -> Vec<f64> {
    if length <= 1 {
        return vec![1.0; length];
    }
    let m = (length - 1) as f64;
    (0..length)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / m).cos())
        .collect()
}

/// Linear-phase low-pass taps with unity DC gain.
///
/// `cutoff_hz` is the -6 dB point. `num_taps` should be odd so the filter
/// delay is a whole number of samples.
pub fn lowpass_taps(cutoff_hz: f64, sample_rate: f64, num_taps: usize) -> Vec<f64> {
    let fc = cutoff_hz / sample_rate;
    let m = (num_taps.max(1) - 1) as f64 / 2.0;
    let window = hamming_window(num_taps);

    let mut taps: Vec<f64> = (0..num_taps)
        .map(|i| {
            let x = i as f64 - m;
            let ideal = if x.abs() < 1e-12 {
                2.0 * fc
            } else {
                (2.0 * PI * fc * x).sin() / (PI * x)
            };
            ideal * window[i]
        })
        .collect();

    let sum: f64 = taps.iter().sum();
    if sum.abs() > 1e-12 {
        for t in &mut taps {
            *t /= sum;
        }
    }
    taps
}

/// Band-limits `signal` to `cutoff_hz`. A cutoff at or above Nyquist leaves
/// the signal untouched.
pub fn lowpass(signal: &[Complex64], cutoff_hz: f64, sample_rate: f64, num_taps: usize) -> Vec<Complex64> {
    if cutoff_hz >= sample_rate / 2.0 {
        return signal.to_vec();
    }
    let taps = lowpass_taps(cutoff_hz, sample_rate, num_taps);
    convolve_same(signal, &taps)
}
