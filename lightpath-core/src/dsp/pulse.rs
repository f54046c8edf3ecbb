//! Upsampling and pulse shaping.
//!
//! Convolutions here run in "same" mode: the output has the length of the
//! input and the kernel is applied centred on index `(L - 1) / 2`. For both
//! supported kernels the centre of symbol `k` therefore lands on sample
//! `k * samples_per_symbol` of the shaped waveform.

use crate::error::LightpathError;
use lightpath_schemas::general::PulseShape;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Zero-insertion upsampling: symbol `k` is placed at sample `k * factor`.
pub fn upsample(symbols: &[Complex64], factor: usize) -> Vec<Complex64> {
    let mut output = vec![Complex64::new(0.0, 0.0); symbols.len() * factor];
    for (k, &symbol) in symbols.iter().enumerate() {
        output[k * factor] = symbol;
    }
    output
}

/// Centred FIR convolution with output length equal to the input length.
///
/// `y[n] = sum_k h[k] * x[n + c - k]` with `c = (h.len() - 1) / 2`.
pub fn convolve_same(input: &[Complex64], kernel: &[f64]) -> Vec<Complex64> {
    let n = input.len();
    let mut output = vec![Complex64::new(0.0, 0.0); n];
    if kernel.is_empty() {
        return output;
    }
    let centre = (kernel.len() - 1) / 2;

    for (m, &x) in input.iter().enumerate() {
        if x.re == 0.0 && x.im == 0.0 {
            continue;
        }
        for (k, &h) in kernel.iter().enumerate() {
            let index = m + k;
            if index < centre {
                continue;
            }
            let index = index - centre;
            if index >= n {
                break;
            }
            output[index] += x * h;
        }
    }
    output
}

/// Converts a symbol sequence into a sampled electrical waveform.
#[derive(Debug, Clone)]
pub struct PulseShaper {
    samples_per_symbol: usize,
    kernel: Vec<f64>,
}

impl PulseShaper {
    pub fn new(shape: PulseShape, samples_per_symbol: usize) -> Result<Self, LightpathError> {
        if samples_per_symbol == 0 {
            return Err(LightpathError::invalid(
                "pulse shaper",
                "samples per symbol must be positive",
            ));
        }

        let kernel = match shape {
            PulseShape::Nrz => vec![1.0; samples_per_symbol],
            PulseShape::Rrc {
                rolloff,
                span_symbols,
            } => {
                if !(0.0..=1.0).contains(&rolloff) {
                    return Err(LightpathError::invalid(
                        "pulse shaper",
                        format!("RRC roll-off {} outside [0, 1]", rolloff),
                    ));
                }
                if span_symbols == 0 {
                    return Err(LightpathError::invalid(
                        "pulse shaper",
                        "RRC span must be at least one symbol",
                    ));
                }
                root_raised_cosine(rolloff, span_symbols, samples_per_symbol)
            }
        };

        Ok(Self {
            samples_per_symbol,
            kernel: normalize_peak(kernel),
        })
    }

    pub fn kernel(&self) -> &[f64] {
        &self.kernel
    }

    pub fn samples_per_symbol(&self) -> usize {
        self.samples_per_symbol
    }

    pub fn shape(&self, symbols: &[Complex64]) -> Vec<Complex64> {
        let upsampled = upsample(symbols, self.samples_per_symbol);
        convolve_same(&upsampled, &self.kernel)
    }
}

fn normalize_peak(mut kernel: Vec<f64>) -> Vec<f64> {
    let peak = kernel.iter().fold(0.0f64, |acc, h| acc.max(h.abs()));
    if peak > 0.0 {
        for h in &mut kernel {
            *h /= peak;
        }
    }
    kernel
}

fn root_raised_cosine(rolloff: f64, span_symbols: usize, samples_per_symbol: usize) -> Vec<f64> {
    let length = span_symbols * samples_per_symbol + 1;
    let delay = (length - 1) as f64 / 2.0;
    let beta = rolloff;

    (0..length)
        .map(|i| {
            let t = (i as f64 - delay) / samples_per_symbol as f64;
            if t.abs() < 1e-12 {
                1.0 - beta + 4.0 * beta / PI
            } else if beta > 0.0 && (t.abs() - 1.0 / (4.0 * beta)).abs() < 1e-12 {
                let arg = PI / (4.0 * beta);
                beta / 2f64.sqrt()
                    * ((1.0 + 2.0 / PI) * arg.sin() + (1.0 - 2.0 / PI) * arg.cos())
            } else {
                let numerator =
                    (PI * t * (1.0 - beta)).sin() + 4.0 * beta * t * (PI * t * (1.0 + beta)).cos();
                let denominator = PI * t * (1.0 - (4.0 * beta * t).powi(2));
                numerator / denominator
            }
        })
        .collect()
}
