//! Optical receivers.
//!
//! A photodiode produces `R * |E|^2` (real current, carried in the real part).
//! The coherent receiver mixes with a unit local oscillator and keeps the
//! complex baseband `R * E`. Noise is added after detection and the result is
//! band-limited by a Hamming-windowed FIR of `8 * sps + 1` taps.

use crate::dsp::filter::lowpass;
use crate::dsp::noise::{gaussian_complex, gaussian_real};
use crate::error::LightpathError;
use crate::units::{BOLTZMANN, ELEMENTARY_CHARGE};
use lightpath_schemas::receiver::{ReceiverKind, ReceiverParameters, ReceiverResponse};
use lightpath_schemas::StageModel;
use num_complex::Complex64;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    kind: ReceiverKind,
    responsivity: f64,
    sensitivity_dbm: Option<f64>,
    response: Option<ReceiverResponse>,
    sample_rate: f64,
    filter_taps: usize,
}

impl Receiver {
    pub fn new(params: &ReceiverParameters, sample_rate: f64, samples_per_symbol: usize) -> Result<Self, LightpathError> {
        if !(params.responsivity_a_per_w.is_finite() && params.responsivity_a_per_w > 0.0) {
            return Err(LightpathError::invalid("receiver", "responsivity must be positive"));
        }
        if let Some(s) = params.sensitivity_dbm {
            if !s.is_finite() {
                return Err(LightpathError::invalid("receiver", "sensitivity must be finite"));
            }
        }
        let response = match &params.response {
            StageModel::Ideal => None,
            StageModel::Modeled(response) => {
                if !(response.bandwidth_hz.is_finite() && response.bandwidth_hz > 0.0) {
                    return Err(LightpathError::invalid("receiver", "bandwidth must be positive"));
                }
                if let Some(thermal) = &response.thermal_noise {
                    if !(thermal.temperature_k.is_finite() && thermal.temperature_k >= 0.0) {
                        return Err(LightpathError::invalid("receiver", "temperature must be non-negative"));
                    }
                    if !(thermal.load_resistance_ohm.is_finite() && thermal.load_resistance_ohm > 0.0) {
                        return Err(LightpathError::invalid("receiver", "load resistance must be positive"));
                    }
                }
                Some(response.clone())
            }
        };

        Ok(Self {
            kind: params.kind,
            responsivity: params.responsivity_a_per_w,
            sensitivity_dbm: params.sensitivity_dbm,
            response,
            sample_rate,
            filter_taps: 8 * samples_per_symbol + 1,
        })
    }

    pub fn kind(&self) -> ReceiverKind {
        self.kind
    }

    pub fn sensitivity_dbm(&self) -> Option<f64> {
        self.sensitivity_dbm
    }

    /// Noiseless detector law for a single field sample.
    pub fn detect_point(&self, field: Complex64) -> Complex64 {
        match self.kind {
            ReceiverKind::Photodiode => Complex64::new(self.responsivity * field.norm_sqr(), 0.0),
            ReceiverKind::Coherent => field * self.responsivity,
        }
    }

    /// Mean detector output for a field accompanied by zero-mean optical noise
    /// of power `noise_power`. Square-law detection turns that noise into a
    /// DC offset; coherent detection averages it out.
    pub fn mean_response(&self, field: Complex64, noise_power: f64) -> Complex64 {
        match self.kind {
            ReceiverKind::Photodiode => self.detect_point(field) + self.responsivity * noise_power,
            ReceiverKind::Coherent => self.detect_point(field),
        }
    }

    /// Variance of the additive current noise for a given mean photocurrent.
    pub fn noise_variance(&self, mean_current: f64) -> f64 {
        let Some(response) = &self.response else {
            return 0.0;
        };
        let bandwidth = response.bandwidth_hz;
        let shot = if response.shot_noise {
            2.0 * ELEMENTARY_CHARGE * mean_current.abs() * bandwidth
        } else {
            0.0
        };
        let thermal = response.thermal_noise.as_ref().map_or(0.0, |t| {
            4.0 * BOLTZMANN * t.temperature_k * bandwidth / t.load_resistance_ohm
        });
        shot + thermal
    }

    pub fn detect<R: Rng + ?Sized>(&self, input: &[Complex64], rng: &mut R) -> Vec<Complex64> {
        let current: Vec<Complex64> = input.iter().map(|e| self.detect_point(*e)).collect();
        let Some(response) = &self.response else {
            return current;
        };

        let mean_current = if current.is_empty() {
            0.0
        } else {
            self.responsivity * input.iter().map(|e| e.norm_sqr()).sum::<f64>() / input.len() as f64
        };
        let variance = self.noise_variance(mean_current);

        let noisy: Vec<Complex64> = match self.kind {
            ReceiverKind::Photodiode => current
                .iter()
                .zip(gaussian_real(current.len(), variance, rng))
                .map(|(i, n)| i + n)
                .collect(),
            ReceiverKind::Coherent => current
                .iter()
                .zip(gaussian_complex(current.len(), variance, rng))
                .map(|(i, n)| i + n)
                .collect(),
        };

        lowpass(&noisy, response.bandwidth_hz, self.sample_rate, self.filter_taps)
    }
}
