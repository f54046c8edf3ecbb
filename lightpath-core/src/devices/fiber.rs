//! Single-mode fiber: attenuation then chromatic dispersion, applied in the
//! frequency domain as `H(w) = exp(j * beta2 / 2 * w^2 * L)`.

use crate::dsp::spectrum::{fft, fft_frequencies, ifft};
use crate::error::LightpathError;
use crate::units::SPEED_OF_LIGHT;
use lightpath_schemas::channel::{ChannelParameters, FiberParameters};
use lightpath_schemas::StageModel;
use num_complex::Complex64;
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq)]
pub struct FiberChannel {
    fiber: Option<FiberParameters>,
    carrier_hz: f64,
    sample_rate: f64,
}

impl FiberChannel {
    pub fn new(channel: &ChannelParameters, carrier_hz: f64, sample_rate: f64) -> Result<Self, LightpathError> {
        let fiber = match channel {
            StageModel::Ideal => None,
            StageModel::Modeled(fiber) => {
                validate(fiber)?;
                Some(fiber.clone())
            }
        };
        Ok(Self {
            fiber,
            carrier_hz,
            sample_rate,
        })
    }

    /// The same fiber cut to `fraction` of its length. Used when an amplifier
    /// sits at the midpoint of the span.
    pub fn section(&self, fraction: f64) -> Self {
        Self {
            fiber: self.fiber.as_ref().map(|f| f.section(fraction)),
            ..self.clone()
        }
    }

    pub fn is_ideal(&self) -> bool {
        self.fiber.is_none()
    }

    pub fn loss_db(&self) -> f64 {
        self.fiber.as_ref().map_or(0.0, FiberParameters::total_loss_db)
    }

    /// Field amplitude factor `10^(-loss/20)`.
    pub fn amplitude_scale(&self) -> f64 {
        10f64.powf(-self.loss_db() / 20.0)
    }

    /// Group velocity dispersion `beta2` in s²/m.
    pub fn beta2(&self) -> f64 {
        let Some(fiber) = &self.fiber else {
            return 0.0;
        };
        let wavelength = SPEED_OF_LIGHT / self.carrier_hz;
        // ps/(nm km) -> s/m²
        let d = fiber.dispersion_ps_per_nm_km * 1e-6;
        -d * wavelength * wavelength / (2.0 * PI * SPEED_OF_LIGHT)
    }

    pub fn propagate(&self, input: &[Complex64]) -> Vec<Complex64> {
        let Some(fiber) = &self.fiber else {
            return input.to_vec();
        };

        let scale = self.amplitude_scale();
        let attenuated: Vec<Complex64> = input.iter().map(|s| s * scale).collect();

        let length_m = fiber.length_km * 1e3;
        let beta2 = self.beta2();
        if beta2 == 0.0 || length_m == 0.0 || attenuated.is_empty() {
            return attenuated;
        }

        let spectrum = fft(&attenuated);
        let dispersed: Vec<Complex64> = spectrum
            .iter()
            .zip(fft_frequencies(spectrum.len(), self.sample_rate))
            .map(|(bin, f)| {
                let omega = 2.0 * PI * f;
                bin * Complex64::from_polar(1.0, beta2 / 2.0 * omega * omega * length_m)
            })
            .collect();
        ifft(&dispersed)
    }
}

fn validate(fiber: &FiberParameters) -> Result<(), LightpathError> {
    if !(fiber.length_km.is_finite() && fiber.length_km >= 0.0) {
        return Err(LightpathError::invalid("channel", "fiber length must be non-negative"));
    }
    if !(fiber.attenuation_db_per_km.is_finite() && fiber.attenuation_db_per_km >= 0.0) {
        return Err(LightpathError::invalid("channel", "attenuation must be non-negative"));
    }
    if !fiber.dispersion_ps_per_nm_km.is_finite() {
        return Err(LightpathError::invalid("channel", "dispersion must be finite"));
    }
    Ok(())
}
