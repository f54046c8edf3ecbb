//! Electro-optic modulators.
//!
//! All three models act on the optical carrier sample by sample. `transfer`
//! gives the field gain for a single drive value on a unit carrier, which is
//! what the reference constellation is built from.

use crate::error::LightpathError;
use lightpath_schemas::modulator::ModulatorParameters;
use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

#[derive(Debug, Clone, PartialEq)]
pub struct Modulator {
    params: ModulatorParameters,
}

impl Modulator {
    pub fn new(params: ModulatorParameters) -> Result<Self, LightpathError> {
        let v_pi = params.v_pi();
        if !(v_pi.is_finite() && v_pi > 0.0) {
            return Err(LightpathError::invalid("modulator", "V_pi must be positive"));
        }
        let biases_finite = match &params {
            ModulatorParameters::Pm { .. } => true,
            ModulatorParameters::Mzm { bias, .. } => bias.is_finite(),
            ModulatorParameters::Iqm { bias_i, bias_q, .. } => bias_i.is_finite() && bias_q.is_finite(),
        };
        if !biases_finite {
            return Err(LightpathError::invalid("modulator", "bias voltages must be finite"));
        }
        Ok(Self { params })
    }

    pub fn parameters(&self) -> &ModulatorParameters {
        &self.params
    }

    pub fn name(&self) -> &'static str {
        self.params.name()
    }

    /// Field gain applied to a unit carrier for drive value `u`.
    ///
    /// PM and MZM are single-drive devices and only see `u.re`.
    pub fn transfer(&self, u: Complex64) -> Complex64 {
        match self.params {
            ModulatorParameters::Pm { v_pi } => Complex64::from_polar(1.0, PI * u.re / v_pi),
            ModulatorParameters::Mzm { v_pi, bias } => Complex64::new(arm(u.re, bias, v_pi), 0.0),
            ModulatorParameters::Iqm { v_pi, bias_i, bias_q } => {
                Complex64::new(arm(u.re, bias_i, v_pi), arm(u.im, bias_q, v_pi)) * FRAC_1_SQRT_2
            }
        }
    }

    /// Impresses `drive` onto `carrier`. Both must have the same length.
    pub fn modulate(&self, carrier: &[Complex64], drive: &[Complex64]) -> Result<Vec<Complex64>, LightpathError> {
        if carrier.len() != drive.len() {
            return Err(LightpathError::LengthMismatch {
                stage: "modulator",
                expected: carrier.len(),
                actual: drive.len(),
            });
        }
        Ok(carrier
            .iter()
            .zip(drive)
            .map(|(c, u)| c * self.transfer(*u))
            .collect())
    }
}

/// One Mach-Zehnder arm in push-pull: `cos(pi * (u + bias) / (2 * V_pi))`.
fn arm(u: f64, bias: f64, v_pi: f64) -> f64 {
    (PI * (u + bias) / (2.0 * v_pi)).cos()
}
