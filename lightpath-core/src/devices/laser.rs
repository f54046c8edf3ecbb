//! Continuous-wave laser source.
//!
//! The noisy variant draws phase noise and intensity noise independently for
//! every sample: `E[n] = sqrt(P) * exp(j * phi[n]) + r[n]` with
//! `phi ~ N(0, 2*pi*linewidth/symbol_rate)` and `r ~ N(0, rin_variance)`.
//! The phase draws are memoryless. A physical laser accumulates phase as a
//! Wiener process, so this model underestimates low-frequency phase wander.

use crate::dsp::noise::gaussian_real;
use crate::error::LightpathError;
use crate::units::dbm_to_watts;
use lightpath_schemas::{source::SourceParameters, StageModel};
use num_complex::Complex64;
use rand::Rng;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
struct SourceNoise {
    phase_variance: f64,
    rin_variance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaserSource {
    power_w: f64,
    frequency_hz: f64,
    noise: Option<SourceNoise>,
}

impl LaserSource {
    pub fn new(params: &SourceParameters, symbol_rate: f64) -> Result<Self, LightpathError> {
        if !params.power_dbm.is_finite() {
            return Err(LightpathError::invalid("source", "power must be a finite dBm value"));
        }
        if !(params.frequency_thz.is_finite() && params.frequency_thz > 0.0) {
            return Err(LightpathError::invalid("source", "carrier frequency must be positive"));
        }

        let noise = match &params.noise {
            StageModel::Ideal => None,
            StageModel::Modeled(noise) => {
                if !(noise.linewidth_hz.is_finite() && noise.linewidth_hz >= 0.0) {
                    return Err(LightpathError::invalid("source", "linewidth must be non-negative"));
                }
                if !(noise.rin_variance.is_finite() && noise.rin_variance >= 0.0) {
                    return Err(LightpathError::invalid("source", "RIN variance must be non-negative"));
                }
                Some(SourceNoise {
                    phase_variance: 2.0 * PI * noise.linewidth_hz / symbol_rate,
                    rin_variance: noise.rin_variance,
                })
            }
        };

        Ok(Self {
            power_w: dbm_to_watts(params.power_dbm),
            frequency_hz: params.frequency_hz(),
            noise,
        })
    }

    pub fn power_w(&self) -> f64 {
        self.power_w
    }

    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    /// Noiseless field amplitude, `sqrt(P)`.
    pub fn amplitude(&self) -> f64 {
        self.power_w.sqrt()
    }

    pub fn is_ideal(&self) -> bool {
        self.noise.is_none()
    }

    /// Per-sample phase noise variance in rad², zero for the ideal source.
    pub fn phase_noise_variance(&self) -> f64 {
        self.noise.map_or(0.0, |n| n.phase_variance)
    }

    pub fn rin_variance(&self) -> f64 {
        self.noise.map_or(0.0, |n| n.rin_variance)
    }

    /// Generates `num_samples` of the optical carrier.
    pub fn emit<R: Rng + ?Sized>(&self, num_samples: usize, rng: &mut R) -> Vec<Complex64> {
        let amplitude = self.amplitude();
        match self.noise {
            None => vec![Complex64::new(amplitude, 0.0); num_samples],
            Some(noise) => {
                let phase = gaussian_real(num_samples, noise.phase_variance, rng);
                let intensity = gaussian_real(num_samples, noise.rin_variance, rng);
                phase
                    .into_iter()
                    .zip(intensity)
                    .map(|(phi, r)| Complex64::from_polar(amplitude, phi) + r)
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightpath_schemas::source::LaserNoise;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(noise: StageModel<LaserNoise>) -> SourceParameters {
        SourceParameters {
            power_dbm: 10.0,
            frequency_thz: 193.1,
            noise,
        }
    }

    #[test]
    fn test_ideal_laser_is_constant() {
        let laser = LaserSource::new(&params(StageModel::Ideal), 1e9).unwrap();
        let field = laser.emit(1000, &mut StdRng::seed_from_u64(1));

        let expected = 0.01f64.sqrt();
        assert!(field.iter().all(|s| s.re == expected && s.im == 0.0));
        assert_eq!(laser.phase_noise_variance(), 0.0);
    }

    #[test]
    fn test_noisy_laser_matches_configured_statistics() {
        let linewidth = 100e3;
        let symbol_rate = 1e6;
        let laser = LaserSource::new(
            &params(StageModel::Modeled(LaserNoise {
                linewidth_hz: linewidth,
                rin_variance: 0.0,
            })),
            symbol_rate,
        )
        .unwrap();
        let field = laser.emit(200_000, &mut StdRng::seed_from_u64(9));

        let expected_variance = 2.0 * PI * linewidth / symbol_rate;
        let phases: Vec<f64> = field.iter().map(|s| s.arg()).collect();
        let mean = phases.iter().sum::<f64>() / phases.len() as f64;
        let variance = phases.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / phases.len() as f64;

        assert!(mean.abs() < 0.01);
        assert!(
            (variance - expected_variance).abs() / expected_variance < 0.03,
            "variance {} vs {}",
            variance,
            expected_variance
        );
        // Pure phase noise leaves the magnitude untouched.
        assert!(field.iter().all(|s| (s.norm() - 0.1).abs() < 1e-12));
    }

    #[test]
    fn test_rin_variance_matches() {
        let laser = LaserSource::new(
            &params(StageModel::Modeled(LaserNoise {
                linewidth_hz: 0.0,
                rin_variance: 1e-6,
            })),
            1e9,
        )
        .unwrap();
        let field = laser.emit(200_000, &mut StdRng::seed_from_u64(5));
        let deviations: Vec<f64> = field.iter().map(|s| s.re - 0.1).collect();
        let variance = deviations.iter().map(|d| d * d).sum::<f64>() / deviations.len() as f64;
        assert!((variance - 1e-6).abs() / 1e-6 < 0.03, "variance {}", variance);
        assert!(field.iter().all(|s| s.im == 0.0));
    }

    #[test]
    fn test_rejects_negative_linewidth() {
        let result = LaserSource::new(
            &params(StageModel::Modeled(LaserNoise {
                linewidth_hz: -1.0,
                rin_variance: 0.0,
            })),
            1e9,
        );
        assert!(matches!(result, Err(LightpathError::InvalidParameter { stage: "source", .. })));
    }
}
