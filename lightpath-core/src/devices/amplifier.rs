//! Lumped optical amplifier (EDFA) with optional ASE noise.

use crate::dsp::noise::gaussian_complex;
use crate::error::LightpathError;
use crate::units::{average_power, db_to_linear, watts_to_dbm, PLANCK};
use lightpath_schemas::amplifier::{AmplifierParameters, AmplifierPosition};
use lightpath_schemas::StageModel;
use num_complex::Complex64;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct OpticalAmplifier {
    position: AmplifierPosition,
    gain: f64,
    noise_figure: Option<f64>,
    detection_floor_dbm: Option<f64>,
    carrier_hz: f64,
    sample_rate: f64,
}

/// Output power fell below the configured detection floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BelowFloor {
    pub power_dbm: f64,
    pub floor_dbm: f64,
}

impl OpticalAmplifier {
    pub fn new(params: &AmplifierParameters, carrier_hz: f64, sample_rate: f64) -> Result<Self, LightpathError> {
        if !params.gain_db.is_finite() {
            return Err(LightpathError::invalid("amplifier", "gain must be a finite dB value"));
        }
        if let Some(floor) = params.detection_floor_dbm {
            if !floor.is_finite() {
                return Err(LightpathError::invalid("amplifier", "detection floor must be finite"));
            }
        }
        let noise_figure = match &params.noise {
            StageModel::Ideal => None,
            StageModel::Modeled(ase) => {
                if !(ase.noise_figure_db.is_finite() && ase.noise_figure_db >= 0.0) {
                    return Err(LightpathError::invalid("amplifier", "noise figure must be at least 0 dB"));
                }
                Some(db_to_linear(ase.noise_figure_db))
            }
        };

        Ok(Self {
            position: params.position,
            gain: db_to_linear(params.gain_db),
            noise_figure,
            detection_floor_dbm: params.detection_floor_dbm,
            carrier_hz,
            sample_rate,
        })
    }

    pub fn position(&self) -> AmplifierPosition {
        self.position
    }

    /// Linear power gain.
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// ASE power over the simulation bandwidth, `(G * NF - 1) / 2 * h * f * Fs`.
    pub fn ase_power(&self) -> f64 {
        match self.noise_figure {
            None => 0.0,
            Some(nf) => {
                let excess = ((self.gain * nf - 1.0) / 2.0).max(0.0);
                excess * PLANCK * self.carrier_hz * self.sample_rate
            }
        }
    }

    pub fn amplify<R: Rng + ?Sized>(&self, input: &[Complex64], rng: &mut R) -> Vec<Complex64> {
        let field_gain = self.gain.sqrt();
        let ase = gaussian_complex(input.len(), self.ase_power(), rng);
        input
            .iter()
            .zip(ase)
            .map(|(s, n)| s * field_gain + n)
            .collect()
    }

    /// Checks the amplified signal against the detection floor, if any.
    pub fn check_floor(&self, output: &[Complex64]) -> Option<BelowFloor> {
        let floor_dbm = self.detection_floor_dbm?;
        let power_dbm = watts_to_dbm(average_power(output));
        (power_dbm < floor_dbm).then_some(BelowFloor { power_dbm, floor_dbm })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightpath_schemas::amplifier::AseNoise;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(gain_db: f64, noise: StageModel<AseNoise>) -> AmplifierParameters {
        AmplifierParameters {
            position: AmplifierPosition::End,
            gain_db,
            detection_floor_dbm: Some(-30.0),
            noise,
        }
    }

    #[test]
    fn test_ideal_gain() {
        let amp = OpticalAmplifier::new(&params(20.0, StageModel::Ideal), 193.1e12, 1e10).unwrap();
        let input = vec![Complex64::new(0.01, 0.0); 64];
        let output = amp.amplify(&input, &mut StdRng::seed_from_u64(0));
        let ratio = average_power(&output) / average_power(&input);
        assert!((ratio - 100.0).abs() < 1e-9);
        assert_eq!(amp.ase_power(), 0.0);
    }

    #[test]
    fn test_ase_power_formula() {
        let amp = OpticalAmplifier::new(
            &params(20.0, StageModel::Modeled(AseNoise { noise_figure_db: 5.0 })),
            193.1e12,
            1e10,
        )
        .unwrap();
        let nf = 10f64.powf(0.5);
        let expected = (100.0 * nf - 1.0) / 2.0 * PLANCK * 193.1e12 * 1e10;
        assert!((amp.ase_power() - expected).abs() / expected < 1e-12);

        let silent = vec![Complex64::new(0.0, 0.0); 100_000];
        let noise = amp.amplify(&silent, &mut StdRng::seed_from_u64(11));
        let measured = average_power(&noise);
        assert!((measured - expected).abs() / expected < 0.03, "ASE {} vs {}", measured, expected);
    }

    #[test]
    fn test_detection_floor() {
        let amp = OpticalAmplifier::new(&params(0.0, StageModel::Ideal), 193.1e12, 1e10).unwrap();
        // -40 dBm is below the -30 dBm floor.
        let weak = vec![Complex64::new(1e-7f64.sqrt(), 0.0); 16];
        let hit = amp.check_floor(&weak).unwrap();
        assert!((hit.power_dbm + 40.0).abs() < 1e-9);
        assert_eq!(hit.floor_dbm, -30.0);

        let strong = vec![Complex64::new(1e-3f64.sqrt(), 0.0); 16];
        assert!(amp.check_floor(&strong).is_none());
    }
}
