//! Power unit conversions and physical constants.

use num_complex::Complex64;

/// Planck constant (J·s).
pub const PLANCK: f64 = 6.626_070_15e-34;
/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;
/// Elementary charge (C).
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;
/// Boltzmann constant (J/K).
pub const BOLTZMANN: f64 = 1.380_649e-23;

pub fn dbm_to_watts(dbm: f64) -> f64 {
    1e-3 * 10f64.powf(dbm / 10.0)
}

/// Returns `-inf` for zero power.
pub fn watts_to_dbm(watts: f64) -> f64 {
    10.0 * (watts / 1e-3).log10()
}

pub fn db_to_linear(db: f64) -> f64 {
    10f64.powf(db / 10.0)
}

pub fn linear_to_db(linear: f64) -> f64 {
    10.0 * linear.log10()
}

/// Mean of |x|² over the buffer, zero for an empty buffer.
pub fn average_power(signal: &[Complex64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|s| s.norm_sqr()).sum::<f64>() / signal.len() as f64
}

/// Scales a buffer so that its average power is one.
pub fn normalize_power(signal: &[Complex64]) -> Vec<Complex64> {
    let power = average_power(signal);
    if power <= 0.0 {
        return signal.to_vec();
    }
    let scale = 1.0 / power.sqrt();
    signal.iter().map(|s| s * scale).collect()
}
