//! Gaussian noise draws from an explicit, caller-owned generator.

use num_complex::Complex64;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Zero-mean real Gaussian samples with the given variance.
///
/// A non-positive or non-finite variance yields zeros without consuming any
/// randomness.
pub fn gaussian_real<R: Rng + ?Sized>(count: usize, variance: f64, rng: &mut R) -> Vec<f64> {
    match normal(variance) {
        Some(dist) => (0..count).map(|_| dist.sample(rng)).collect(),
        None => vec![0.0; count],
    }
}

/// Circularly-symmetric complex Gaussian samples with total power `power`
/// (each quadrature carries `power / 2`).
pub fn gaussian_complex<R: Rng + ?Sized>(count: usize, power: f64, rng: &mut R) -> Vec<Complex64> {
    match normal(power / 2.0) {
        Some(dist) => (0..count)
            .map(|_| Complex64::new(dist.sample(rng), dist.sample(rng)))
            .collect(),
        None => vec![Complex64::new(0.0, 0.0); count],
    }
}

fn normal(variance: f64) -> Option<Normal<f64>> {
    if !(variance.is_finite() && variance > 0.0) {
        return None;
    }
    Normal::new(0.0, variance.sqrt()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_real_noise_statistics() {
        let mut rng = StdRng::seed_from_u64(42);
        let samples = gaussian_real(100_000, 0.25, &mut rng);
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!(mean.abs() < 0.01, "mean {}", mean);
        assert!((variance - 0.25).abs() < 0.01, "variance {}", variance);
    }

    #[test]
    fn test_complex_noise_power() {
        let mut rng = StdRng::seed_from_u64(3);
        let samples = gaussian_complex(100_000, 2.0, &mut rng);
        let power = samples.iter().map(|s| s.norm_sqr()).sum::<f64>() / samples.len() as f64;
        let re_var = samples.iter().map(|s| s.re * s.re).sum::<f64>() / samples.len() as f64;
        assert!((power - 2.0).abs() < 0.05, "power {}", power);
        assert!((re_var - 1.0).abs() < 0.03, "re variance {}", re_var);
    }

    #[test]
    fn test_zero_variance_is_silent() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(gaussian_real(16, 0.0, &mut rng).iter().all(|&x| x == 0.0));
        assert!(gaussian_complex(16, -1.0, &mut rng)
            .iter()
            .all(|x| x.norm() == 0.0));
    }
}
