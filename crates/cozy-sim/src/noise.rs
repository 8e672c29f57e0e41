//! Measurement noise sources

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of zero-mean measurement noise
pub trait NoiseSource: Send {
    /// Draw one sample with the given standard deviation
    fn sample(&mut self, stdev: f64) -> f64;
}

/// Gaussian noise from a seedable RNG
#[derive(Debug, Clone)]
pub struct GaussianNoise {
    rng: StdRng,
}

impl GaussianNoise {
    /// Noise seeded from the operating system
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible noise for tests and replays
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for GaussianNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseSource for GaussianNoise {
    fn sample(&mut self, stdev: f64) -> f64 {
        // Box-Muller; u1 is kept in (0, 1] so ln() stays finite
        let u1 = 1.0 - self.rng.random::<f64>();
        let u2 = self.rng.random::<f64>();
        stdev * (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
    }
}

/// No noise at all
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl NoiseSource for Silent {
    fn sample(&mut self, _stdev: f64) -> f64 {
        0.0
    }
}
