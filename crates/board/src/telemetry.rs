use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::BoardState;

/// Per-channel standard deviation of reading noise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseProfile {
    pub duty_std: f64,
    pub current_std: f64,
    pub voltage_std: f64,
    pub temp_std: f64,
}

impl Default for NoiseProfile {
    fn default() -> Self {
        Self {
            duty_std: 0.01,
            current_std: 1.5,
            voltage_std: 0.01,
            temp_std: 0.25,
        }
    }
}

impl NoiseProfile {
    pub fn silent() -> Self {
        Self {
            duty_std: 0.0,
            current_std: 0.0,
            voltage_std: 0.0,
            temp_std: 0.0,
        }
    }
}

/// Seeded source of noisy telemetry, so trace runs are reproducible.
#[derive(Clone, Debug)]
pub struct TelemetrySampler {
    pub noise: NoiseProfile,
    rng: StdRng,
    samples: u64,
}

impl TelemetrySampler {
    pub fn new(seed: u64) -> Self {
        Self {
            noise: NoiseProfile::default(),
            rng: StdRng::seed_from_u64(seed),
            samples: 0,
        }
    }

    pub fn with_noise(mut self, noise: NoiseProfile) -> Self {
        self.noise = noise;
        self
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Read `truth` through noisy sensors. Duty stays within 0..=1 and current
    /// never goes negative; speed, pitch and incline pass through.
    pub fn sample(&mut self, truth: &BoardState) -> BoardState {
        self.samples += 1;
        let n = self.noise;

        BoardState {
            duty: (truth.duty + self.jitter(n.duty_std)).clamp(0.0, 1.0),
            current: (truth.current + self.jitter(n.current_std)).max(0.0),
            voltage: truth.voltage + self.jitter(n.voltage_std),
            mosfet_temp: truth.mosfet_temp + self.jitter(n.temp_std),
            motor_temp: truth.motor_temp + self.jitter(n.temp_std),
            ..*truth
        }
    }

    fn jitter(&mut self, std: f64) -> f64 {
        if std.is_nan() || std <= 0.0 {
            return 0.0;
        }
        match Normal::new(0.0, std) {
            Ok(normal) => normal.sample(&mut self.rng),
            Err(_) => 0.0,
        }
    }
}
