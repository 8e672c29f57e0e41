//! Proportional thermal model
//!
//! Each step moves the temperature a fixed fraction of the way to the
//! setpoint and derives the actuator power a proportional controller would
//! apply. Outside the deadband the power is `gap * power_gain`, clamped to
//! `±power_limit`; inside it the actuator is idle.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::noise::NoiseSource;

/// Parameters of the synthetic thermal model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalModel {
    /// Fraction of the setpoint gap closed per step
    pub approach_rate: f64,
    /// Standard deviation of the measurement noise, degrees Celsius
    pub noise_stdev: f64,
    /// Power per degree of gap
    pub power_gain: f64,
    /// Gap below which the actuator is idle
    pub deadband: f64,
    /// Actuator saturation
    pub power_limit: f64,
}

impl Default for ThermalModel {
    fn default() -> Self {
        Self {
            approach_rate: 0.01,
            noise_stdev: 0.05,
            power_gain: 50.0,
            deadband: 1.0,
            power_limit: 255.0,
        }
    }
}

/// Result of one model step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalStep {
    pub temperature: f64,
    pub power: f64,
}

impl ThermalModel {
    /// Advance one step from `temperature` toward `setpoint`
    pub fn step(&self, temperature: f64, setpoint: f64, noise: &mut dyn NoiseSource) -> ThermalStep {
        let gap = setpoint - temperature;
        let temperature = temperature + gap * self.approach_rate + noise.sample(self.noise_stdev);
        let power = self.power_for_gap(gap);

        trace!(gap, temperature, power, "thermal step");
        ThermalStep { temperature, power }
    }

    /// Actuator power for a given setpoint gap
    pub fn power_for_gap(&self, gap: f64) -> f64 {
        if gap.abs() >= self.deadband {
            (gap * self.power_gain).clamp(-self.power_limit, self.power_limit)
        } else {
            0.0
        }
    }
}
