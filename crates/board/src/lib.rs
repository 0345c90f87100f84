//! Ride telemetry for self-balancing boards.
//!
//! `BoardState` is a plain snapshot of what the controller reports at one instant.
//! Scenarios derive perturbed snapshots from it; the sampler adds sensor noise for
//! trace runs.

mod scenario;
mod telemetry;

pub use scenario::{apply_scenario, ScenarioEffect, ScenarioId};
pub use telemetry::{NoiseProfile, TelemetrySampler};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct BoardState {
    /// km/h
    pub speed: f64,
    /// 0..=1 fraction of motor capacity in use
    pub duty: f64,
    /// Motor current (A)
    pub current: f64,
    /// Per-cell battery voltage
    pub voltage: f64,
    /// Controller temperature (°C)
    pub mosfet_temp: f64,
    /// Motor temperature (°C)
    pub motor_temp: f64,
    /// Board tilt in degrees, negative = nose-down
    pub pitch: f64,
    /// Ground slope in degrees. Informational only.
    pub incline: f64,
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            speed: 20.0,
            duty: 0.65,
            current: 25.0,
            voltage: 3.7,
            mosfet_temp: 45.0,
            motor_temp: 55.0,
            pitch: 0.0,
            incline: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_matches_cruise_snapshot() {
        let s = BoardState::default();
        assert_eq!(s.speed, 20.0);
        assert_eq!(s.duty, 0.65);
        assert_eq!(s.current, 25.0);
        assert_eq!(s.voltage, 3.7);
        assert_eq!(s.mosfet_temp, 45.0);
        assert_eq!(s.motor_temp, 55.0);
        assert_eq!(s.pitch, 0.0);
        assert_eq!(s.incline, 0.0);
    }
}
