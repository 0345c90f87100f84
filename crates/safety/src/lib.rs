//! Safety headroom for self-balancing boards.
//!
//! Turns a telemetry snapshot plus the configured tiltback/limit thresholds into
//! headroom percentages, a risk class and rider-facing warnings. Every calculation
//! here is total: degenerate thresholds yield zero headroom rather than NaN.

mod error;
mod nosedive;
mod report;
mod ride;

pub use error::ConfigError;
pub use nosedive::{get_nosedive_risk, NosediveRisk, RiskColor};
pub use report::{evaluate_scenario, ScenarioReport};
pub use ride::{ConfigLoader, RideFile};

use board::BoardState;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SafetyConfig {
    /// Duty fraction at which pushback starts.
    pub tiltback_duty: f64,
    /// km/h
    pub tiltback_speed: f64,
    /// Per-cell low voltage tiltback. Must be below `tiltback_hv`.
    pub tiltback_lv: f64,
    pub tiltback_hv: f64,
    pub motor_current_max: f64,
    pub battery_current_max: f64,
    pub mosfet_temp_max: f64,
    pub motor_temp_max: f64,
    // Carried for firmware 6.05+ configs; not used by the margin math.
    pub fault_adc_half_erpm: f64,
    pub surge_duty_start: f64,
    pub simple_stop_erpm: f64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            tiltback_duty: 0.82,
            tiltback_speed: 30.0,
            tiltback_lv: 3.2,
            tiltback_hv: 4.2,
            motor_current_max: 60.0,
            battery_current_max: 30.0,
            mosfet_temp_max: 80.0,
            motor_temp_max: 100.0,
            fault_adc_half_erpm: 0.0,
            surge_duty_start: 0.85,
            simple_stop_erpm: 200.0,
        }
    }
}

impl SafetyConfig {
    /// Reject thresholds that make the margin math degenerate.
    ///
    /// `calculate_safety_margins` accepts any config; this is for input boundaries
    /// such as ride files.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tiltback_duty.is_nan() || self.tiltback_duty <= 0.0 || self.tiltback_duty > 1.0 {
            return Err(ConfigError::Validation(format!(
                "tiltback_duty must be in (0, 1], got {}",
                self.tiltback_duty
            )));
        }
        if self.tiltback_lv.is_nan() || self.tiltback_hv.is_nan() || self.tiltback_lv >= self.tiltback_hv {
            return Err(ConfigError::Validation(format!(
                "tiltback_lv ({}) must be below tiltback_hv ({})",
                self.tiltback_lv, self.tiltback_hv
            )));
        }
        for (name, v) in [
            ("motor_current_max", self.motor_current_max),
            ("mosfet_temp_max", self.mosfet_temp_max),
            ("motor_temp_max", self.motor_temp_max),
        ] {
            if v.is_nan() || v <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be positive, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Step function over the smallest margin. No hysteresis.
    pub fn from_min_margin(min_margin: f64) -> Self {
        if min_margin > 50.0 {
            RiskLevel::Low
        } else if min_margin > 30.0 {
            RiskLevel::Medium
        } else if min_margin > 15.0 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyMargins {
    pub duty_headroom: f64,
    pub current_headroom: f64,
    /// Always within 0..=100.
    pub voltage_margin: f64,
    /// Lower of the MOSFET and motor temperature margins.
    pub thermal_margin: f64,
    pub overall_risk: RiskLevel,
    /// In evaluation order: duty, current, voltage, thermal.
    pub warnings: Vec<String>,
}

impl SafetyMargins {
    pub fn min_margin(&self) -> f64 {
        self.duty_headroom
            .min(self.current_headroom)
            .min(self.voltage_margin)
            .min(self.thermal_margin)
    }
}

/// Percent of `limit` still unused by `value`, floored at 0. A non-positive limit
/// leaves no headroom.
fn headroom(limit: f64, value: f64) -> f64 {
    if limit.is_nan() || limit <= 0.0 {
        return 0.0;
    }
    // f64::max drops a NaN operand, so bad readings floor to 0 as well.
    ((limit - value) / limit * 100.0).max(0.0)
}

fn voltage_margin(voltage: f64, lv: f64, hv: f64) -> f64 {
    let range = hv - lv;
    if range.is_nan() || range <= 0.0 {
        return 0.0;
    }
    ((voltage - lv) / range * 100.0).max(0.0).min(100.0)
}

/// Whole-number text for warnings. Ties round toward +inf, so 52.5 reads "53".
fn whole(value: f64) -> String {
    format!("{:.0}", (value + 0.5).floor())
}

pub fn calculate_safety_margins(state: &BoardState, config: &SafetyConfig) -> SafetyMargins {
    let mut warnings = Vec::new();

    let duty_headroom = headroom(config.tiltback_duty, state.duty);
    if duty_headroom < 15.0 {
        warnings.push(format!("Duty at {}% - pushback imminent!", whole(state.duty * 100.0)));
    } else if duty_headroom < 25.0 {
        warnings.push(format!("Duty at {}% - approaching limit", whole(state.duty * 100.0)));
    }

    let current_headroom = headroom(config.motor_current_max, state.current);
    if current_headroom < 20.0 {
        warnings.push(format!("Current at {}A - near motor limit", whole(state.current)));
    }

    let voltage_margin = voltage_margin(state.voltage, config.tiltback_lv, config.tiltback_hv);
    if voltage_margin < 20.0 {
        warnings.push(format!("Voltage at {:.2}V/cell - LV warning!", state.voltage));
    } else if voltage_margin < 35.0 {
        warnings.push(format!("Battery at {}% - consider charging", whole(voltage_margin)));
    }

    let mosfet_margin = headroom(config.mosfet_temp_max, state.mosfet_temp);
    let motor_temp_margin = headroom(config.motor_temp_max, state.motor_temp);
    let thermal_margin = mosfet_margin.min(motor_temp_margin);
    if thermal_margin < 20.0 {
        warnings.push(format!("Temperature critical - {}°C MOSFET", state.mosfet_temp));
    }

    let mut margins = SafetyMargins {
        duty_headroom,
        current_headroom,
        voltage_margin,
        thermal_margin,
        overall_risk: RiskLevel::Low,
        warnings,
    };
    margins.overall_risk = RiskLevel::from_min_margin(margins.min_margin());
    margins
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn default_ride_has_duty_as_tightest_margin() {
        let m = calculate_safety_margins(&BoardState::default(), &SafetyConfig::default());
        assert!(close(m.duty_headroom, 17.0 / 0.82));
        assert!(close(m.current_headroom, 35.0 / 60.0 * 100.0));
        assert!(close(m.voltage_margin, 50.0));
        assert!(close(m.thermal_margin, 43.75));
        assert_eq!(m.overall_risk, RiskLevel::High);
        assert_eq!(m.warnings, vec!["Duty at 65% - approaching limit".to_string()]);
    }

    #[test]
    fn calm_ride_has_no_warnings() {
        let state = BoardState {
            duty: 0.3,
            current: 10.0,
            voltage: 4.0,
            mosfet_temp: 30.0,
            motor_temp: 30.0,
            ..BoardState::default()
        };
        let m = calculate_safety_margins(&state, &SafetyConfig::default());
        assert!(m.warnings.is_empty());
        assert_eq!(m.overall_risk, RiskLevel::Low);
    }

    #[test]
    fn warnings_follow_evaluation_order() {
        let state = BoardState {
            duty: 0.8,
            current: 55.0,
            voltage: 3.25,
            mosfet_temp: 75.0,
            ..BoardState::default()
        };
        let m = calculate_safety_margins(&state, &SafetyConfig::default());
        assert_eq!(
            m.warnings,
            vec![
                "Duty at 80% - pushback imminent!".to_string(),
                "Current at 55A - near motor limit".to_string(),
                "Voltage at 3.25V/cell - LV warning!".to_string(),
                "Temperature critical - 75°C MOSFET".to_string(),
            ]
        );
        assert_eq!(m.overall_risk, RiskLevel::Critical);
    }

    #[test]
    fn battery_between_20_and_35_suggests_charging() {
        let state = BoardState {
            duty: 0.3,
            voltage: 3.5,
            ..BoardState::default()
        };
        let m = calculate_safety_margins(&state, &SafetyConfig::default());
        assert!(close(m.voltage_margin, 30.0));
        assert_eq!(m.warnings, vec!["Battery at 30% - consider charging".to_string()]);
    }

    #[test]
    fn margins_floor_at_zero_and_voltage_caps_at_100() {
        let state = BoardState {
            duty: 0.95,
            current: 90.0,
            voltage: 4.5,
            mosfet_temp: 95.0,
            ..BoardState::default()
        };
        let m = calculate_safety_margins(&state, &SafetyConfig::default());
        assert_eq!(m.duty_headroom, 0.0);
        assert_eq!(m.current_headroom, 0.0);
        assert_eq!(m.voltage_margin, 100.0);
        assert_eq!(m.thermal_margin, 0.0);
    }

    #[test]
    fn negative_current_is_not_ceilinged() {
        let state = BoardState {
            current: -30.0,
            ..BoardState::default()
        };
        let m = calculate_safety_margins(&state, &SafetyConfig::default());
        assert!(close(m.current_headroom, 150.0));
    }

    #[test]
    fn thermal_takes_the_hotter_component() {
        let state = BoardState {
            mosfet_temp: 20.0,
            motor_temp: 90.0,
            ..BoardState::default()
        };
        let m = calculate_safety_margins(&state, &SafetyConfig::default());
        assert!(close(m.thermal_margin, 10.0));
        assert_eq!(m.warnings.last().map(String::as_str), Some("Temperature critical - 20°C MOSFET"));
    }

    #[test]
    fn degenerate_limits_give_zero_headroom() {
        let config = SafetyConfig {
            tiltback_duty: 0.0,
            motor_current_max: 0.0,
            tiltback_hv: 3.2,
            mosfet_temp_max: 0.0,
            ..SafetyConfig::default()
        };
        let state = BoardState {
            duty: 0.0,
            ..BoardState::default()
        };
        let m = calculate_safety_margins(&state, &config);
        assert_eq!(m.duty_headroom, 0.0);
        assert_eq!(m.current_headroom, 0.0);
        assert_eq!(m.voltage_margin, 0.0);
        assert_eq!(m.thermal_margin, 0.0);
        assert_eq!(m.overall_risk, RiskLevel::Critical);
    }

    #[test]
    fn nan_readings_do_not_leak() {
        let state = BoardState {
            duty: f64::NAN,
            voltage: f64::NAN,
            ..BoardState::default()
        };
        let m = calculate_safety_margins(&state, &SafetyConfig::default());
        assert_eq!(m.duty_headroom, 0.0);
        assert_eq!(m.voltage_margin, 0.0);
        assert!(m.min_margin().is_finite());
    }

    #[test]
    fn warning_numbers_round_half_up() {
        let state = BoardState {
            current: 52.5,
            ..BoardState::default()
        };
        let m = calculate_safety_margins(&state, &SafetyConfig::default());
        assert!(m.warnings.contains(&"Current at 53A - near motor limit".to_string()));
        assert_eq!(whole(64.5), "65");
        assert_eq!(whole(-2.5), "-2");
        assert_eq!(whole(0.2), "0");
    }

    #[test]
    fn risk_steps() {
        assert_eq!(RiskLevel::from_min_margin(50.1), RiskLevel::Low);
        assert_eq!(RiskLevel::from_min_margin(50.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_min_margin(30.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_min_margin(15.0), RiskLevel::Critical);
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn validate_rejects_inverted_voltage_window() {
        let cfg = SafetyConfig {
            tiltback_lv: 4.2,
            tiltback_hv: 3.2,
            ..SafetyConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Validation(_))));
        assert!(SafetyConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let cfg = SafetyConfig {
            motor_temp_max: 0.0,
            ..SafetyConfig::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = SafetyConfig {
            tiltback_duty: 1.2,
            ..SafetyConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn margins_serialize_camel_case() {
        let m = calculate_safety_margins(&BoardState::default(), &SafetyConfig::default());
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["overallRisk"], "high");
        assert!(v.get("dutyHeadroom").is_some());
    }
}
