//! Tunable controller parameters and a conservatism score over them.
//!
//! The score here rates a static configuration. It is deliberately separate from the
//! live headroom calculation in the `safety` crate.

mod catalog;

pub use catalog::{
    parameter, parameters_by_category, safety_parameters, Category, Parameter, SafetyImpact,
    PARAMETERS,
};

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("unknown parameter: {0}")]
    Unknown(String),
}

/// Current value for every catalog parameter.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterValues {
    values: BTreeMap<String, f64>,
}

impl Default for ParameterValues {
    fn default() -> Self {
        Self {
            values: PARAMETERS
                .iter()
                .map(|p| (p.id.to_string(), p.default))
                .collect(),
        }
    }
}

impl ParameterValues {
    pub fn get(&self, id: &str) -> Option<f64> {
        self.values.get(id).copied()
    }

    /// Store `value` clamped to the parameter's range and return what was stored.
    pub fn set(&mut self, id: &str, value: f64) -> Result<f64, ParameterError> {
        let param = parameter(id).ok_or_else(|| ParameterError::Unknown(id.to_string()))?;
        let clamped = param.clamp(value);
        if clamped != value {
            debug!(id, requested = value, stored = clamped, "parameter clamped to range");
        }
        self.values.insert(id.to_string(), clamped);
        Ok(clamped)
    }

    pub fn reset(&mut self, id: &str) -> Result<(), ParameterError> {
        let param = parameter(id).ok_or_else(|| ParameterError::Unknown(id.to_string()))?;
        self.values.insert(id.to_string(), param.default);
        Ok(())
    }

    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    /// Distance from the default as a percentage of the parameter's full range.
    /// Unknown ids report 0.
    pub fn delta(&self, id: &str) -> f64 {
        let Some(param) = parameter(id) else {
            return 0.0;
        };
        let value = self.get(id).unwrap_or(param.default);
        (value - param.default) / (param.max - param.min) * 100.0
    }

    pub fn safety_score(&self) -> u8 {
        get_safety_score(&self.values)
    }
}

// Missing, zero and NaN all count as "not set".
fn value_or(values: &BTreeMap<String, f64>, id: &str, default: f64) -> f64 {
    match values.get(id) {
        Some(&v) if v != 0.0 && !v.is_nan() => v,
        _ => default,
    }
}

/// Additive-penalty score in 0..=100; higher means a more conservative setup.
pub fn get_safety_score(values: &BTreeMap<String, f64>) -> u8 {
    let mut score: i32 = 100;

    // Lower duty tiltback leaves more headroom.
    let duty = value_or(values, "tiltback_duty", 0.82);
    if duty > 0.90 {
        score -= 30;
    } else if duty > 0.85 {
        score -= 15;
    } else if duty < 0.80 {
        score += 5;
    }

    let speed = value_or(values, "tiltback_speed", 30.0);
    if speed > 40.0 {
        score -= 20;
    } else if speed > 35.0 {
        score -= 10;
    } else if speed < 25.0 {
        score += 5;
    }

    // More booster current means more surge reserve.
    let booster = value_or(values, "booster_current", 15.0);
    if booster < 10.0 {
        score -= 15;
    } else if booster > 20.0 {
        score += 5;
    }

    let lv = value_or(values, "tiltback_lv", 3.2);
    if lv < 3.0 {
        score -= 20;
    } else if lv > 3.3 {
        score += 5;
    }

    score.clamp(0, 100) as u8
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SafetyGrade {
    LowRisk,
    Moderate,
    Elevated,
    HighRisk,
}

impl SafetyGrade {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => SafetyGrade::LowRisk,
            60..=79 => SafetyGrade::Moderate,
            40..=59 => SafetyGrade::Elevated,
            _ => SafetyGrade::HighRisk,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SafetyGrade::LowRisk => "LOW RISK",
            SafetyGrade::Moderate => "MODERATE",
            SafetyGrade::Elevated => "ELEVATED",
            SafetyGrade::HighRisk => "HIGH RISK",
        }
    }

    pub fn advice(self) -> &'static str {
        match self {
            SafetyGrade::LowRisk => "Your settings prioritize safety. Good for learning.",
            SafetyGrade::Moderate => "Balanced settings. Suitable for experienced riders.",
            SafetyGrade::Elevated => "Aggressive settings. Know your limits.",
            SafetyGrade::HighRisk => "Very aggressive. High nosedive risk!",
        }
    }
}
