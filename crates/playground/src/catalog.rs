use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Balance,
    Safety,
    Motor,
    Filter,
}

/// How much a bad value for this parameter can hurt the rider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyImpact {
    None,
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Parameter {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub step: f64,
    pub unit: &'static str,
    pub description: &'static str,
    pub safety_impact: SafetyImpact,
}

impl Parameter {
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

pub static PARAMETERS: [Parameter; 10] = [
    Parameter {
        id: "kp",
        name: "Proportional Gain (Kp)",
        category: Category::Balance,
        min: 0.1,
        max: 2.0,
        default: 0.8,
        step: 0.05,
        unit: "",
        description: "How aggressively the board responds to pitch changes. Higher = stiffer, lower = floatier.",
        safety_impact: SafetyImpact::Medium,
    },
    Parameter {
        id: "ki",
        name: "Integral Gain (Ki)",
        category: Category::Balance,
        min: 0.0,
        max: 0.5,
        default: 0.005,
        step: 0.001,
        unit: "",
        description: "Accumulates error over time. Helps maintain level on hills.",
        safety_impact: SafetyImpact::Low,
    },
    Parameter {
        id: "mahony_kp",
        name: "Mahony Filter Kp",
        category: Category::Filter,
        min: 0.1,
        max: 1.0,
        default: 0.4,
        step: 0.05,
        unit: "",
        description: "IMU filter responsiveness. Lower = smoother, higher = quicker response.",
        safety_impact: SafetyImpact::Medium,
    },
    Parameter {
        id: "tiltback_duty",
        name: "Duty Tiltback Threshold",
        category: Category::Safety,
        min: 0.7,
        max: 1.0,
        default: 0.82,
        step: 0.01,
        unit: "%",
        description: "Motor duty at which pushback activates. Lower = more safety margin.",
        safety_impact: SafetyImpact::Critical,
    },
    Parameter {
        id: "tiltback_duty_angle",
        name: "Duty Tiltback Angle",
        category: Category::Safety,
        min: 1.0,
        max: 20.0,
        default: 10.0,
        step: 1.0,
        unit: "°",
        description: "How much nose lifts when pushback activates.",
        safety_impact: SafetyImpact::High,
    },
    Parameter {
        id: "tiltback_speed",
        name: "Speed Tiltback (km/h)",
        category: Category::Safety,
        min: 15.0,
        max: 50.0,
        default: 30.0,
        step: 1.0,
        unit: "km/h",
        description: "Speed at which pushback activates.",
        safety_impact: SafetyImpact::Critical,
    },
    Parameter {
        id: "tiltback_lv",
        name: "Low Voltage Threshold",
        category: Category::Safety,
        min: 2.8,
        max: 3.4,
        default: 3.2,
        step: 0.1,
        unit: "V/cell",
        description: "Per-cell voltage that triggers LV pushback.",
        safety_impact: SafetyImpact::Critical,
    },
    Parameter {
        id: "atr_strength_up",
        name: "ATR Strength (Accel)",
        category: Category::Balance,
        min: 0.0,
        max: 3.0,
        default: 1.0,
        step: 0.1,
        unit: "",
        description: "Nose-down tilt when accelerating. Higher = more aggressive lean.",
        safety_impact: SafetyImpact::Medium,
    },
    Parameter {
        id: "atr_strength_down",
        name: "ATR Strength (Decel)",
        category: Category::Balance,
        min: 0.0,
        max: 3.0,
        default: 0.8,
        step: 0.1,
        unit: "",
        description: "Nose-up tilt when braking.",
        safety_impact: SafetyImpact::Medium,
    },
    Parameter {
        id: "booster_current",
        name: "Booster Current",
        category: Category::Safety,
        min: 0.0,
        max: 30.0,
        default: 15.0,
        step: 1.0,
        unit: "A",
        description: "Extra current when nose drops unexpectedly. Surge protection.",
        safety_impact: SafetyImpact::High,
    },
];

pub fn parameter(id: &str) -> Option<&'static Parameter> {
    PARAMETERS.iter().find(|p| p.id == id)
}

pub fn parameters_by_category(category: Category) -> impl Iterator<Item = &'static Parameter> {
    PARAMETERS.iter().filter(move |p| p.category == category)
}

/// Parameters whose misconfiguration is rated high or critical.
pub fn safety_parameters() -> impl Iterator<Item = &'static Parameter> {
    PARAMETERS
        .iter()
        .filter(|p| p.safety_impact >= SafetyImpact::High)
}
