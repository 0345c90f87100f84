use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::BoardState;

/// Named load transients used for "what if" evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "String")]
pub enum ScenarioId {
    #[default]
    Normal,
    Hill,
    Acceleration,
    Bump,
    Headwind,
    LowBattery,
}

/// How a scenario perturbs a base state. `None` leaves the field untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenarioEffect {
    /// Multiplier on duty; the result is capped at 1.0.
    pub duty_factor: Option<f64>,
    pub current_factor: f64,
    pub pitch: Option<f64>,
    pub voltage: Option<f64>,
    pub incline: Option<f64>,
}

const UNCHANGED: ScenarioEffect = ScenarioEffect {
    duty_factor: None,
    current_factor: 1.0,
    pitch: None,
    voltage: None,
    incline: None,
};

impl ScenarioId {
    pub const ALL: [ScenarioId; 6] = [
        ScenarioId::Normal,
        ScenarioId::Hill,
        ScenarioId::Acceleration,
        ScenarioId::Bump,
        ScenarioId::Headwind,
        ScenarioId::LowBattery,
    ];

    /// Wire identifier, e.g. `"lowBattery"`.
    pub fn id(self) -> &'static str {
        match self {
            ScenarioId::Normal => "normal",
            ScenarioId::Hill => "hill",
            ScenarioId::Acceleration => "acceleration",
            ScenarioId::Bump => "bump",
            ScenarioId::Headwind => "headwind",
            ScenarioId::LowBattery => "lowBattery",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScenarioId::Normal => "Normal Cruise",
            ScenarioId::Hill => "Uphill",
            ScenarioId::Acceleration => "Hard Accel",
            ScenarioId::Bump => "Hit a Bump",
            ScenarioId::Headwind => "Headwind",
            ScenarioId::LowBattery => "Low Battery",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ScenarioId::Normal => "Flat ground, steady speed",
            ScenarioId::Hill => "10% grade increases duty ~15%",
            ScenarioId::Acceleration => "Aggressive acceleration",
            ScenarioId::Bump => "Sudden current spike",
            ScenarioId::Headwind => "Fighting the wind",
            ScenarioId::LowBattery => "Near LV threshold",
        }
    }

    /// Strict lookup by wire identifier.
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    /// Lenient lookup: anything unrecognised behaves like `Normal`.
    pub fn from_id(id: &str) -> Self {
        Self::parse(id).unwrap_or_else(|| {
            warn!(scenario = id, "unknown scenario, using normal");
            ScenarioId::Normal
        })
    }

    pub fn effect(self) -> ScenarioEffect {
        match self {
            ScenarioId::Normal => UNCHANGED,
            ScenarioId::Hill => ScenarioEffect {
                duty_factor: Some(1.15),
                current_factor: 1.2,
                incline: Some(10.0),
                ..UNCHANGED
            },
            ScenarioId::Acceleration => ScenarioEffect {
                duty_factor: Some(1.12),
                current_factor: 1.4,
                pitch: Some(-3.0),
                ..UNCHANGED
            },
            ScenarioId::Bump => ScenarioEffect {
                duty_factor: Some(1.25),
                current_factor: 1.6,
                pitch: Some(-5.0),
                ..UNCHANGED
            },
            ScenarioId::Headwind => ScenarioEffect {
                duty_factor: Some(1.08),
                current_factor: 1.15,
                ..UNCHANGED
            },
            // Less power available near the cutoff.
            ScenarioId::LowBattery => ScenarioEffect {
                current_factor: 0.9,
                voltage: Some(3.1),
                ..UNCHANGED
            },
        }
    }
}

impl From<&str> for ScenarioId {
    fn from(id: &str) -> Self {
        Self::from_id(id)
    }
}

impl From<String> for ScenarioId {
    fn from(id: String) -> Self {
        Self::from_id(&id)
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Derive the state a rider would see under `scenario`. Fields the scenario does not
/// touch are copied from `base`.
pub fn apply_scenario(base: &BoardState, scenario: ScenarioId) -> BoardState {
    let effect = scenario.effect();
    let mut out = *base;

    if let Some(k) = effect.duty_factor {
        out.duty = (base.duty * k).min(1.0);
    }
    out.current = base.current * effect.current_factor;
    if let Some(p) = effect.pitch {
        out.pitch = p;
    }
    if let Some(v) = effect.voltage {
        out.voltage = v;
    }
    if let Some(i) = effect.incline {
        out.incline = i;
    }

    out
}
