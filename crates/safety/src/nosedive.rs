use serde::Serialize;

use crate::SafetyMargins;

/// Display colour shared by headroom bars and the nosedive gauge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskColor {
    Green,
    Lime,
    Yellow,
    Orange,
    Red,
}

impl RiskColor {
    pub fn hex(self) -> &'static str {
        match self {
            RiskColor::Green => "#22c55e",
            RiskColor::Lime => "#84cc16",
            RiskColor::Yellow => "#eab308",
            RiskColor::Orange => "#f97316",
            RiskColor::Red => "#ef4444",
        }
    }

    pub fn for_margin(margin: f64) -> Self {
        bucket(margin).color
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NosediveRisk {
    /// Percent.
    pub probability: u8,
    pub label: &'static str,
    pub color: RiskColor,
}

// Checked top-down, first strict `>` match wins.
const BUCKETS: [(f64, NosediveRisk); 4] = [
    (60.0, NosediveRisk { probability: 5, label: "Very Low", color: RiskColor::Green }),
    (40.0, NosediveRisk { probability: 15, label: "Low", color: RiskColor::Lime }),
    (25.0, NosediveRisk { probability: 35, label: "Moderate", color: RiskColor::Yellow }),
    (15.0, NosediveRisk { probability: 60, label: "High", color: RiskColor::Orange }),
];

const CRITICAL: NosediveRisk = NosediveRisk {
    probability: 85,
    label: "Critical",
    color: RiskColor::Red,
};

fn bucket(margin: f64) -> NosediveRisk {
    BUCKETS
        .iter()
        .find(|(floor, _)| margin > *floor)
        .map(|(_, risk)| *risk)
        .unwrap_or(CRITICAL)
}

/// Estimate nosedive likelihood from duty, current and voltage headroom.
///
/// Thermal margin is not part of this estimate.
pub fn get_nosedive_risk(margins: &SafetyMargins) -> NosediveRisk {
    let min_margin = margins
        .duty_headroom
        .min(margins.current_headroom)
        .min(margins.voltage_margin);
    bucket(min_margin)
}
