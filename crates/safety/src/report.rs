use board::{apply_scenario, BoardState, ScenarioId};
use serde::Serialize;

use crate::{calculate_safety_margins, get_nosedive_risk, NosediveRisk, SafetyConfig, SafetyMargins};

/// Before/after view of one scenario against a base ride.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub scenario: ScenarioId,
    pub name: &'static str,
    pub description: &'static str,
    pub state: BoardState,
    pub base_margins: SafetyMargins,
    pub margins: SafetyMargins,
    pub nosedive: NosediveRisk,
}

pub fn evaluate_scenario(
    base: &BoardState,
    scenario: ScenarioId,
    config: &SafetyConfig,
) -> ScenarioReport {
    let state = apply_scenario(base, scenario);
    let margins = calculate_safety_margins(&state, config);
    ScenarioReport {
        scenario,
        name: scenario.name(),
        description: scenario.description(),
        state,
        base_margins: calculate_safety_margins(base, config),
        nosedive: get_nosedive_risk(&margins),
        margins,
    }
}
