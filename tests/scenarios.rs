use board_safety as bs;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn default_ride_margins() {
    let m = bs::calculate_safety_margins(&bs::BoardState::default(), &bs::SafetyConfig::default());

    assert!(close(m.duty_headroom, 20.731707317));
    assert!(close(m.current_headroom, 58.333333333));
    assert!(close(m.voltage_margin, 50.0));
    assert!(close(m.thermal_margin, 43.75));
    // Tightest margin is duty at ~20.7, inside the (15, 30] band.
    assert_eq!(m.overall_risk, bs::RiskLevel::High);
    assert_eq!(m.warnings.len(), 1);
    assert!(m.warnings[0].ends_with("approaching limit"));
}

#[test]
fn hill_from_default_ride() {
    let s = bs::apply_scenario(&bs::BoardState::default(), bs::ScenarioId::Hill);
    assert!(close(s.duty, 0.7475));
    assert!(close(s.current, 30.0));
    assert_eq!(s.incline, 10.0);
    assert_eq!(s.pitch, 0.0);
}

#[test]
fn nosedive_from_tight_duty() {
    let margins = bs::SafetyMargins {
        duty_headroom: 10.0,
        current_headroom: 50.0,
        voltage_margin: 80.0,
        thermal_margin: 100.0,
        overall_risk: bs::RiskLevel::Critical,
        warnings: Vec::new(),
    };
    let risk = bs::get_nosedive_risk(&margins);
    assert_eq!(risk.probability, 85);
    assert_eq!(risk.label, "Critical");
    assert_eq!(risk.color, bs::RiskColor::Red);
}

#[test]
fn zero_duty_tiltback_does_not_panic() {
    let config = bs::SafetyConfig {
        tiltback_duty: 0.0,
        ..Default::default()
    };
    let state = bs::BoardState {
        duty: 0.0,
        ..Default::default()
    };
    let m = bs::calculate_safety_margins(&state, &config);
    assert_eq!(m.duty_headroom, 0.0);
    assert!(!m.duty_headroom.is_nan());
    assert_eq!(m.overall_risk, bs::RiskLevel::Critical);
}

#[test]
fn equal_voltage_thresholds_do_not_panic() {
    let config = bs::SafetyConfig {
        tiltback_lv: 3.5,
        tiltback_hv: 3.5,
        ..Default::default()
    };
    let m = bs::calculate_safety_margins(&bs::BoardState::default(), &config);
    assert_eq!(m.voltage_margin, 0.0);
}

#[test]
fn default_parameters_score_100() {
    assert_eq!(bs::get_safety_score(&Default::default()), 100);
}

#[test]
fn voltage_window_boundaries() {
    let cfg = bs::SafetyConfig::default();
    let at = |voltage| {
        bs::calculate_safety_margins(
            &bs::BoardState {
                voltage,
                ..Default::default()
            },
            &cfg,
        )
        .voltage_margin
    };
    assert_eq!(at(cfg.tiltback_lv), 0.0);
    assert!(close(at(cfg.tiltback_hv), 100.0));
}

#[test]
fn duty_at_tiltback_has_no_headroom() {
    let cfg = bs::SafetyConfig::default();
    let state = bs::BoardState {
        duty: cfg.tiltback_duty,
        ..Default::default()
    };
    assert_eq!(bs::calculate_safety_margins(&state, &cfg).duty_headroom, 0.0);
}

#[test]
fn every_scenario_report_from_ride_file() {
    let ride = <bs::RideFile as bs::ConfigLoader>::from_toml_str(
        "[config]\nmotor_current_max = 80.0\n\n[state]\nduty = 0.5\ncurrent = 20.0\n",
    )
    .unwrap();

    for scenario in bs::ScenarioId::ALL {
        let r = bs::evaluate_scenario(&ride.state, scenario, &ride.config);
        assert_eq!(r.scenario, scenario);
        assert!(r.state.duty <= 1.0);
        assert!(r.margins.overall_risk >= bs::RiskLevel::Low);
    }

    let normal = bs::evaluate_scenario(&ride.state, bs::ScenarioId::Normal, &ride.config);
    assert!(close(normal.margins.current_headroom, 75.0));
}

#[test]
fn noisy_trace_is_reproducible() {
    let truth = bs::apply_scenario(&bs::BoardState::default(), bs::ScenarioId::Headwind);
    let cfg = bs::SafetyConfig::default();

    let run = |seed| {
        let mut sampler = bs::TelemetrySampler::new(seed);
        (0..20)
            .map(|_| bs::calculate_safety_margins(&sampler.sample(&truth), &cfg).overall_risk)
            .collect::<Vec<_>>()
    };
    assert_eq!(run(9), run(9));
}
