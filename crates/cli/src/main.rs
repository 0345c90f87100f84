use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use board::{BoardState, ScenarioId, TelemetrySampler};
use clap::{Args, Parser, Subcommand, ValueEnum};
use playground::{parameters_by_category, Category, ParameterValues, SafetyGrade, PARAMETERS};
use safety::{
    calculate_safety_margins, evaluate_scenario, get_nosedive_risk, ConfigLoader, NosediveRisk,
    RideFile, RiskLevel, SafetyMargins,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "board-safety",
    version,
    about = "Safety headroom and nosedive risk for VESC self-balancing boards"
)]
struct Cli {
    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Margins, warnings and nosedive risk for one ride snapshot
    Margins(MarginsArgs),
    /// Report every scenario against the same base ride
    Scenarios {
        /// TOML ride file with [config] and [state] tables
        #[arg(long)]
        ride: Option<PathBuf>,
    },
    /// Conservatism score of a parameter set
    Score {
        /// Parameter assignment, e.g. --set tiltback_duty=0.9
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, f64)>,
    },
    /// List tunable parameters
    Params {
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
    },
    /// Simulated ride ramping toward a target duty, one JSON row per tick
    Trace(TraceArgs),
}

#[derive(Args, Debug)]
struct MarginsArgs {
    #[arg(long)]
    ride: Option<PathBuf>,

    /// normal, hill, acceleration, bump, headwind or lowBattery
    #[arg(long, default_value = "normal")]
    scenario: String,

    #[command(flatten)]
    overrides: StateOverrides,
}

#[derive(Args, Debug)]
struct StateOverrides {
    /// km/h
    #[arg(long)]
    speed: Option<f64>,
    /// 0..1
    #[arg(long)]
    duty: Option<f64>,
    /// Motor current (A)
    #[arg(long)]
    current: Option<f64>,
    /// Per-cell voltage
    #[arg(long)]
    voltage: Option<f64>,
    #[arg(long)]
    mosfet_temp: Option<f64>,
    #[arg(long)]
    motor_temp: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pitch: Option<f64>,
}

impl StateOverrides {
    fn apply(&self, state: &mut BoardState) {
        let fields = [
            (self.speed, &mut state.speed),
            (self.duty, &mut state.duty),
            (self.current, &mut state.current),
            (self.voltage, &mut state.voltage),
            (self.mosfet_temp, &mut state.mosfet_temp),
            (self.motor_temp, &mut state.motor_temp),
            (self.pitch, &mut state.pitch),
        ];
        for (value, slot) in fields {
            if let Some(v) = value {
                *slot = v;
            }
        }
    }
}

#[derive(Args, Debug)]
struct TraceArgs {
    #[arg(long)]
    ride: Option<PathBuf>,

    #[arg(long, default_value = "normal")]
    scenario: String,

    /// Total ride time in seconds
    #[arg(long, default_value_t = 60.0)]
    seconds: f64,

    /// Fixed time step in milliseconds
    #[arg(long, default_value_t = 100)]
    dt_ms: u64,

    /// Duty reached at the end of the ride
    #[arg(long, default_value_t = 0.95)]
    target_duty: f64,

    /// RNG seed for deterministic runs
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Stop at the first critical evaluation
    #[arg(long)]
    stop_on_critical: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CategoryArg {
    Balance,
    Safety,
    Motor,
    Filter,
}

impl From<CategoryArg> for Category {
    fn from(c: CategoryArg) -> Self {
        match c {
            CategoryArg::Balance => Category::Balance,
            CategoryArg::Safety => Category::Safety,
            CategoryArg::Motor => Category::Motor,
            CategoryArg::Filter => Category::Filter,
        }
    }
}

#[derive(serde::Serialize)]
struct ScoreReport<'a> {
    score: u8,
    grade: &'static str,
    advice: &'static str,
    values: &'a ParameterValues,
}

#[derive(serde::Serialize)]
struct TraceRow {
    t_s: f64,
    state: BoardState,
    margins: SafetyMargins,
    nosedive: NosediveRisk,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Margins(args) => margins(args),
        Command::Scenarios { ride } => scenarios(ride.as_deref()),
        Command::Score { set } => score(&set),
        Command::Params { category } => params(category),
        Command::Trace(args) => trace(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // stdout carries JSON, keep logs on stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_ride(path: Option<&Path>) -> Result<RideFile> {
    match path {
        Some(p) => {
            RideFile::load(p).with_context(|| format!("loading ride file {}", p.display()))
        }
        None => Ok(RideFile::default()),
    }
}

fn parse_assignment(s: &str) -> Result<(String, f64), String> {
    let (id, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected id=value, got `{s}`"))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad value for {id}: {e}"))?;
    Ok((id.trim().to_string(), value))
}

fn margins(args: MarginsArgs) -> Result<()> {
    let mut ride = load_ride(args.ride.as_deref())?;
    args.overrides.apply(&mut ride.state);
    let scenario = ScenarioId::from_id(&args.scenario);

    let report = evaluate_scenario(&ride.state, scenario, &ride.config);
    info!(
        %scenario,
        risk = %report.margins.overall_risk,
        nosedive = report.nosedive.probability,
        "evaluated ride"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn scenarios(ride: Option<&Path>) -> Result<()> {
    let ride = load_ride(ride)?;
    let reports: Vec<_> = ScenarioId::ALL
        .into_iter()
        .map(|s| evaluate_scenario(&ride.state, s, &ride.config))
        .collect();
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

fn score(assignments: &[(String, f64)]) -> Result<()> {
    let mut values = ParameterValues::default();
    for (id, v) in assignments {
        let stored = values.set(id, *v)?;
        debug!(id = %id, stored, "parameter set");
    }

    let score = values.safety_score();
    let grade = SafetyGrade::from_score(score);
    let report = ScoreReport {
        score,
        grade: grade.label(),
        advice: grade.advice(),
        values: &values,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn params(category: Option<CategoryArg>) -> Result<()> {
    let list: Vec<_> = match category {
        Some(c) => parameters_by_category(c.into()).collect(),
        None => PARAMETERS.iter().collect(),
    };
    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}

/// Time step in seconds and tick count for a trace run.
fn trace_steps(seconds: f64, dt_ms: u64) -> Result<(f64, u64)> {
    anyhow::ensure!(
        seconds.is_finite() && seconds > 0.0,
        "--seconds must be a positive finite number"
    );
    anyhow::ensure!(dt_ms > 0, "--dt-ms must be positive");
    let dt_s = (dt_ms as f64) / 1000.0;
    Ok((dt_s, (seconds / dt_s).ceil() as u64))
}

fn trace(args: TraceArgs) -> Result<()> {
    let ride = load_ride(args.ride.as_deref())?;
    let scenario = ScenarioId::from_id(&args.scenario);

    let (dt_s, steps) = trace_steps(args.seconds, args.dt_ms)?;

    let base = ride.state;
    let mut sampler = TelemetrySampler::new(args.seed);
    info!(%scenario, steps, seed = args.seed, "starting trace");

    // Output JSONL trace to stdout (one object per line)
    for k in 0..steps {
        let t_s = (k as f64) * dt_s;
        let progress = (t_s / args.seconds).clamp(0.0, 1.0);

        // Current follows duty proportionally while ramping.
        let duty = base.duty + (args.target_duty - base.duty) * progress;
        let current = if base.duty > 0.0 {
            base.current * duty / base.duty
        } else {
            base.current
        };
        let truth = board::apply_scenario(
            &BoardState {
                duty,
                current,
                ..base
            },
            scenario,
        );

        let state = sampler.sample(&truth);
        let margins = calculate_safety_margins(&state, &ride.config);
        let nosedive = get_nosedive_risk(&margins);
        let critical = margins.overall_risk == RiskLevel::Critical;

        let row = TraceRow {
            t_s,
            state,
            margins,
            nosedive,
        };
        println!("{}", serde_json::to_string(&row)?);

        if critical && args.stop_on_critical {
            info!(t_s, "critical margin reached, stopping");
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_steps_cover_the_ride() {
        let (dt_s, steps) = trace_steps(1.0, 250).unwrap();
        assert_eq!(dt_s, 0.25);
        assert_eq!(steps, 4);
    }

    #[test]
    fn trace_rejects_unbounded_or_empty_rides() {
        assert!(trace_steps(f64::NAN, 100).is_err());
        assert!(trace_steps(f64::INFINITY, 100).is_err());
        assert!(trace_steps(0.0, 100).is_err());
        assert!(trace_steps(-5.0, 100).is_err());
        assert!(trace_steps(10.0, 0).is_err());
    }

    #[test]
    fn assignment_parsing() {
        assert_eq!(
            parse_assignment("tiltback_duty = 0.9"),
            Ok(("tiltback_duty".to_string(), 0.9))
        );
        assert!(parse_assignment("tiltback_duty").is_err());
        assert!(parse_assignment("kp=fast").is_err());
    }
}
