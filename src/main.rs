use bhquad::{ScenarioConfig, Scenario};
use bhquad::{bench_gravity, bench_theta, bench_step};

use clap::Parser;
use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, default_value = "two_body.yaml")]
    file_name: String,

    /// Number of steps to run
    #[arg(long, default_value_t = 1000)]
    steps: u64,

    /// Log energy and tree stats every K steps
    #[arg(long, default_value_t = 100)]
    report_every: u64,

    /// Run the benchmark suite instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let scenario_cfg = ScenarioConfig::from_path(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if args.bench {
        bench_gravity();
        bench_theta();
        bench_step();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build_scenario(scenario_cfg)?;
    info!(
        file = %args.file_name,
        bodies = scenario.system.bodies.len(),
        total_mass = scenario.system.total_mass(),
        integrator = ?scenario.engine.integrator,
        theta = scenario.engine.theta,
        dt = scenario.dt(),
        "scenario loaded"
    );

    let report_every = args.report_every.max(1);
    for _ in 0..args.steps {
        let report = scenario.step().clone();
        if scenario.steps % report_every == 0 {
            let e = scenario.energy;
            info!(
                step = scenario.steps,
                t = scenario.system.t,
                bodies = scenario.system.bodies.len(),
                nodes = report.node_count,
                depth = report.max_depth_reached,
                kinetic = e.kinetic,
                potential = e.potential,
                total = e.total,
                "step"
            );
        }
    }

    Ok(())
}
