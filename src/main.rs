use disksim::{Scenario, ScenarioConfig};
use disksim::{bench_broad_phase, bench_tick_curve};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Headless quadtree disk-collision simulation")]
struct Args {
    /// Scenario file; bare names are looked up in `scenarios/`
    #[arg(short, default_value = "default.yaml")]
    file_name: String,

    /// Override the number of ticks from the scenario
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the time scale from the scenario
    #[arg(long, allow_hyphen_values = true)]
    time_scale: Option<f64>,

    /// Log a summary every this many ticks
    #[arg(long, default_value_t = 60)]
    report_every: u64,

    /// Run the broad-phase benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

fn scenario_path(file_name: &str) -> PathBuf {
    let direct = PathBuf::from(file_name);
    if direct.exists() {
        return direct;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    if args.bench {
        bench_broad_phase()?;
        bench_tick_curve()?;
        return Ok(());
    }

    let path = scenario_path(&args.file_name);
    let scenario_cfg = ScenarioConfig::from_yaml_file(&path)?;
    let mut scenario = Scenario::build_scenario(scenario_cfg)
        .with_context(|| format!("invalid scenario {}", path.display()))?;

    if let Some(time_scale) = args.time_scale {
        scenario
            .set_time_scale(time_scale)
            .context("invalid --time-scale")?;
    }
    let ticks = args.ticks.unwrap_or(scenario.ticks);
    let every = args.report_every.max(1);

    let mut resolved_total = 0usize;
    let mut wall_total = 0u64;
    for tick in 1..=ticks {
        let report = scenario.tick()?;
        resolved_total += report.resolved_pairs;
        wall_total += u64::from(report.wall_hits);

        if tick % every == 0 || tick == ticks {
            info!(
                tick,
                t = scenario.system.t,
                nodes = report.nodes,
                leaves = report.leaves,
                groups = report.groups,
                resolved = report.resolved_pairs,
                "progress"
            );
        }
    }

    let cap = scenario.parameters().max_collisions;
    let saturated = scenario
        .system
        .bodies
        .iter()
        .filter(|b| b.collision_progress(cap) >= 1.0)
        .count();
    info!(
        ticks,
        bodies = scenario.system.bodies.len(),
        resolved_total,
        wall_total,
        saturated,
        "finished"
    );

    Ok(())
}
