mod runner;
mod scenario;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use zap_physics::SimConfig;

use runner::SimRunner;
use scenario::Scenario;

/// Run a zap-physics scenario headless and report what happened.
#[derive(Parser, Debug)]
#[command(name = "zap-sim", version, about)]
struct Cli {
    /// Scene to build.
    #[arg(long, value_enum, default_value_t = Scenario::Drop)]
    scenario: Scenario,

    /// Number of fixed steps to run.
    #[arg(long, default_value_t = 400)]
    steps: u64,

    /// JSON file overriding the default simulation config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log running averages every N steps (0 disables).
    #[arg(long, default_value_t = 40)]
    report_every: u64,

    /// Run the scenario twice and fail unless both end bit-identical.
    #[arg(long)]
    verify_determinism: bool,

    /// Log filter, e.g. `info` or `zap_physics=debug`. `RUST_LOG` wins when set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn load_config(path: Option<&PathBuf>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    SimConfig::from_json(&json).with_context(|| format!("parsing config {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level.as_str()))
        .init();

    let config = load_config(cli.config.as_ref())?;
    log::info!(
        "zap-sim: scenario `{}`, {} steps at dt={}s",
        cli.scenario.name(),
        cli.steps,
        config.dt
    );

    let mut runner = SimRunner::new(cli.scenario, config.clone())?;
    let report = runner.run(cli.steps, cli.report_every);
    println!(
        "{}: {} steps, {} bodies ({} asleep), kinetic energy {:.4}, checksum {:016x}",
        cli.scenario.name(),
        report.steps,
        report.bodies,
        report.sleeping,
        report.kinetic_energy,
        report.checksum
    );

    if cli.verify_determinism {
        let replay = SimRunner::new(cli.scenario, config)?.run(cli.steps, 0);
        if replay.checksum != report.checksum {
            bail!(
                "replay diverged: checksum {:016x} vs {:016x}",
                replay.checksum,
                report.checksum
            );
        }
        println!("determinism verified");
    }
    Ok(())
}
