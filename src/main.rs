// src/main.rs

use anyhow::{Context, Result};
use car_events::{CarName, CarSpecificEvents, Config, ReplayRunner};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Replay a logged drive through the car-specific event rules
#[derive(Parser, Debug)]
#[command(name = "car-events")]
#[command(about = "Replay logged car states and print the events raised per tick")]
struct Args {
    /// Vehicle profile and replay settings (YAML)
    #[arg(long, default_value = "config.yaml")]
    config: String,

    /// Logged drive, one JSON frame per line
    #[arg(long)]
    log: String,

    /// Override the vehicle family from the config
    #[arg(long)]
    car: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(car) = &args.car {
        config.car.car_name = car.parse::<CarName>()?;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("car_events={}", config.logging.level))),
        )
        .with_writer(io::stderr)
        .init();

    info!("Configuration loaded from {}", args.config);

    let car_events = CarSpecificEvents::from_params(config.car.clone())?;
    let mut runner = ReplayRunner::new(car_events);

    let file = File::open(&args.log).with_context(|| format!("opening replay log {}", args.log))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary =
        runner.run_to_writer(BufReader::new(file), &mut out, config.replay.emit_empty_frames)?;

    // stdout carries only frame lines; the summary goes next to the logs
    let json = serde_json::to_string_pretty(&summary)?;
    eprintln!("{json}");

    if let Some(path) = &config.replay.summary_path {
        std::fs::write(path, &json).with_context(|| format!("writing summary to {path}"))?;
        info!("Summary written to {}", path);
    }

    Ok(())
}
