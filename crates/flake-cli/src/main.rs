#![doc = include_str!("../README.md")]

mod config;
mod output;
mod telemetry;

use std::io::{self, BufWriter, Write};

use config::{CliArgs, OutputConfig};
use flake::{FixedHostId, FlakeGenerator, SystemClock};

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse_normalized(std::env::args_os());
    telemetry::init_logging()?;

    let config = match OutputConfig::try_from(args) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            std::process::exit(1);
        }
    };

    let generator = match build_generator(&config) {
        Ok(generator) => generator,
        Err(err) => {
            tracing::error!(error = %err, "failed to create flake generator");
            std::process::exit(1);
        }
    };

    tracing::debug!(
        host_id = generator.host_id(),
        count = config.count,
        format = ?config.format,
        "generating ids"
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    output::write_ids(
        &mut out,
        config.format,
        (0..config.count).map(|_| generator.next_id()),
    )?;
    out.flush()?;
    Ok(())
}

fn build_generator(config: &OutputConfig) -> flake::Result<FlakeGenerator> {
    match config.host_id {
        Some(host_id) => FlakeGenerator::with_resolver(&FixedHostId(host_id), SystemClock::default()),
        None => FlakeGenerator::new(),
    }
}
