//! reelstamp CLI
//!
//! Parses, converts and subtracts media/subtitle timestamps from the command line.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn init_logging(verbose: u8) {
    use tracing_subscriber::prelude::*;

    let default_level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // RUST_LOG wins over -v
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer);

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    tracing::debug!("reelstamp-core {}", reelstamp_core::version());

    let settings = commands::resolve_settings(&cli)?;
    let output = commands::run(&cli.command, &settings, cli.json)?;
    println!("{output}");
    Ok(())
}
