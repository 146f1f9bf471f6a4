//! Command line entry point coordinating a pipeline run through the lock registry.
//!
//! Loads the configuration, installs tracing and either migrates the lock registry or runs
//! one semaphore command for the run named by `--RUN_ID`.

use clap::Parser;
use config::environment::Environment;
use config::load_config;
use config::shared::RunnerConfig;
use telemetry::tracing::init_tracing;
use tracing::error;

use crate::cli::Cli;
use crate::core::start_runner;

mod cli;
mod core;
mod migrations;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(env!("CARGO_BIN_NAME"))?;

    let mut config = load_config::<RunnerConfig>()?;
    config.environment = Environment::load()?;
    config.validate()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(config, cli))
}

async fn async_main(config: RunnerConfig, cli: Cli) -> anyhow::Result<()> {
    if let Err(err) = start_runner(config, cli).await {
        error!("{err:#}");
        return Err(err);
    }

    Ok(())
}
