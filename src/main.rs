use crate::cli::Commands;
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Parser;
use log::info;

mod cli;
mod config;
mod gcp;
mod llm;
mod server;
mod telemetry;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Commands that bring up the telemetry stack install a tracing
    // subscriber whose `log` bridge must become the global logger;
    // claiming it with env_logger first would make that install fail.
    // Plain env_logger covers the commands that never call init.
    match &cli.command {
        Commands::Status(_) => env_logger::init(),
        Commands::Demo(cmd) if cmd.dry_run => env_logger::init(),
        _ => {}
    }

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    info!("Configuration loaded successfully");
    info!("App name: {}", config.app_name);

    // Dispatch commands
    match &cli.command {
        Commands::Demo(cmd) => {
            crate::cli::demo::handle(cmd, &config)?;
        }
        Commands::Status(cmd) => {
            crate::cli::status::handle(cmd, &config)?;
        }
        Commands::Server(cmd) => {
            crate::cli::server::handle(cmd, &config)?;
        }
        Commands::Upload(cmd) => {
            crate::cli::upload::handle(cmd, &config)?;
        }
    }

    Ok(())
}
