use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ut_cli::commands::{bookings, report, show_config};
use ut_cli::{Cli, Commands, Config};

/// Load config and check that the operating window is usable.
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    config
        .utilization
        .operating_window()
        .context("invalid utilization config")?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match &cli.command {
        Some(Commands::Report(args)) => {
            let config = load_config(cli.config.as_deref())?;
            report::run(&mut io::stdout().lock(), args, &config)?;
        }
        Some(Commands::Bookings(args)) => {
            let config = load_config(cli.config.as_deref())?;
            bookings::run(&mut io::stdout().lock(), args, &config)?;
        }
        Some(Commands::Config) => {
            // Shown even when the operating window is invalid, so it can be inspected
            let config =
                Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
            show_config::run(&mut io::stdout().lock(), &config)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
