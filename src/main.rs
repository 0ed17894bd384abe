//! Strata CLI - Layered Image Editing
//!
//! Command-line interface for the Strata compositing engine.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use strata::cli::{commands, Cli, Commands};
use strata::StrataConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    info!("Strata v{}", env!("CARGO_PKG_VERSION"));

    let config = StrataConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Some(cmd) => handle_command(cmd, config),
        None => {
            println!("Strata v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands, config: StrataConfig) -> anyhow::Result<()> {
    match cmd {
        Commands::Apply {
            input,
            output,
            layers,
            disable,
        } => commands::apply(config, &input, &output, &layers, &disable)
            .with_context(|| format!("apply failed for {}", input.display())),
        Commands::Preview {
            input,
            output,
            control,
            value,
            layers,
        } => commands::preview(config, &input, &output, &control, &value, &layers)
            .with_context(|| format!("preview failed for {}", input.display())),
        Commands::Operations => Ok(commands::list_operations()?),
        Commands::Info { input } => Ok(commands::info(&config, &input)?),
    }
}
