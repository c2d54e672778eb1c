//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load configuration
    let config_path = match cli.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(&config_path)?;

    // Command line wins over the config file
    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or_default();

    let ctx = commands::Context {
        config,
        config_path,
        output_format,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Inspect(args) => commands::inspect::execute(ctx, args).await,
        Commands::Scan(args) => commands::scan::execute(ctx, args).await,
        Commands::Config(args) => commands::config::execute(ctx, args),
    }
}

/// Log to stderr. `RUST_LOG` overrides; otherwise `certdeck=warn`, or
/// `certdeck=debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "certdeck=debug" } else { "certdeck=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
