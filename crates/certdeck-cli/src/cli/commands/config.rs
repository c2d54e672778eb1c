//! `certdeck config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::output::OutputFormat;

pub fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(&ctx),
        ConfigCommands::Set { key, value } => set_config(ctx, &key, &value),
        ConfigCommands::Path => {
            println!("{}", ctx.config_path.display());
            Ok(())
        }
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(config)?);
        }
        _ => {
            println!("{}", "Current Configuration:".bold());
            println!();
            println!(
                "  {} {}",
                "output_format:".bold(),
                config.output_format.unwrap_or_default()
            );
            println!(
                "  {} {}",
                "soon_window_days:".bold(),
                config.parser.soon_window_days
            );
            println!(
                "  {} {}",
                "max_input_bytes:".bold(),
                config.parser.max_input_bytes
            );
            println!();
            println!("{}", ctx.config_path.display().to_string().dimmed());
        }
    }

    Ok(())
}

fn set_config(ctx: Context, key: &str, value: &str) -> Result<()> {
    let mut config = ctx.config;
    config.set(key, value)?;
    config.save(&ctx.config_path)?;
    println!(
        "{} {} set to {}.",
        "Success:".green().bold(),
        key,
        value.cyan()
    );
    Ok(())
}
