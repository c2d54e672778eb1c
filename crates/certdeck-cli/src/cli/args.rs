//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Certificate inventory from the command line
///
/// Parse PEM/DER certificates, see who issued them and when they expire,
/// and sweep directories for certificates that need renewing.
#[derive(Parser, Debug)]
#[command(name = "certdeck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "CERTDECK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse certificate files and print their fields
    Inspect(InspectArgs),

    /// Import every certificate under a path and report on expiry
    Scan(ScanArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Inspect command
// ============================================================================

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// PEM or DER files; bundles print every certificate
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Days before expiry that count as expiring soon
    #[arg(short = 'w', long)]
    pub window: Option<u32>,
}

// ============================================================================
// Scan command
// ============================================================================

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// File or directory to scan (.pem, .crt, .cer, .der)
    pub path: PathBuf,

    /// Only list certificates that are expiring soon or expired
    #[arg(short, long)]
    pub expiring_only: bool,

    /// Days before expiry that count as expiring soon
    #[arg(short = 'w', long)]
    pub window: Option<u32>,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Key to set (output_format, soon_window_days, max_input_bytes)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show config file path
    Path,
}
