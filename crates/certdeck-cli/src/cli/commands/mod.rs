//! Command implementations.

pub mod config;
pub mod inspect;
pub mod scan;

use certdeck_parse::{ParserConfig, X509Parser};
use std::path::PathBuf;

use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration
    pub config: Config,

    /// Where `config` was loaded from
    pub config_path: PathBuf,

    /// Output format
    pub output_format: OutputFormat,

    /// Verbose output
    pub verbose: bool,
}

impl Context {
    /// Parser settings, with an optional soon-window override from the
    /// command line.
    pub fn parser_config(&self, window: Option<u32>) -> ParserConfig {
        let mut config = self.config.parser.clone();
        if let Some(days) = window {
            config.soon_window_days = days;
        }
        config
    }

    pub fn parser(&self, window: Option<u32>) -> X509Parser {
        X509Parser::new(self.parser_config(window))
    }
}
