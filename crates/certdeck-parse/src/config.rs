//! Parser configuration.

use certdeck_core::DEFAULT_SOON_WINDOW_DAYS;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ParseError, Result};

/// Upload cap applied before any decoding (5 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 5 * 1024 * 1024;

/// Tunables for parsing and status classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Days before expiry at which a certificate counts as expiring soon.
    #[serde(default = "default_soon_window")]
    pub soon_window_days: u32,

    /// Largest buffer accepted by the parser.
    #[serde(default = "default_max_input")]
    pub max_input_bytes: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            soon_window_days: default_soon_window(),
            max_input_bytes: default_max_input(),
        }
    }
}

impl ParserConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| ParseError::io(path.display().to_string(), e))?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ParseError::Config(e.to_string()))
    }
}

// Default value functions for serde.
const fn default_soon_window() -> u32 {
    DEFAULT_SOON_WINDOW_DAYS
}

const fn default_max_input() -> usize {
    DEFAULT_MAX_INPUT_BYTES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.soon_window_days, 30);
        assert_eq!(config.max_input_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ParserConfig::from_toml("soon_window_days = 14").unwrap();
        assert_eq!(config.soon_window_days, 14);
        assert_eq!(config.max_input_bytes, DEFAULT_MAX_INPUT_BYTES);
    }

    #[test]
    fn test_invalid_toml() {
        let err = ParserConfig::from_toml("soon_window_days = \"soon\"").unwrap_err();
        assert!(matches!(err, ParseError::Config(_)));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ParserConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ParserConfig::default());
    }
}
