//! Configuration management.

use anyhow::{Context as _, Result};
use certdeck_parse::ParserConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Default output format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,

    /// Parser settings, flattened into the top-level table.
    #[serde(flatten)]
    pub parser: ParserConfig,
}

impl Config {
    /// Default config file path.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "certdeck", "certdeck")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from file, or defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Update one key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "output_format" | "output" => self.output_format = Some(value.parse()?),
            "soon_window_days" | "window" => {
                self.parser.soon_window_days = value
                    .parse()
                    .with_context(|| format!("soon_window_days must be a whole number of days, got {value}"))?;
            }
            "max_input_bytes" => {
                self.parser.max_input_bytes = value
                    .parse()
                    .with_context(|| format!("max_input_bytes must be a byte count, got {value}"))?;
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}\n\n\
                 Available keys:\n  \
                 output_format    - Default output format (pretty/json/csv/yaml)\n  \
                 soon_window_days - Days before expiry that count as expiring soon\n  \
                 max_input_bytes  - Largest certificate file accepted"
            ),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("output_format", "json").unwrap();
        config.set("soon_window_days", "45").unwrap();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.output_format, Some(OutputFormat::Json));
        assert_eq!(loaded.parser.soon_window_days, 45);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.parser.soon_window_days, 30);
    }

    #[test]
    fn test_rejects_unknown_key_and_bad_values() {
        let mut config = Config::default();
        assert!(config.set("api_key", "x").is_err());
        assert!(config.set("soon_window_days", "soon").is_err());
        assert!(config.set("output_format", "xml").is_err());
        assert_eq!(config, Config::default());
    }
}
