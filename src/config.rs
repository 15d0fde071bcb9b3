use crate::correlation::DEFAULT_WINDOW_DAYS;
use crate::tax::DEFAULT_HOURLY_RATE;
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub target_directory: PathBuf,
    /// Hourly rate used for the opportunity-cost estimate, in USD.
    pub hourly_rate: f64,
    /// Days on either side of a shutdown date to search for location data.
    pub window_days: i64,
    /// Top-level folder names to skip during a scan. Supports `*` wildcards.
    pub ignore_patterns: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_directory: PathBuf::from("."),
            hourly_rate: DEFAULT_HOURLY_RATE,
            window_days: DEFAULT_WINDOW_DAYS,
            ignore_patterns: vec!["__MACOSX".to_string(), "$RECYCLE.BIN".to_string()],
        }
    }
}

impl Config {
    /// Get the default config file path (~/.takeout-tax.toml)
    pub fn default_config_path() -> crate::Result<PathBuf> {
        let home_dir = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;
        Ok(PathBuf::from(home_dir).join(".takeout-tax.toml"))
    }

    /// Load config from the default location, falling back to defaults if no
    /// file exists there.
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific file path
    pub fn from_file(path: &PathBuf) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a file
    pub fn to_file(&self, path: &PathBuf) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Create a config file with all available options documented
    pub fn create_documented_config() -> String {
        r#"# Takeout Tax Configuration File
# This file configures how takeout-tax scans your export

# Takeout folder to scan (defaults to current directory)
target_directory = "."

# Your hourly rate in USD, used to price the migration effort
hourly_rate = 50.0

# Days on either side of a shutdown date to search for location data
window_days = 3

# Top-level folder names to skip during a scan ('*' wildcards allowed)
ignore_patterns = [
    "__MACOSX",
    "$RECYCLE.BIN",
]
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_config_parses_back() {
        let config: Config =
            toml::from_str(&Config::create_documented_config()).expect("template is valid toml");
        assert_eq!(config.hourly_rate, DEFAULT_HOURLY_RATE);
        assert_eq!(config.window_days, DEFAULT_WINDOW_DAYS);
    }
}
