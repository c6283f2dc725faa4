use std::path::PathBuf;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub lang: Option<String>,
    pub page_size: Option<u32>,
    pub concurrency: Option<usize>,
}

impl Config {
    /// Load config from ~/.config/ytc/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytc")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
api_key = "AIzaSyB123"
lang = "en"
page_size = 50
concurrency = 8
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("AIzaSyB123"));
        assert_eq!(config.lang.as_deref(), Some("en"));
        assert_eq!(config.page_size, Some(50));
        assert_eq!(config.concurrency, Some(8));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.api_key.is_none());
        assert!(config.page_size.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(r#"lang = "fr""#).unwrap();
        assert_eq!(config.lang.as_deref(), Some("fr"));
        assert!(config.api_key.is_none());
    }
}
