use crate::error::{PipelineError, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the card-catalog API (series, sets, card details).
    pub catalog_base_url: String,
    /// Base URL of the product/price API.
    pub pricing_base_url: String,
    /// Per-request timeout ceiling, seconds.
    pub timeout_seconds: u64,
    /// Pause between successive card-detail requests, milliseconds.
    pub card_fetch_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            catalog_base_url: "https://api.tcgdex.net/v2/en".to_string(),
            pricing_base_url: "https://tcgcsv.com/tcgplayer".to_string(),
            timeout_seconds: 30,
            card_fetch_delay_ms: 100,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
        }
    }
}

impl Config {
    /// Loads `config.toml` from the working directory, falling back to the
    /// compiled-in defaults when the file does not exist. A file that
    /// exists but fails to parse is a hard error.
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        match fs::read_to_string(config_path) {
            Ok(content) => {
                let config: Config = toml::from_str(&content)?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(PipelineError::Config(format!(
                "Failed to read config file '{config_path}': {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_known_upstreams() {
        let config = Config::default();
        assert!(config.api.catalog_base_url.starts_with("https://"));
        assert_eq!(config.api.timeout_seconds, 30);
    }

    #[test]
    fn config_parses_from_toml() {
        let toml_str = r#"
            [api]
            catalog_base_url = "http://localhost:8080/v2/en"
            pricing_base_url = "http://localhost:8081/tcgplayer"
            timeout_seconds = 5
            card_fetch_delay_ms = 0
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.timeout_seconds, 5);
        assert_eq!(config.api.card_fetch_delay_ms, 0);
    }
}
