use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{common::types::AnyResult, configs::*};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Config {
    pub fn load() -> AnyResult<Self> {
        let config_path = if Path::new("config.toml").exists() {
            "config.toml"
        } else if Path::new("config.default.toml").exists() {
            "config.default.toml"
        } else {
            return Err("config.toml or config.default.toml not found".into());
        };

        crate::log_println!("Loading configuration from: {}", config_path);
        Self::from_file(config_path)
    }

    pub fn from_file(path: impl AsRef<Path>) -> AnyResult<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)?;
        if config_str.trim().is_empty() {
            return Err(format!("{} is empty", path.display()).into());
        }
        Self::parse(&config_str)
    }

    pub fn parse(source: &str) -> AnyResult<Self> {
        Ok(toml::from_str(source)?)
    }
}
