use serde::{Deserialize, Serialize};

use crate::{common::types::AnyResult, configs::*};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
  #[serde(default)]
  pub logging: Option<LoggingConfig>,
  #[serde(default)]
  pub quality: QualityConfig,
  #[serde(default)]
  pub recovery: RecoveryConfig,
}

impl Config {
  pub fn load() -> AnyResult<Self> {
    let config_path = if std::path::Path::new("playersync.toml").exists() {
      "playersync.toml"
    } else if std::path::Path::new("playersync.default.toml").exists() {
      "playersync.default.toml"
    } else {
      return Err("playersync.toml or playersync.default.toml not found".into());
    };

    crate::log_println!("Loading configuration from: {}", config_path);

    let config_str = std::fs::read_to_string(config_path)?;
    if config_str.is_empty() {
      return Err(format!("{} is empty", config_path).into());
    }

    Self::from_toml_str(&config_str)
  }

  pub fn from_toml_str(config_str: &str) -> AnyResult<Self> {
    let config: Config = toml::from_str(config_str)?;
    Ok(config)
  }
}
