use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub kitchen: KitchenConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// `pretty` for development, `json` for production
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            format: default_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct KitchenConfig {
    /// IANA name of the timezone the cutoffs are expressed in
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// JSON file with the offerings served by the catalog
    #[serde(default)]
    pub catalog: Option<String>,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            catalog: None,
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (MEALSUB__SERVER__PORT, etc.)
    /// 2. Config file specified by path, CONFIG_PATH or config/default.toml
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("observability.log_level", default_log_level())?
            .set_default("observability.format", default_format())?
            .set_default("kitchen.timezone", default_timezone())?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // Optional, ignored if missing
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("MEALSUB")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("Server port must be greater than 0".to_string());
        }
        if !crate::clock::is_known_timezone(&self.kitchen.timezone) {
            return Err(format!(
                "Unknown kitchen timezone `{}`",
                self.kitchen.timezone
            ));
        }
        if !matches!(self.observability.format.as_str(), "pretty" | "json") {
            return Err(format!(
                "Log format must be `pretty` or `json`, got `{}`",
                self.observability.format
            ));
        }
        Ok(())
    }
}
