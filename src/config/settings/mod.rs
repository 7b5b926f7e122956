
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::weather::client::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_LANGUAGE, DEFAULT_TIMEOUT_SECONDS, DEFAULT_UNITS,
};

/// Environment variable that overrides the API key from the config file
pub const API_KEY_ENV_VAR: &str = "OPENWEATHER_API_KEY";

pub const SUPPORTED_UNITS: &[&str] = &["standard", "metric", "imperial"];

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub openweather: OpenWeatherConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpenWeatherConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub units: String,
    pub language: String,
    pub timeout_seconds: u64,
}

impl Default for OpenWeatherConfig {
    #[inline]
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            units: DEFAULT_UNITS.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid units: {0} (must be 'standard', 'metric' or 'imperial')")]
    InvalidUnits(String),
    #[error("Invalid language code: {0} (cannot be empty)")]
    InvalidLanguage(String),
    #[error("Invalid timeout: {0} (must be between 1 and 120 seconds)")]
    InvalidTimeout(u64),
}

impl Config {
    /// Directory holding `config.toml`, `~/.weather-mcp`
    #[inline]
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(".weather-mcp"))
            .or({
                #[cfg(windows)]
                {
                    dirs::data_dir().map(|data| data.join("weather-mcp"))
                }
                #[cfg(not(windows))]
                {
                    None
                }
            })
            .ok_or(ConfigError::DirectoryError)
    }

    /// Load the configuration from the default directory
    #[inline]
    pub fn load() -> Result<Self> {
        let config_dir = Self::config_dir().context("Failed to determine config directory")?;
        Self::load_from(config_dir)
    }

    #[inline]
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(Self {
                openweather: OpenWeatherConfig::default(),
                base_dir: config_dir.as_ref().to_path_buf(),
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        let config_dir = self.get_base_dir();

        fs::create_dir_all(config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    #[inline]
    pub fn get_base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.get_base_dir().join(CONFIG_FILE_NAME)
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.openweather.validate()
    }

    /// API key from the environment, falling back to the config file
    #[inline]
    pub fn api_key(&self) -> Option<String> {
        self.openweather.resolve_api_key(env::var(API_KEY_ENV_VAR).ok())
    }

    /// Client settings for the weather service. `api_key_override` wins over
    /// every configured key. A missing key is not an error here: the weather
    /// service reports it on first use.
    #[inline]
    pub fn client_config(
        &self,
        api_key_override: Option<String>,
    ) -> Result<ClientConfig, ConfigError> {
        let base_url = self.openweather.base_url()?;
        let api_key = non_blank(api_key_override)
            .or_else(|| self.api_key())
            .unwrap_or_default();

        Ok(ClientConfig {
            units: self.openweather.units.clone(),
            language: self.openweather.language.clone(),
            timeout: Duration::from_secs(self.openweather.timeout_seconds),
            ..ClientConfig::new(base_url, api_key)
        })
    }
}

impl OpenWeatherConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;

        if !SUPPORTED_UNITS.contains(&self.units.as_str()) {
            return Err(ConfigError::InvalidUnits(self.units.clone()));
        }

        if self.language.trim().is_empty() {
            return Err(ConfigError::InvalidLanguage(self.language.clone()));
        }

        if !(1..=120).contains(&self.timeout_seconds) {
            return Err(ConfigError::InvalidTimeout(self.timeout_seconds));
        }

        Ok(())
    }

    #[inline]
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|_| ConfigError::InvalidUrl(self.base_url.clone()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(self.base_url.clone()));
        }

        Ok(url)
    }

    /// `env_value` takes priority over the stored key. Blank values count as unset.
    #[inline]
    pub fn resolve_api_key(&self, env_value: Option<String>) -> Option<String> {
        non_blank(env_value).or_else(|| non_blank(self.api_key.clone()))
    }

    #[inline]
    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.api_key = non_blank(api_key);
    }

    #[inline]
    pub fn set_base_url(&mut self, base_url: String) -> Result<(), ConfigError> {
        let temp_config = OpenWeatherConfig {
            base_url: base_url.clone(),
            ..self.clone()
        };
        temp_config.base_url()?;
        self.base_url = base_url;
        Ok(())
    }

    #[inline]
    pub fn set_units(&mut self, units: String) -> Result<(), ConfigError> {
        if !SUPPORTED_UNITS.contains(&units.as_str()) {
            return Err(ConfigError::InvalidUnits(units));
        }
        self.units = units;
        Ok(())
    }

    #[inline]
    pub fn set_language(&mut self, language: String) -> Result<(), ConfigError> {
        if language.trim().is_empty() {
            return Err(ConfigError::InvalidLanguage(language));
        }
        self.language = language;
        Ok(())
    }

    #[inline]
    pub fn set_timeout_seconds(&mut self, timeout_seconds: u64) -> Result<(), ConfigError> {
        if !(1..=120).contains(&timeout_seconds) {
            return Err(ConfigError::InvalidTimeout(timeout_seconds));
        }
        self.timeout_seconds = timeout_seconds;
        Ok(())
    }
}

/// Trimmed value, or `None` when nothing is left
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
