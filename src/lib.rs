use thiserror::Error;

pub type Result<T> = std::result::Result<T, WeatherMcpError>;

#[derive(Error, Debug)]
pub enum WeatherMcpError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Weather error: {0}")]
    Weather(#[from] weather::WeatherError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod commands;
pub mod config;
pub mod mcp;
pub mod weather;
