// Configuration management module
// TOML settings for the OpenWeatherMap client, stored under ~/.weather-mcp

pub mod interactive;
pub mod settings;

pub use interactive::{run_interactive_config, show_config};
pub use settings::{API_KEY_ENV_VAR, Config, ConfigError, OpenWeatherConfig};

