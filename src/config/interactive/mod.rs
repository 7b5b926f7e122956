
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Password, Select};

use super::settings::{API_KEY_ENV_VAR, SUPPORTED_UNITS};
use super::{Config, ConfigError, OpenWeatherConfig};

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 Weather MCP Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("OpenWeatherMap Configuration").bold().yellow());
    eprintln!("Configure the API key and request defaults used for weather lookups.");
    eprintln!();

    configure_openweather(&mut config.openweather)?;

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("OpenWeatherMap Settings:").bold().yellow());
    eprintln!("  API Key: {}", style(describe_api_key(&config)).cyan());
    eprintln!("  Base URL: {}", style(&config.openweather.base_url).cyan());
    eprintln!("  Units: {}", style(&config.openweather.units).cyan());
    eprintln!("  Language: {}", style(&config.openweather.language).cyan());
    eprintln!(
        "  Timeout: {}s",
        style(config.openweather.timeout_seconds).cyan()
    );

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn describe_api_key(config: &Config) -> String {
    let from_env = std::env::var(API_KEY_ENV_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty());

    match (from_env, config.openweather.api_key.as_deref()) {
        (Some(key), _) => format!("{} (from {})", mask_key(&key), API_KEY_ENV_VAR),
        (None, Some(key)) => mask_key(key),
        (None, None) => "not set".to_string(),
    }
}

/// Keep only the last four characters of a secret visible
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), visible)
}

fn load_existing_config() -> Result<Config> {
    let config_dir = Config::config_dir().context("Failed to determine config directory")?;

    Config::load_from(&config_dir).map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            Ok(Config {
                base_dir: config_dir.clone(),
                ..Config::default()
            })
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn configure_openweather(settings: &mut OpenWeatherConfig) -> Result<()> {
    let keep_existing = settings.api_key.is_some()
        && Confirm::new()
            .with_prompt("Keep the existing API key?")
            .default(true)
            .interact()?;

    if !keep_existing {
        let api_key = Password::new()
            .with_prompt(format!(
                "OpenWeatherMap API key (leave empty to use {})",
                API_KEY_ENV_VAR
            ))
            .allow_empty_password(true)
            .interact()?;
        settings.set_api_key(Some(api_key));
    }

    let default_index = SUPPORTED_UNITS
        .iter()
        .position(|&u| u == settings.units)
        .unwrap_or(1);

    let units_index = Select::new()
        .with_prompt("Units")
        .default(default_index)
        .items(SUPPORTED_UNITS)
        .interact()?;

    let language: String = Input::new()
        .with_prompt("Response language (e.g. ja, en)")
        .default(settings.language.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Language cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let timeout_seconds: u64 = Input::new()
        .with_prompt("Request timeout in seconds")
        .default(settings.timeout_seconds)
        .validate_with(|input: &u64| -> Result<(), &str> {
            if *input == 0 {
                Err("Timeout must be greater than 0")
            } else if *input > 120 {
                Err("Timeout must be 120 seconds or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let base_url: String = Input::new()
        .with_prompt("API base URL")
        .default(settings.base_url.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            let temp_config = OpenWeatherConfig {
                base_url: input.clone(),
                ..OpenWeatherConfig::default()
            };
            temp_config.base_url()?;
            Ok(())
        })
        .interact_text()?;

    settings.set_units(SUPPORTED_UNITS[units_index].to_string())?;
    settings.set_language(language)?;
    settings.set_timeout_seconds(timeout_seconds)?;
    settings.set_base_url(base_url)?;

    Ok(())
}
