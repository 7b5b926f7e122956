
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::weather::error::{FetchFailure, Operation, WeatherError, classify};
use crate::weather::models::{CurrentWeather, Forecast};
use crate::weather::schema::{Shaped, validate};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_UNITS: &str = "metric";
pub const DEFAULT_LANGUAGE: &str = "ja";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

pub const DEFAULT_FORECAST_DAYS: u32 = 3;
pub const MAX_FORECAST_DAYS: u32 = 5;
/// The forecast endpoint returns one record per three hour bucket
pub const RECORDS_PER_DAY: u32 = 8;

/// Number of forecast records to request for `days` days, capped at five days
#[inline]
pub fn record_count(days: u32) -> u32 {
    days.min(MAX_FORECAST_DAYS) * RECORDS_PER_DAY
}

/// Settings for talking to the OpenWeatherMap API
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub api_key: String,
    pub units: String,
    pub language: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Default provider settings with the given API key
    #[inline]
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url,
            api_key: api_key.into(),
            units: DEFAULT_UNITS.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

// The API key never ends up in logs
impl fmt::Debug for ClientConfig {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("units", &self.units)
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP client for the current weather and forecast endpoints.
///
/// Every lookup issues exactly one GET request. Failures are never retried.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    config: ClientConfig,
    agent: ureq::Agent,
}

impl WeatherClient {
    /// Build a client. Fails without touching the network when the API key is blank.
    #[inline]
    pub fn new(config: ClientConfig) -> Result<Self, WeatherError> {
        if config.api_key.trim().is_empty() {
            return Err(WeatherError::missing_api_key());
        }

        // Error statuses carry a JSON body with the provider's message, so
        // they are read like any other response
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(Self { config, agent })
    }

    #[inline]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch current conditions for `city`
    #[inline]
    pub async fn current_weather(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        info!("Fetching current weather for city: {}", city);
        let weather: CurrentWeather = self.lookup(Operation::CurrentWeather, city, &[]).await?;
        info!("Fetched current weather for city: {}", city);
        Ok(weather)
    }

    /// Fetch a forecast for `city` covering `days` days (at most five)
    #[inline]
    pub async fn forecast(&self, city: &str, days: u32) -> Result<Forecast, WeatherError> {
        info!("Fetching {} day forecast for city: {}", days, city);
        let count = record_count(days).to_string();
        let forecast: Forecast = self
            .lookup(Operation::Forecast, city, &[("cnt", count.as_str())])
            .await?;
        info!(
            "Fetched {} day forecast for city: {} ({} entries)",
            days,
            city,
            forecast.entries.len()
        );
        Ok(forecast)
    }

    async fn lookup<T: Shaped>(
        &self,
        operation: Operation,
        city: &str,
        extra: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let body = match self.fetch(operation, city, extra).await {
            Ok(body) => body,
            Err(failure) => {
                let error = classify(operation, city, failure);
                if error.is_transient() {
                    warn!("{} request failed for city {}: {}", operation, city, error);
                } else {
                    error!("{} request failed for city {}: {}", operation, city, error);
                }
                return Err(error);
            }
        };

        validate(body).map_err(|failure| {
            error!(
                "Failed to validate {} response for city {}: {}",
                operation, city, failure
            );
            WeatherError::Validation { operation, failure }
        })
    }

    async fn fetch(
        &self,
        operation: Operation,
        city: &str,
        extra: &[(&str, &str)],
    ) -> Result<Value, FetchFailure> {
        let url = self.request_url(operation, city, extra)?;
        debug!("GET {}{}", url.origin().ascii_serialization(), url.path());

        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || send(&agent, &url))
            .await
            .map_err(|e| FetchFailure::Internal(format!("request worker failed: {}", e)))?
    }

    fn request_url(
        &self,
        operation: Operation,
        city: &str,
        extra: &[(&str, &str)],
    ) -> Result<Url, FetchFailure> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                FetchFailure::Internal(format!(
                    "base URL cannot carry a path: {}",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .push(operation.endpoint());

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("q", city);
            for (key, value) in extra {
                query.append_pair(key, value);
            }
            query
                .append_pair("appid", &self.config.api_key)
                .append_pair("units", &self.config.units)
                .append_pair("lang", &self.config.language);
        }

        Ok(url)
    }
}

fn send(agent: &ureq::Agent, url: &Url) -> Result<Value, FetchFailure> {
    let mut response = agent
        .get(url.as_str())
        .call()
        .map_err(FetchFailure::Transport)?;

    let status = response.status();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(FetchFailure::Transport)?;

    if !status.is_success() {
        return Err(FetchFailure::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|error| FetchFailure::MalformedBody {
        status: status.as_u16(),
        error,
    })
}
