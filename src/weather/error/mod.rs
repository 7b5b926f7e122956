//! Weather lookup errors and failure classification

#[cfg(test)]
mod tests;

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

use crate::weather::schema::ValidationFailure;

/// Upstream message OpenWeatherMap sends for unknown cities
const CITY_NOT_FOUND: &str = "city not found";

/// The provider endpoint an operation talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CurrentWeather,
    Forecast,
}

impl Operation {
    /// Path segment below the API base URL
    #[inline]
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::CurrentWeather => "weather",
            Self::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Operation {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrentWeather => f.write_str("current weather"),
            Self::Forecast => f.write_str("forecast"),
        }
    }
}

/// Errors returned by weather lookups. The display text is the message shown
/// to tool callers.
#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("OpenWeatherMap API key is not configured: {message}")]
    Configuration { message: String },

    #[error("{operation} API response has an invalid shape: {failure}")]
    Validation {
        operation: Operation,
        failure: ValidationFailure,
    },

    #[error("City not found: {city}")]
    NotFound { city: String },

    /// `status` is the HTTP status when the provider answered at all
    #[error("{operation} API error: {message}")]
    Transport {
        operation: Operation,
        message: String,
        status: Option<u16>,
    },

    #[error("Unexpected error while fetching {operation}: {detail}")]
    Unexpected { operation: Operation, detail: String },
}

impl WeatherError {
    #[inline]
    pub fn missing_api_key() -> Self {
        Self::Configuration {
            message: "set OPENWEATHER_API_KEY or run `weather-mcp config`".to_string(),
        }
    }

    /// Whether retrying the same request could succeed: network failures,
    /// timeouts, rate limiting and server errors
    #[inline]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { status: None, .. } => true,
            Self::Transport {
                status: Some(status),
                ..
            } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Raw outcome of an HTTP exchange that did not produce a usable body
#[derive(Debug)]
pub enum FetchFailure {
    /// The provider answered with a non-success status
    Status { status: u16, body: String },
    /// The request never completed: DNS, connect, TLS, timeout, I/O
    Transport(ureq::Error),
    /// A success status with a body that is not JSON
    MalformedBody {
        status: u16,
        error: serde_json::Error,
    },
    /// The request could not be built or the worker running it failed
    Internal(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Map a failed exchange for `city` onto the error taxonomy
#[inline]
pub fn classify(operation: Operation, city: &str, failure: FetchFailure) -> WeatherError {
    match failure {
        FetchFailure::Status { status, body } => {
            let upstream = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.trim().is_empty());

            match upstream {
                Some(message) if message.trim().eq_ignore_ascii_case(CITY_NOT_FOUND) => {
                    WeatherError::NotFound {
                        city: city.to_string(),
                    }
                }
                Some(message) => WeatherError::Transport {
                    operation,
                    message,
                    status: Some(status),
                },
                None => WeatherError::Transport {
                    operation,
                    message: format!("HTTP {}", status),
                    status: Some(status),
                },
            }
        }
        FetchFailure::Transport(error) => WeatherError::Transport {
            operation,
            message: error.to_string(),
            status: None,
        },
        FetchFailure::MalformedBody { status, error } => WeatherError::Transport {
            operation,
            message: format!("response body is not valid JSON: {}", error),
            status: Some(status),
        },
        FetchFailure::Internal(detail) => WeatherError::Unexpected { operation, detail },
    }
}
