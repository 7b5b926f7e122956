//! Compact JSON views of weather responses returned to MCP clients.

use chrono::{DateTime, SecondsFormat};
use serde::Serialize;

use crate::weather::{CurrentWeather, Forecast, ForecastEntry, Measurement};

/// Placeholder for values the provider did not supply
pub const NOT_AVAILABLE: &str = "N/A";

/// Current conditions for one city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeatherSummary {
    pub city: String,
    pub temperature: Measurement,
    pub description: String,
    pub humidity: Measurement,
    #[serde(rename = "windSpeed")]
    pub wind_speed: Measurement,
    /// Observation time, RFC 3339 in UTC with millisecond precision
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<String>,
}

/// Forecast records for one city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSummary {
    pub city: String,
    pub forecasts: Vec<ForecastItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastItem {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    pub temperature: Measurement,
    pub description: String,
    pub precipitation_probability: String,
}

impl From<&CurrentWeather> for CurrentWeatherSummary {
    #[inline]
    fn from(weather: &CurrentWeather) -> Self {
        Self {
            city: weather.city_name.clone(),
            temperature: weather.main.temp.clone(),
            description: weather
                .primary_description()
                .unwrap_or(NOT_AVAILABLE)
                .to_string(),
            humidity: weather.main.humidity.clone(),
            wind_speed: weather.wind.speed.clone(),
            updated_at: format_timestamp(weather.timestamp),
        }
    }
}

impl From<&Forecast> for ForecastSummary {
    #[inline]
    fn from(forecast: &Forecast) -> Self {
        Self {
            city: forecast.city.name.clone(),
            forecasts: forecast.entries.iter().map(ForecastItem::from).collect(),
        }
    }
}

impl From<&ForecastEntry> for ForecastItem {
    #[inline]
    fn from(entry: &ForecastEntry) -> Self {
        Self {
            date_time: entry.timestamp_text.clone(),
            temperature: entry.main.temp.clone(),
            description: entry
                .primary_description()
                .unwrap_or(NOT_AVAILABLE)
                .to_string(),
            precipitation_probability: format_probability(
                entry
                    .precipitation_probability
                    .as_ref()
                    .map(Measurement::value),
            ),
        }
    }
}

/// Unix seconds as `2024-05-01T03:00:00.000Z`, or `None` when out of range
#[inline]
pub fn format_timestamp(unix_seconds: i64) -> Option<String> {
    DateTime::from_timestamp(unix_seconds, 0)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Probability of precipitation as a whole percentage
#[inline]
pub fn format_probability(pop: Option<f64>) -> String {
    match pop {
        Some(p) => format!("{:.0}%", (p * 100.0).round()),
        None => NOT_AVAILABLE.to_string(),
    }
}
