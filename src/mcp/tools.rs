//! MCP Tools Implementation
//!
//! The two weather lookup tools: argument validation, the service call and
//! the projection of the response into summary JSON.

use crate::mcp::errors::{McpError, McpResult};
use crate::mcp::protocol::*;
use crate::mcp::server::ToolHandler;
use crate::mcp::summary::{CurrentWeatherSummary, ForecastSummary};
use crate::weather::{DEFAULT_FORECAST_DAYS, MAX_FORECAST_DAYS, WeatherService};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

pub const CURRENT_WEATHER_TOOL: &str = "get_current_weather";
pub const FORECAST_TOOL: &str = "get_forecast";

type Arguments = HashMap<String, Value>;

/// Current weather tool handler
pub struct CurrentWeatherHandler {
    service: Arc<WeatherService>,
}

/// Forecast tool handler
pub struct ForecastHandler {
    service: Arc<WeatherService>,
}

impl CurrentWeatherHandler {
    /// Create a new current weather handler
    #[inline]
    pub fn new(service: Arc<WeatherService>) -> Self {
        Self { service }
    }

    /// Create the get_current_weather tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: CURRENT_WEATHER_TOOL.to_string(),
            description: Some("Get the current weather for a city".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "city": {
                        "type": "string",
                        "minLength": 1,
                        "description": "Name of the city to look up"
                    }
                },
                "required": ["city"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for CurrentWeatherHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> McpResult<CallToolResult> {
        let args = params.arguments.unwrap_or_default();
        let city = city_argument(CURRENT_WEATHER_TOOL, &args)?;

        debug!("Fetching current weather: city='{}'", city);

        match self.service.current_weather(&city).await {
            Ok(weather) => {
                let summary = CurrentWeatherSummary::from(&weather);
                Ok(CallToolResult::text(serde_json::to_string_pretty(
                    &summary,
                )?))
            }
            Err(e) => {
                error!("Current weather lookup for '{}' failed: {}", city, e);
                Ok(CallToolResult::error(format!("Error: {}", e)))
            }
        }
    }
}

impl ForecastHandler {
    /// Create a new forecast handler
    #[inline]
    pub fn new(service: Arc<WeatherService>) -> Self {
        Self { service }
    }

    /// Create the get_forecast tool definition
    #[inline]
    pub fn tool_definition() -> Tool {
        Tool {
            name: FORECAST_TOOL.to_string(),
            description: Some("Get a multi-day weather forecast for a city".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "city": {
                        "type": "string",
                        "minLength": 1,
                        "description": "Name of the city to look up"
                    },
                    "days": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": MAX_FORECAST_DAYS,
                        "default": DEFAULT_FORECAST_DAYS,
                        "description": format!(
                            "Number of days to forecast (1-{}, default: {})",
                            MAX_FORECAST_DAYS, DEFAULT_FORECAST_DAYS
                        )
                    }
                },
                "required": ["city"],
                "additionalProperties": false
            }),
        }
    }
}

#[async_trait]
impl ToolHandler for ForecastHandler {
    #[inline]
    async fn handle(&self, params: CallToolParams) -> McpResult<CallToolResult> {
        let args = params.arguments.unwrap_or_default();
        let city = city_argument(FORECAST_TOOL, &args)?;
        let days = days_argument(&args)?;

        debug!("Fetching forecast: city='{}', days={}", city, days);

        match self.service.forecast(&city, days).await {
            Ok(forecast) => {
                let summary = ForecastSummary::from(&forecast);
                Ok(CallToolResult::text(serde_json::to_string_pretty(
                    &summary,
                )?))
            }
            Err(e) => {
                error!("Forecast lookup for '{}' failed: {}", city, e);
                Ok(CallToolResult::error(format!("Error: {}", e)))
            }
        }
    }
}

/// Extract the required, non-blank `city` argument
fn city_argument(tool: &str, args: &Arguments) -> McpResult<String> {
    let city = args
        .get("city")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(tool, "missing required string parameter: city"))?;

    let city = city.trim();
    if city.is_empty() {
        return Err(invalid(tool, "city must not be empty"));
    }

    Ok(city.to_string())
}

/// Extract the optional `days` argument, defaulting when absent or null
fn days_argument(args: &Arguments) -> McpResult<u32> {
    let days = match args.get("days") {
        None | Some(Value::Null) => return Ok(DEFAULT_FORECAST_DAYS),
        Some(value) => value.as_u64(),
    };

    days.and_then(|d| u32::try_from(d).ok())
        .filter(|d| (1..=MAX_FORECAST_DAYS).contains(d))
        .ok_or_else(|| {
            invalid(
                FORECAST_TOOL,
                &format!("days must be an integer between 1 and {}", MAX_FORECAST_DAYS),
            )
        })
}

fn invalid(tool: &str, message: &str) -> McpError {
    McpError::InvalidToolParameters {
        tool: tool.to_string(),
        message: message.to_string(),
    }
}
