use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::Result;
use crate::config::Config;
use crate::mcp::summary::{CurrentWeatherSummary, ForecastSummary};
use crate::mcp::{CurrentWeatherHandler, ForecastHandler, McpServer, WeatherResourceHandler};
use crate::weather::WeatherService;

const SERVER_NAME: &str = "weather-mcp";

const SERVER_INSTRUCTIONS: &str = "Weather lookups backed by OpenWeatherMap. \
Use get_current_weather for current conditions and get_forecast for up to 5 days \
of 3-hourly forecasts. Resources are also available as weather://{city}/current \
and weather://{city}/forecast.";

/// Build the weather service from the saved configuration
#[inline]
pub fn build_service(api_key: Option<String>) -> Result<Arc<WeatherService>> {
    let config = Config::load().context("Failed to load configuration")?;
    service_from_config(&config, api_key)
}

#[inline]
pub fn service_from_config(
    config: &Config,
    api_key: Option<String>,
) -> Result<Arc<WeatherService>> {
    let client_config = config.client_config(api_key)?;
    Ok(Arc::new(WeatherService::new(client_config)))
}

/// Create an MCP server with the weather tools and resources registered
#[inline]
pub async fn build_server(service: Arc<WeatherService>) -> McpServer {
    let server = McpServer::new(
        SERVER_NAME.to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    )
    .with_instructions(SERVER_INSTRUCTIONS);

    server
        .register_tool(
            CurrentWeatherHandler::tool_definition(),
            CurrentWeatherHandler::new(Arc::clone(&service)),
        )
        .await;
    server
        .register_tool(
            ForecastHandler::tool_definition(),
            ForecastHandler::new(Arc::clone(&service)),
        )
        .await;
    server
        .register_resource_template(
            WeatherResourceHandler::template(),
            WeatherResourceHandler::new(service),
        )
        .await;

    server
}

/// Start the MCP server on stdio
#[inline]
pub async fn serve_mcp(api_key: Option<String>) -> Result<()> {
    let service = build_service(api_key)?;

    // A missing key is reported per call, the server still starts
    match service.initialize(None).await {
        Ok(client) => info!(
            "Weather client ready for {}",
            client.config().base_url.as_str()
        ),
        Err(e) => {
            warn!("{}", e);
            eprintln!("Warning: {}", e);
            eprintln!("Use 'weather-mcp config' to set an API key.");
        }
    }

    let server = Arc::new(build_server(service).await);

    eprintln!("🌐 Starting weather MCP server on stdio transport...");
    eprintln!("Tools: get_current_weather, get_forecast");
    eprintln!("Press Ctrl+C to stop the server");

    tokio::select! {
        result = Arc::clone(&server).serve_stdio() => {
            if let Err(e) = result {
                error!("MCP server error: {}", e);
                return Err(e.into());
            }
            info!("MCP server stopped normally");
        }
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\n📴 Received interrupt signal, shutting down...");
        }
    }

    Ok(())
}

#[inline]
pub async fn current_summary(
    service: &WeatherService,
    city: &str,
) -> Result<CurrentWeatherSummary> {
    let weather = service.current_weather(city).await?;
    Ok(CurrentWeatherSummary::from(&weather))
}

#[inline]
pub async fn forecast_summary(
    service: &WeatherService,
    city: &str,
    days: u32,
) -> Result<ForecastSummary> {
    let forecast = service.forecast(city, days).await?;
    Ok(ForecastSummary::from(&forecast))
}

/// Print the current weather summary for a city
#[inline]
pub async fn show_current(city: &str, api_key: Option<String>) -> Result<()> {
    let service = build_service(api_key)?;
    let summary = current_summary(&service, city).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Print the forecast summary for a city
#[inline]
pub async fn show_forecast(city: &str, days: u32, api_key: Option<String>) -> Result<()> {
    let service = build_service(api_key)?;
    let summary = forecast_summary(&service, city, days).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
