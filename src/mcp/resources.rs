//! Weather resources addressed as `weather://{city}/{type}`.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::mcp::errors::{McpError, McpResult};
use crate::mcp::protocol::{ReadResourceResult, ResourceContents, ResourceTemplate};
use crate::mcp::server::ResourceHandler;
use crate::mcp::summary::{CurrentWeatherSummary, ForecastSummary};
use crate::weather::{DEFAULT_FORECAST_DAYS, WeatherService};

pub const RESOURCE_SCHEME: &str = "weather://";
pub const RESOURCE_MIME_TYPE: &str = "application/json";

/// Which view of a city's weather a resource URI refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherResourceKind {
    Current,
    Forecast,
}

/// A parsed `weather://` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherResourceUri {
    pub city: String,
    pub kind: WeatherResourceKind,
}

impl WeatherResourceUri {
    /// Parse `weather://{city}/{type}`, percent-decoding the city
    #[inline]
    pub fn parse(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix(RESOURCE_SCHEME)?;
        let (encoded_city, kind) = rest.rsplit_once('/')?;

        let kind = match kind {
            "current" => WeatherResourceKind::Current,
            "forecast" => WeatherResourceKind::Forecast,
            _ => return None,
        };

        let city = urlencoding::decode(encoded_city).ok()?;
        let city = city.trim();
        if city.is_empty() || city.contains('/') {
            return None;
        }

        Some(Self {
            city: city.to_string(),
            kind,
        })
    }
}

/// Serves current conditions and forecasts as JSON resources
pub struct WeatherResourceHandler {
    service: Arc<WeatherService>,
}

impl WeatherResourceHandler {
    #[inline]
    pub fn new(service: Arc<WeatherService>) -> Self {
        Self { service }
    }

    #[inline]
    pub fn template() -> ResourceTemplate {
        ResourceTemplate {
            uri_template: format!("{}{{city}}/{{type}}", RESOURCE_SCHEME),
            name: "City weather".to_string(),
            description: Some(
                "Current conditions (type = current) or a 3 day forecast (type = forecast) for a city"
                    .to_string(),
            ),
            mime_type: Some(RESOURCE_MIME_TYPE.to_string()),
        }
    }
}

impl WeatherResourceKind {
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Forecast => "forecast",
        }
    }
}

#[async_trait]
impl ResourceHandler for WeatherResourceHandler {
    #[inline]
    fn matches(&self, uri: &str) -> bool {
        uri.starts_with(RESOURCE_SCHEME)
    }

    #[inline]
    async fn read(&self, uri: &str) -> McpResult<ReadResourceResult> {
        let target = WeatherResourceUri::parse(uri).ok_or_else(|| McpError::ResourceNotFound {
            uri: uri.to_string(),
        })?;

        debug!("Reading {} resource for {}", target.kind.as_str(), target.city);
        let text = match target.kind {
            WeatherResourceKind::Current => self
                .service
                .current_weather(&target.city)
                .await
                .map(|w| serde_json::to_string_pretty(&CurrentWeatherSummary::from(&w))),
            WeatherResourceKind::Forecast => self
                .service
                .forecast(&target.city, DEFAULT_FORECAST_DAYS)
                .await
                .map(|f| serde_json::to_string_pretty(&ForecastSummary::from(&f))),
        }
        .map_err(|source| McpError::ResourceAccessFailed {
            uri: uri.to_string(),
            source,
        })??;

        Ok(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: uri.to_string(),
                mime_type: Some(RESOURCE_MIME_TYPE.to_string()),
                text,
            }],
        })
    }
}
