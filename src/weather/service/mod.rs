
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::weather::client::{ClientConfig, WeatherClient};
use crate::weather::error::WeatherError;
use crate::weather::models::{CurrentWeather, Forecast};

/// Owns the weather client slot.
///
/// The slot starts out empty and is filled either by [`WeatherService::initialize`]
/// or lazily by the first lookup. Lazy construction does not hold the lock
/// while building the client: two lookups racing before the first
/// initialization can both build a client, and the later write wins. Both are
/// built from the same settings so the outcome is the same either way.
#[derive(Debug)]
pub struct WeatherService {
    template: ClientConfig,
    client: RwLock<Option<Arc<WeatherClient>>>,
}

impl WeatherService {
    /// Create an uninitialized service. `template.api_key` may be empty, in
    /// which case lookups fail until [`WeatherService::initialize`] is given a key.
    #[inline]
    pub fn new(template: ClientConfig) -> Self {
        Self {
            template,
            client: RwLock::new(None),
        }
    }

    /// Build a client, replacing any existing one. An explicit `api_key`
    /// takes priority over the configured one.
    #[inline]
    pub async fn initialize(
        &self,
        api_key: Option<String>,
    ) -> Result<Arc<WeatherClient>, WeatherError> {
        let client = Arc::new(self.build_client(api_key)?);

        let mut slot = self.client.write().await;
        if slot.is_some() {
            info!("Replacing existing weather client configuration");
        }
        *slot = Some(Arc::clone(&client));

        Ok(client)
    }

    #[inline]
    pub async fn is_initialized(&self) -> bool {
        self.client.read().await.is_some()
    }

    #[inline]
    pub async fn current_weather(&self, city: &str) -> Result<CurrentWeather, WeatherError> {
        self.client().await?.current_weather(city).await
    }

    #[inline]
    pub async fn forecast(&self, city: &str, days: u32) -> Result<Forecast, WeatherError> {
        self.client().await?.forecast(city, days).await
    }

    async fn client(&self) -> Result<Arc<WeatherClient>, WeatherError> {
        let existing = self.client.read().await.clone();
        if let Some(client) = existing {
            return Ok(client);
        }

        debug!("Weather client not initialized, building from configuration");
        let client = Arc::new(self.build_client(None)?);
        *self.client.write().await = Some(Arc::clone(&client));
        Ok(client)
    }

    fn build_client(&self, api_key: Option<String>) -> Result<WeatherClient, WeatherError> {
        let mut config = self.template.clone();
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            config.api_key = key;
        }
        WeatherClient::new(config)
    }
}
