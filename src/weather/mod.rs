// Weather lookups against the OpenWeatherMap API
// Requests are built by the client, responses are checked against declarative
// shapes before they become typed values

pub mod client;
pub mod error;
pub mod models;
pub mod schema;
pub mod service;

pub use client::{
    ClientConfig, DEFAULT_FORECAST_DAYS, MAX_FORECAST_DAYS, WeatherClient, record_count,
};
pub use error::{Operation, WeatherError};
pub use models::{CurrentWeather, Forecast, ForecastEntry, Measurement};
pub use schema::{ValidationFailure, Violation};
pub use service::WeatherService;
