#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// Command layer tests: configuration and lookup failures surface as typed errors

use serde_json::json;
use url::Url;
use weather_mcp::WeatherMcpError;
use weather_mcp::commands::{current_summary, forecast_summary, service_from_config};
use weather_mcp::config::{Config, ConfigError};
use weather_mcp::weather::{ClientConfig, WeatherError, WeatherService};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service_for(server: &MockServer) -> WeatherService {
    let base_url =
        Url::parse(&format!("{}/data/2.5", server.uri())).expect("mock server uri is a url");
    WeatherService::new(ClientConfig::new(base_url, "test-key"))
}

#[test]
fn invalid_base_url_is_a_config_error() {
    let mut config = Config::default();
    config.openweather.base_url = "ftp://weather.example".to_string();

    let result = service_from_config(&config, Some("key".to_string()));
    assert!(matches!(
        result,
        Err(WeatherMcpError::Config(ConfigError::InvalidUrl(_)))
    ));
}

#[tokio::test]
async fn valid_config_builds_an_uninitialized_service() {
    let config = Config::default();
    let service = service_from_config(&config, Some("key".to_string())).expect("valid config");
    assert!(!service.is_initialized().await);
}

#[tokio::test]
async fn unknown_city_is_a_weather_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("q", "Atlantis"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"cod": "404", "message": "city not found"})),
        )
        .mount(&server)
        .await;

    let error = current_summary(&service_for(&server), "Atlantis")
        .await
        .expect_err("city is unknown");

    assert!(matches!(
        error,
        WeatherMcpError::Weather(WeatherError::NotFound { ref city }) if city == "Atlantis"
    ));
    assert_eq!(error.to_string(), "Weather error: City not found: Atlantis");
}

#[tokio::test]
async fn forecast_summary_projects_the_response() {
    let server = MockServer::start().await;

    let entry = json!({
        "dt": 1_717_200_000,
        "main": {
            "temp": 21, "feels_like": 21, "temp_min": 20, "temp_max": 22,
            "pressure": 1011, "humidity": 65
        },
        "weather": [{"id": 801, "main": "Clouds", "description": "薄い雲", "icon": "02d"}],
        "wind": {"speed": 3, "deg": 120},
        "pop": 0.4,
        "dt_txt": "2024-06-01 00:00:00"
    });

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("cnt", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cod": "200",
            "message": 0,
            "cnt": 1,
            "list": [entry],
            "city": {"id": 1, "name": "Nagoya", "coord": {"lat": 35.18, "lon": 136.9}, "country": "JP"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let summary = forecast_summary(&service_for(&server), "Nagoya", 1)
        .await
        .expect("valid response");

    assert_eq!(summary.city, "Nagoya");
    assert_eq!(summary.forecasts.len(), 1);
    assert_eq!(summary.forecasts[0].precipitation_probability, "40%");

    let rendered = serde_json::to_value(&summary).expect("serializes");
    assert_eq!(rendered["forecasts"][0]["temperature"], json!(21));
}
