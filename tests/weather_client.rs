#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// Weather client tests against a mocked OpenWeatherMap API

use serde_json::{Value, json};
use std::time::Duration;
use url::Url;
use weather_mcp::weather::{
    ClientConfig, Measurement, Operation, WeatherClient, WeatherError, WeatherService,
    record_count,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn client_config(server: &MockServer, api_key: &str) -> ClientConfig {
    let base_url =
        Url::parse(&format!("{}/data/2.5", server.uri())).expect("mock server uri is a url");
    ClientConfig::new(base_url, api_key)
}

fn test_client(server: &MockServer) -> WeatherClient {
    WeatherClient::new(client_config(server, API_KEY)).expect("api key is set")
}

fn init_test_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init()
        .ok();
}

fn tokyo_current_weather() -> Value {
    json!({
        "coord": {"lon": 139.6917, "lat": 35.6895},
        "weather": [{"id": 800, "main": "Clear", "description": "快晴", "icon": "01d"}],
        "base": "stations",
        "main": {
            "temp": 25.0,
            "feels_like": 25.3,
            "temp_min": 23.9,
            "temp_max": 26.1,
            "pressure": 1013.0,
            "humidity": 55.0
        },
        "visibility": 10000.0,
        "wind": {"speed": 3.6, "deg": 160.0},
        "clouds": {"all": 0.0},
        "dt": 1_717_200_000,
        "sys": {"type": 2, "id": 268_395, "country": "JP", "sunrise": 1_717_184_000, "sunset": 1_717_235_000},
        "timezone": 32400,
        "id": 1_850_144,
        "name": "Tokyo",
        "cod": 200
    })
}

fn forecast_entry(dt: i64, temp: f64, pop: f64) -> Value {
    json!({
        "dt": dt,
        "main": {
            "temp": temp,
            "feels_like": temp,
            "temp_min": temp - 1.0,
            "temp_max": temp + 1.0,
            "pressure": 1009.0,
            "humidity": 72.0
        },
        "weather": [{"id": 500, "main": "Rain", "description": "小雨", "icon": "10n"}],
        "clouds": {"all": 75.0},
        "wind": {"speed": 4.1, "deg": 200.0, "gust": 7.2},
        "visibility": 10000.0,
        "pop": pop,
        "rain": {"3h": 0.42},
        "sys": {"pod": "n"},
        "dt_txt": "2024-06-01 00:00:00"
    })
}

fn tokyo_forecast(entries: usize) -> Value {
    let list: Vec<Value> = (0..entries)
        .map(|i| {
            let offset = i64::try_from(i).expect("small index") * 10_800;
            forecast_entry(1_717_200_000 + offset, 21.5, 0.3)
        })
        .collect();

    json!({
        "cod": "200",
        "message": 0,
        "cnt": entries,
        "list": list,
        "city": {
            "id": 1_850_144,
            "name": "Tokyo",
            "coord": {"lat": 35.6895, "lon": 139.6917},
            "country": "JP",
            "population": 12_445_327,
            "timezone": 32400,
            "sunrise": 1_717_184_000,
            "sunset": 1_717_235_000
        }
    })
}

fn city_not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({"cod": "404", "message": "city not found"}))
}

#[tokio::test]
async fn current_weather_for_tokyo() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Tokyo"))
        .and(query_param("appid", API_KEY))
        .and(query_param("units", "metric"))
        .and(query_param("lang", "ja"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_current_weather()))
        .expect(1)
        .mount(&server)
        .await;

    let weather = test_client(&server)
        .current_weather("Tokyo")
        .await
        .expect("valid response");

    assert_eq!(weather.city_name, "Tokyo");
    assert!((weather.main.temp.value() - 25.0).abs() < f64::EPSILON);
    assert_eq!(weather.primary_description(), Some("快晴"));

    let round_trip = serde_json::to_value(&weather).expect("serializes");
    assert_eq!(round_trip, tokyo_current_weather());
}

#[tokio::test]
async fn integer_valued_response_round_trips_exactly() {
    init_test_tracing();
    let server = MockServer::start().await;

    let payload = json!({
        "weather": [{"id": 800, "main": "Clear", "description": "快晴", "icon": "01d"}],
        "main": {"temp": 25, "feels_like": 26, "temp_min": 24, "temp_max": 27, "pressure": 1012, "humidity": 60},
        "wind": {"speed": 5, "deg": 180},
        "dt": 1_700_000_000,
        "name": "Tokyo"
    });

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Tokyo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let weather = test_client(&server)
        .current_weather("Tokyo")
        .await
        .expect("valid response");

    assert_eq!(weather.city_name, "Tokyo");
    assert_eq!(weather.main.temp.to_string(), "25");
    assert_eq!(serde_json::to_value(&weather).expect("serializes"), payload);
}

#[tokio::test]
async fn forecast_requests_eight_records_per_day() {
    init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("q", "Tokyo"))
        .and(query_param("cnt", "24"))
        .and(query_param("appid", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_forecast(24)))
        .expect(1)
        .mount(&server)
        .await;

    let forecast = test_client(&server)
        .forecast("Tokyo", 3)
        .await
        .expect("valid response");

    assert_eq!(forecast.city.name, "Tokyo");
    assert_eq!(forecast.count, 24);
    assert_eq!(forecast.entries.len(), 24);
    assert_eq!(
        forecast.entries[0]
            .precipitation_probability
            .as_ref()
            .map(Measurement::value),
        Some(0.3)
    );

    let round_trip = serde_json::to_value(&forecast).expect("serializes");
    assert_eq!(round_trip, tokyo_forecast(24));
}

#[tokio::test]
async fn forecast_days_are_capped_at_five() {
    assert_eq!(record_count(6), record_count(5));
    assert_eq!(record_count(30), 40);

    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("cnt", "40"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_forecast(40)))
        .expect(1)
        .mount(&server)
        .await;

    let forecast = test_client(&server)
        .forecast("Tokyo", 9)
        .await
        .expect("valid response");
    assert_eq!(forecast.entries.len(), 40);
}

#[tokio::test]
async fn unknown_city_is_not_found_for_both_operations() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("q", "UnknownCity"))
        .respond_with(city_not_found())
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server);

    let current = client.current_weather("UnknownCity").await;
    match current {
        Err(WeatherError::NotFound { city }) => assert_eq!(city, "UnknownCity"),
        other => panic!("expected NotFound, got {:?}", other),
    }

    let forecast = client.forecast("UnknownCity", 2).await;
    let error = forecast.expect_err("city does not exist");
    assert!(matches!(error, WeatherError::NotFound { .. }));
    assert!(error.to_string().contains("UnknownCity"));
}

#[tokio::test]
async fn string_temperature_is_an_invalid_shape() {
    let server = MockServer::start().await;

    let mut current = tokyo_current_weather();
    current["main"]["temp"] = json!("25");
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current))
        .mount(&server)
        .await;

    let mut forecast = tokyo_forecast(2);
    forecast["list"][1]["main"]["temp"] = json!("warm");
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast))
        .mount(&server)
        .await;

    let client = test_client(&server);

    let error = client
        .current_weather("Tokyo")
        .await
        .expect_err("temperature is a string");
    assert!(matches!(
        error,
        WeatherError::Validation {
            operation: Operation::CurrentWeather,
            ..
        }
    ));
    let message = error.to_string();
    assert!(message.contains("invalid shape"), "{message}");
    assert!(message.contains("main.temp"), "{message}");

    let error = client
        .forecast("Tokyo", 1)
        .await
        .expect_err("temperature is a string");
    let message = error.to_string();
    assert!(message.contains("invalid shape"), "{message}");
    assert!(message.contains("list[1].main.temp"), "{message}");
}

#[tokio::test]
async fn empty_weather_list_is_an_invalid_shape() {
    let server = MockServer::start().await;

    let mut current = tokyo_current_weather();
    current["weather"] = json!([]);
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current))
        .mount(&server)
        .await;

    let error = test_client(&server)
        .current_weather("Tokyo")
        .await
        .expect_err("weather list is empty");
    let message = error.to_string();
    assert!(message.contains("weather: expected at least 1 item(s), found 0"), "{message}");
}

#[tokio::test]
async fn upstream_message_is_surfaced_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "cod": 401,
            "message": "Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."
        })))
        .mount(&server)
        .await;

    let error = test_client(&server)
        .current_weather("Tokyo")
        .await
        .expect_err("key is rejected");

    assert!(matches!(
        error,
        WeatherError::Transport {
            status: Some(401),
            ..
        }
    ));
    assert!(!error.is_transient());
    assert!(error.to_string().starts_with("current weather API error: Invalid API key."));
}

#[tokio::test]
async fn error_without_body_falls_back_to_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let error = test_client(&server)
        .forecast("Tokyo", 1)
        .await
        .expect_err("provider is down");

    assert!(matches!(
        error,
        WeatherError::Transport {
            operation: Operation::Forecast,
            ..
        }
    ));
    assert!(error.is_transient());
    assert_eq!(error.to_string(), "forecast API error: HTTP 503");
}

#[tokio::test]
async fn non_json_success_body_is_a_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let error = test_client(&server)
        .current_weather("Tokyo")
        .await
        .expect_err("body is not json");

    assert!(matches!(error, WeatherError::Transport { .. }));
    assert!(error.to_string().contains("not valid JSON"));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(tokyo_current_weather())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig {
        timeout: Duration::from_millis(300),
        ..client_config(&server, API_KEY)
    };
    let client = WeatherClient::new(config).expect("api key is set");

    let error = client
        .current_weather("Tokyo")
        .await
        .expect_err("response is too slow");
    assert!(matches!(
        error,
        WeatherError::Transport { status: None, .. }
    ));
    assert!(error.is_transient());
}

#[tokio::test]
async fn missing_api_key_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_current_weather()))
        .expect(0)
        .mount(&server)
        .await;

    let service = WeatherService::new(client_config(&server, "   "));

    let error = service
        .current_weather("Tokyo")
        .await
        .expect_err("no key configured");
    assert!(matches!(error, WeatherError::Configuration { .. }));

    let error = service
        .forecast("Tokyo", 3)
        .await
        .expect_err("no key configured");
    assert!(matches!(error, WeatherError::Configuration { .. }));
    assert!(!service.is_initialized().await);
}

#[tokio::test]
async fn service_initializes_lazily_and_reuses_the_client() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("appid", "override-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokyo_current_weather()))
        .expect(2)
        .mount(&server)
        .await;

    let service = WeatherService::new(client_config(&server, ""));
    service
        .initialize(Some("override-key".to_string()))
        .await
        .expect("explicit key");

    for _ in 0..2 {
        let weather = service
            .current_weather("Tokyo")
            .await
            .expect("valid response");
        assert_eq!(weather.city_name, "Tokyo");
    }
}
