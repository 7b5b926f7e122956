use super::*;
use crate::weather::schema::Violation;

fn status(status: u16, body: &str) -> FetchFailure {
    FetchFailure::Status {
        status,
        body: body.to_string(),
    }
}

#[test]
fn city_not_found_names_the_requested_city() {
    for operation in [Operation::CurrentWeather, Operation::Forecast] {
        let error = classify(
            operation,
            "UnknownCity",
            status(404, r#"{"cod":"404","message":"city not found"}"#),
        );

        assert!(matches!(&error, WeatherError::NotFound { city } if city == "UnknownCity"));
        assert_eq!(error.to_string(), "City not found: UnknownCity");
    }
}

#[test]
fn city_not_found_match_ignores_case_and_padding() {
    let error = classify(
        Operation::Forecast,
        "Atlantis",
        status(404, r#"{"message":"  City Not Found "}"#),
    );
    assert!(matches!(error, WeatherError::NotFound { .. }));
}

#[test]
fn other_upstream_messages_are_surfaced_verbatim() {
    let error = classify(
        Operation::Forecast,
        "Tokyo",
        status(404, r#"{"message":"city not found for forecast"}"#),
    );
    assert_eq!(
        error.to_string(),
        "forecast API error: city not found for forecast"
    );

    let error = classify(
        Operation::CurrentWeather,
        "Tokyo",
        status(401, r#"{"cod":401,"message":"Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."}"#),
    );
    assert!(!error.is_transient());
    assert!(
        error
            .to_string()
            .starts_with("current weather API error: Invalid API key.")
    );
}

#[test]
fn only_server_side_and_rate_limit_statuses_are_transient() {
    let body = r#"{"message":"something went wrong"}"#;

    for code in [429, 500, 502, 503] {
        let error = classify(Operation::Forecast, "Tokyo", status(code, body));
        assert!(error.is_transient(), "HTTP {code} should be retryable");
    }

    for code in [400, 401, 403, 404] {
        let error = classify(Operation::Forecast, "Tokyo", status(code, body));
        assert!(!error.is_transient(), "HTTP {code} should not be retryable");
    }

    let not_found = classify(
        Operation::Forecast,
        "Atlantis",
        status(404, r#"{"message":"city not found"}"#),
    );
    assert!(!not_found.is_transient());
}

#[test]
fn unusable_error_body_falls_back_to_status() {
    for body in ["<html>Bad Gateway</html>", "", r#"{"message":""}"#, r#"{"cod":500}"#] {
        let error = classify(Operation::CurrentWeather, "Tokyo", status(502, body));
        assert_eq!(error.to_string(), "current weather API error: HTTP 502");
    }
}

#[test]
fn malformed_success_body_is_a_transport_error() {
    let parse_error = serde_json::from_str::<serde_json::Value>("not json")
        .expect_err("invalid json");
    let error = classify(
        Operation::Forecast,
        "Tokyo",
        FetchFailure::MalformedBody {
            status: 200,
            error: parse_error,
        },
    );

    assert!(matches!(
        error,
        WeatherError::Transport {
            status: Some(200),
            ..
        }
    ));
    assert!(!error.is_transient());
    assert!(error.to_string().contains("not valid JSON"));
}

#[test]
fn internal_failures_are_unexpected() {
    let error = classify(
        Operation::CurrentWeather,
        "Tokyo",
        FetchFailure::Internal("worker panicked".to_string()),
    );

    assert!(!error.is_transient());
    assert_eq!(
        error.to_string(),
        "Unexpected error while fetching current weather: worker panicked"
    );
}

#[test]
fn validation_message_is_scoped_to_the_operation() {
    let failure = ValidationFailure {
        violations: vec![Violation {
            path: "list[0].main.temp".to_string(),
            reason: "expected number, found string".to_string(),
        }],
    };
    let error = WeatherError::Validation {
        operation: Operation::Forecast,
        failure,
    };

    assert_eq!(
        error.to_string(),
        "forecast API response has an invalid shape: list[0].main.temp: expected number, found string"
    );
}

#[test]
fn endpoints() {
    assert_eq!(Operation::CurrentWeather.endpoint(), "weather");
    assert_eq!(Operation::Forecast.endpoint(), "forecast");
}
