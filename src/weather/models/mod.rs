//! OpenWeatherMap response types and their wire shapes
//!
//! Field names follow the provider's JSON on both deserialization and
//! serialization, so a validated value serializes back to the payload it was
//! built from.


use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::weather::schema::{Field, Kind, Shape, Shaped};

/// A numeric reading kept exactly as the provider wrote it
///
/// `25` serializes back as `25` and `25.0` as `25.0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Measurement(Number);

impl Measurement {
    #[inline]
    pub fn value(&self) -> f64 {
        self.0.as_f64().unwrap_or(f64::NAN)
    }

    #[inline]
    pub fn as_number(&self) -> &Number {
        &self.0
    }
}

impl From<Number> for Measurement {
    #[inline]
    fn from(number: Number) -> Self {
        Self(number)
    }
}

impl fmt::Display for Measurement {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// One weather condition, e.g. `Clear` / `快晴`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: i64,
    /// Condition group such as `Rain` or `Clouds`
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainConditions {
    pub temp: Measurement,
    pub feels_like: Measurement,
    pub temp_min: Measurement,
    pub temp_max: Measurement,
    /// Pressure in hPa
    pub pressure: Measurement,
    /// Humidity in percent
    pub humidity: Measurement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sea_level: Option<Measurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grnd_level: Option<Measurement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: Measurement,
    /// Direction in degrees
    pub deg: Measurement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gust: Option<Measurement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: Measurement,
    pub lon: Measurement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clouds {
    /// Cloudiness in percent
    pub all: Measurement,
}

/// Precipitation volume over the last hour, in mm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyVolume {
    #[serde(rename = "1h")]
    pub one_hour: Measurement,
}

/// Precipitation volume over a three hour forecast bucket, in mm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreeHourVolume {
    #[serde(rename = "3h")]
    pub three_hours: Measurement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset: Option<i64>,
}

/// Response of the `/weather` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    #[serde(rename = "coord", default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub weather: Vec<WeatherCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    pub main: MainConditions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Measurement>,
    pub wind: Wind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clouds: Option<Clouds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<HourlyVolume>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snow: Option<HourlyVolume>,
    /// Time of data calculation, unix seconds UTC
    #[serde(rename = "dt")]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<SystemInfo>,
    /// Shift from UTC in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "name")]
    pub city_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cod: Option<i64>,
}

impl CurrentWeather {
    /// Description of the primary weather condition
    #[inline]
    pub fn primary_description(&self) -> Option<&str> {
        self.weather.first().map(|c| c.description.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartOfDay {
    /// `d` for day, `n` for night
    pub pod: String,
}

/// One three hour bucket of the `/forecast` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    #[serde(rename = "dt")]
    pub timestamp: i64,
    pub main: MainConditions,
    pub weather: Vec<WeatherCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clouds: Option<Clouds>,
    pub wind: Wind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Measurement>,
    /// Probability of precipitation in `0.0..=1.0`. Not range checked.
    #[serde(rename = "pop", default, skip_serializing_if = "Option::is_none")]
    pub precipitation_probability: Option<Measurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<ThreeHourVolume>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snow: Option<ThreeHourVolume>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<PartOfDay>,
    /// Forecast time as text, e.g. `2024-06-11 12:00:00`
    #[serde(rename = "dt_txt")]
    pub timestamp_text: String,
}

impl ForecastEntry {
    #[inline]
    pub fn primary_description(&self) -> Option<&str> {
        self.weather.first().map(|c| c.description.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: i64,
    pub name: String,
    #[serde(rename = "coord")]
    pub coordinates: Coordinates,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset: Option<i64>,
}

/// Response of the `/forecast` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(rename = "cod")]
    pub status_code: String,
    #[serde(rename = "message")]
    pub message_code: i64,
    /// Number of entries the provider says it returned
    #[serde(rename = "cnt")]
    pub count: i64,
    #[serde(rename = "list")]
    pub entries: Vec<ForecastEntry>,
    pub city: City,
}

const COORDINATES: Shape = Shape {
    name: "coord",
    fields: &[
        Field::required("lon", Kind::Number),
        Field::required("lat", Kind::Number),
    ],
};

const MAIN_CONDITIONS: Shape = Shape {
    name: "main",
    fields: &[
        Field::required("temp", Kind::Number),
        Field::required("feels_like", Kind::Number),
        Field::required("temp_min", Kind::Number),
        Field::required("temp_max", Kind::Number),
        Field::required("pressure", Kind::Number),
        Field::required("humidity", Kind::Number),
        Field::optional("sea_level", Kind::Number),
        Field::optional("grnd_level", Kind::Number),
    ],
};

const WEATHER_CONDITION: Shape = Shape {
    name: "weather",
    fields: &[
        Field::required("id", Kind::Integer),
        Field::required("main", Kind::String),
        Field::required("description", Kind::String),
        Field::required("icon", Kind::String),
    ],
};

const CONDITION_ITEM: Kind = Kind::Object(&WEATHER_CONDITION);

const CONDITIONS: Kind = Kind::Array {
    item: &CONDITION_ITEM,
    min_len: 1,
};

const WIND: Shape = Shape {
    name: "wind",
    fields: &[
        Field::required("speed", Kind::Number),
        Field::required("deg", Kind::Number),
        Field::optional("gust", Kind::Number),
    ],
};

const CLOUDS: Shape = Shape {
    name: "clouds",
    fields: &[Field::required("all", Kind::Number)],
};

const HOURLY_VOLUME: Shape = Shape {
    name: "volume",
    fields: &[Field::required("1h", Kind::Number)],
};

const THREE_HOUR_VOLUME: Shape = Shape {
    name: "volume",
    fields: &[Field::required("3h", Kind::Number)],
};

const SYSTEM_INFO: Shape = Shape {
    name: "sys",
    fields: &[
        Field::optional("type", Kind::Integer),
        Field::optional("id", Kind::Integer),
        Field::optional("country", Kind::String),
        Field::optional("sunrise", Kind::Integer),
        Field::optional("sunset", Kind::Integer),
    ],
};

const PART_OF_DAY: Shape = Shape {
    name: "sys",
    fields: &[Field::required("pod", Kind::String)],
};

const CURRENT_WEATHER: Shape = Shape {
    name: "current weather",
    fields: &[
        Field::optional("coord", Kind::Object(&COORDINATES)),
        Field::required("weather", CONDITIONS),
        Field::optional("base", Kind::String),
        Field::required("main", Kind::Object(&MAIN_CONDITIONS)),
        Field::optional("visibility", Kind::Number),
        Field::required("wind", Kind::Object(&WIND)),
        Field::optional("clouds", Kind::Object(&CLOUDS)),
        Field::optional("rain", Kind::Object(&HOURLY_VOLUME)),
        Field::optional("snow", Kind::Object(&HOURLY_VOLUME)),
        Field::required("dt", Kind::Integer),
        Field::optional("sys", Kind::Object(&SYSTEM_INFO)),
        Field::optional("timezone", Kind::Integer),
        Field::optional("id", Kind::Integer),
        Field::required("name", Kind::String),
        Field::optional("cod", Kind::Integer),
    ],
};

const FORECAST_ENTRY: Shape = Shape {
    name: "forecast entry",
    fields: &[
        Field::required("dt", Kind::Integer),
        Field::required("main", Kind::Object(&MAIN_CONDITIONS)),
        Field::required("weather", CONDITIONS),
        Field::optional("clouds", Kind::Object(&CLOUDS)),
        Field::required("wind", Kind::Object(&WIND)),
        Field::optional("visibility", Kind::Number),
        Field::optional("pop", Kind::Number),
        Field::optional("rain", Kind::Object(&THREE_HOUR_VOLUME)),
        Field::optional("snow", Kind::Object(&THREE_HOUR_VOLUME)),
        Field::optional("sys", Kind::Object(&PART_OF_DAY)),
        Field::required("dt_txt", Kind::String),
    ],
};

const FORECAST_ENTRY_ITEM: Kind = Kind::Object(&FORECAST_ENTRY);

const CITY: Shape = Shape {
    name: "city",
    fields: &[
        Field::required("id", Kind::Integer),
        Field::required("name", Kind::String),
        Field::required("coord", Kind::Object(&COORDINATES)),
        Field::required("country", Kind::String),
        Field::optional("population", Kind::Integer),
        Field::optional("timezone", Kind::Integer),
        Field::optional("sunrise", Kind::Integer),
        Field::optional("sunset", Kind::Integer),
    ],
};

const FORECAST: Shape = Shape {
    name: "forecast",
    fields: &[
        Field::required("cod", Kind::String),
        Field::required("message", Kind::Integer),
        Field::required("cnt", Kind::Integer),
        Field::required(
            "list",
            Kind::Array {
                item: &FORECAST_ENTRY_ITEM,
                min_len: 0,
            },
        ),
        Field::required("city", Kind::Object(&CITY)),
    ],
};

impl Shaped for CurrentWeather {
    const SHAPE: &'static Shape = &CURRENT_WEATHER;
}

impl Shaped for Forecast {
    const SHAPE: &'static Shape = &FORECAST;
}
