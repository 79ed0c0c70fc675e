use serde::Deserialize;
use serde_json::Number;

use super::{FetchError, HttpFetcher};

/// Current conditions as returned by OpenWeatherMap
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherReport {
    pub name: String,
    pub main: Readings,
    pub weather: Vec<Condition>,
    pub wind: Wind,
    pub sys: SunTimes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Readings {
    pub temp: Number,
    pub humidity: Number,
    pub pressure: Number,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    /// Group name such as "Clear" or "Rain"
    pub main: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Wind {
    pub speed: Number,
}

/// Unix timestamps
#[derive(Debug, Clone, Deserialize)]
pub struct SunTimes {
    pub sunrise: i64,
    pub sunset: i64,
}

impl WeatherReport {
    /// The primary condition group
    pub fn condition(&self) -> Result<&str, FetchError> {
        self.weather
            .first()
            .map(|c| c.main.as_str())
            .ok_or(FetchError::Missing("weather condition"))
    }
}

pub struct WeatherClient {
    http: HttpFetcher,
    url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(http: HttpFetcher, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    /// Current weather for a location name, metric units.
    pub async fn current(&self, location: &str) -> Result<WeatherReport, FetchError> {
        self.http
            .get_json(
                &self.url,
                &[
                    ("q", location),
                    ("appid", self.api_key.as_str()),
                    ("units", "metric"),
                ],
            )
            .await
    }
}
