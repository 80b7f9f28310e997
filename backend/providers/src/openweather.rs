//! OpenWeatherMap current-conditions and 5-day/3-hour forecast adapter.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use weatherwise_core::{Coordinates, ForecastDay, WeatherReport};

use crate::error::{fetch_text, ProviderError};
use crate::WeatherProvider;

const PROVIDER: &str = "openweather";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Used when the response omits `visibility` (the API caps it at 10 km).
const DEFAULT_VISIBILITY_M: f64 = 10_000.0;
const DEFAULT_PRESSURE_HPA: f64 = 1013.0;
const FORECAST_DAYS: usize = 5;

pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured {
                provider: PROVIDER,
                reason: "missing API key",
            });
        }
        debug!(endpoint, ?params, "Requesting OpenWeatherMap");

        let request = self
            .client
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(params)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")]);
        fetch_text(PROVIDER, request).await
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn current(&self, at: Coordinates) -> Result<WeatherReport, ProviderError> {
        let body = self
            .get("weather", &[("lat", at.lat.to_string()), ("lon", at.lon.to_string())])
            .await?;
        parse_current(&body)
    }

    async fn by_city(&self, city: &str) -> Result<WeatherReport, ProviderError> {
        let body = self.get("weather", &[("q", city.to_string())]).await?;
        parse_current(&body)
    }

    async fn forecast(&self, at: Coordinates) -> Result<Vec<ForecastDay>, ProviderError> {
        let body = self
            .get("forecast", &[("lat", at.lat.to_string()), ("lon", at.lon.to_string())])
            .await?;
        parse_forecast(&body)
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCurrent {
    name: Option<String>,
    main: Option<RawMain>,
    weather: Vec<RawCondition>,
    wind: Option<RawWind>,
    visibility: Option<f64>,
    coord: Option<RawCoord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCondition {
    main: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawWind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawForecast {
    list: Vec<RawForecastEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawForecastEntry {
    dt: Option<i64>,
    main: Option<RawMain>,
    weather: Vec<RawCondition>,
    rain: Option<RawRain>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRain {
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn round(value: f64) -> i32 {
    value.round() as i32
}

fn condition_and_icon(weather: &[RawCondition]) -> (String, String) {
    let first = weather.first();
    let condition = first
        .and_then(|w| w.main.clone())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());
    let icon = first.and_then(|w| w.icon.clone()).unwrap_or_default();
    (condition, icon)
}

/// Decode and normalize a `/weather` response body.
pub fn parse_current(body: &str) -> Result<WeatherReport, ProviderError> {
    let raw: RawCurrent = serde_json::from_str(body).map_err(|source| ProviderError::Decode {
        provider: PROVIDER,
        source,
    })?;

    let main = raw.main.ok_or_else(|| ProviderError::missing(PROVIDER, "main"))?;
    let temp = main
        .temp
        .ok_or_else(|| ProviderError::missing(PROVIDER, "main.temp"))?;
    let coord = raw
        .coord
        .ok_or_else(|| ProviderError::missing(PROVIDER, "coord"))?;

    let humidity = main.humidity.unwrap_or(0.0).clamp(0.0, 100.0);
    let (condition, icon) = condition_and_icon(&raw.weather);
    let wind_ms = raw.wind.and_then(|w| w.speed).unwrap_or(0.0);
    let visibility_m = raw.visibility.unwrap_or(DEFAULT_VISIBILITY_M);

    Ok(WeatherReport {
        location: raw
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Unknown location".to_string()),
        temperature: round(temp),
        condition,
        humidity: humidity.round() as u8,
        wind_speed: round(wind_ms * 3.6),
        pressure: main.pressure.unwrap_or(DEFAULT_PRESSURE_HPA).max(0.0).round() as u32,
        // Not part of the current-conditions endpoint.
        uv_index: 0,
        visibility: round(visibility_m / 1000.0),
        dew_point: round(temp - (100.0 - humidity) / 5.0),
        feels_like: round(main.feels_like.unwrap_or(temp)),
        icon,
        coordinates: Coordinates::new(coord.lat, coord.lon),
    })
}

/// Decode a `/forecast` response and fold the 3-hourly entries into daily
/// summaries, grouped by UTC calendar day in arrival order.
pub fn parse_forecast(body: &str) -> Result<Vec<ForecastDay>, ProviderError> {
    let raw: RawForecast = serde_json::from_str(body).map_err(|source| ProviderError::Decode {
        provider: PROVIDER,
        source,
    })?;

    let mut days: Vec<(NaiveDate, Vec<RawForecastEntry>)> = Vec::new();
    for entry in raw.list {
        let Some(date) = entry
            .dt
            .and_then(|dt| DateTime::from_timestamp(dt, 0))
            .map(|ts| ts.date_naive())
        else {
            continue;
        };
        if entry.main.as_ref().and_then(|m| m.temp).is_none() {
            continue;
        }
        match days.iter_mut().find(|(d, _)| *d == date) {
            Some((_, entries)) => entries.push(entry),
            None => days.push((date, vec![entry])),
        }
    }

    Ok(days
        .into_iter()
        .take(FORECAST_DAYS)
        .map(|(date, entries)| summarize_day(date, &entries))
        .collect())
}

fn summarize_day(date: NaiveDate, entries: &[RawForecastEntry]) -> ForecastDay {
    let temps = entries
        .iter()
        .filter_map(|e| e.main.as_ref().and_then(|m| m.temp));
    let (min, max) = temps.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| {
        (lo.min(t), hi.max(t))
    });
    let precipitation = entries
        .iter()
        .filter_map(|e| e.rain.as_ref().and_then(|r| r.three_hours))
        .sum();
    let (condition, icon) = entries
        .first()
        .map(|e| condition_and_icon(&e.weather))
        .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

    ForecastDay {
        date,
        temperature_min: round(min),
        temperature_max: round(max),
        condition,
        icon,
        precipitation,
    }
}
