use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

/// Connection state shared by every simulated session.
///
/// `Disconnected → Connecting → Connected → Disconnected`. A connected
/// session may also fall straight back to `Disconnected` on error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl SessionStatus {
    /// Whether `self → next` is an edge of the lifecycle state machine.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Disconnected)
                | (Connected, Disconnected)
        )
    }

    pub fn is_active(self) -> bool {
        self != SessionStatus::Disconnected
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Disconnected => "disconnected",
            SessionStatus::Connecting => "connecting",
            SessionStatus::Connected => "connected",
        };
        f.write_str(s)
    }
}

/// Opaque token returned by a successful voice `start()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionHandle(String);

impl SessionHandle {
    pub fn generate() -> Self {
        Self(format!("demo-conversation-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Provider records
// ---------------------------------------------------------------------------

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const NEW_YORK: Coordinates = Coordinates {
        lat: 40.7128,
        lon: -74.0060,
    };

    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Current conditions at a location, normalized to metric units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub location: String,
    /// Degrees Celsius, rounded.
    pub temperature: i32,
    pub condition: String,
    /// Percent.
    pub humidity: u8,
    /// km/h, rounded.
    pub wind_speed: i32,
    /// hPa.
    pub pressure: u32,
    pub uv_index: u8,
    /// km, rounded.
    pub visibility: i32,
    pub dew_point: i32,
    pub feels_like: i32,
    pub icon: String,
    pub coordinates: Coordinates,
}

/// One day of a multi-day forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temperature_min: i32,
    pub temperature_max: i32,
    pub condition: String,
    pub icon: String,
    /// Accumulated rainfall in mm.
    pub precipitation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstronomyPicture {
    pub title: String,
    pub explanation: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hd_url: Option<String>,
    pub media_type: String,
    pub date: String,
}
