//! Config validation: collects every problem in one pass.

use crate::schema::{ApiConfig, WeatherWiseConfig};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

pub fn validate(config: &WeatherWiseConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_chat(config, &mut report);
    validate_voice(config, &mut report);
    validate_providers(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_chat(config: &WeatherWiseConfig, report: &mut ValidationReport) {
    let Some(chat) = &config.chat else { return };

    if let (Some(min), Some(max)) = (chat.min_delay_ms, chat.max_delay_ms) {
        if min > max {
            report.error(
                "chat.minDelayMs",
                format!("minDelayMs ({min}) must not exceed maxDelayMs ({max})"),
            );
        }
    }
    if let Some(timeout) = chat.timeout_ms {
        if timeout == 0 {
            report.error("chat.timeoutMs", "timeoutMs must be > 0");
        } else if let Some(max) = chat.max_delay_ms {
            if timeout <= max {
                report.warn(
                    "chat.timeoutMs",
                    format!("timeoutMs ({timeout}) <= maxDelayMs ({max}); some replies will time out"),
                );
            }
        }
    }
}

fn validate_voice(config: &WeatherWiseConfig, report: &mut ValidationReport) {
    let Some(voice) = &config.voice else { return };

    for (name, value) in [
        ("speakingIntervalMs", voice.speaking_interval_ms),
        ("audioLevelIntervalMs", voice.audio_level_interval_ms),
    ] {
        if value == Some(0) {
            report.error(format!("voice.{name}"), format!("{name} must be > 0"));
        }
    }
    if let Some(volume) = voice.default_volume {
        if !(0.0..=1.0).contains(&volume) {
            report.error(
                "voice.defaultVolume",
                format!("defaultVolume {volume} is outside 0.0..=1.0"),
            );
        }
    }
}

fn validate_providers(config: &WeatherWiseConfig, report: &mut ValidationReport) {
    let providers = config.providers.as_ref();

    let keyed = |api: Option<&ApiConfig>| api.is_some_and(ApiConfig::has_key);
    if !keyed(providers.and_then(|p| p.open_weather.as_ref())) {
        report.warn(
            "providers.openWeather.apiKey",
            "No OpenWeatherMap API key; live weather lookups will fail",
        );
    }
    if !keyed(providers.and_then(|p| p.nasa.as_ref())) {
        report.warn(
            "providers.nasa.apiKey",
            "No NASA API key; the astronomy picture will be unavailable",
        );
    }

    if let Some(loc) = providers.and_then(|p| p.location) {
        if !(-90.0..=90.0).contains(&loc.lat) {
            report.error("providers.location.lat", format!("latitude {} is out of range", loc.lat));
        }
        if !(-180.0..=180.0).contains(&loc.lon) {
            report.error("providers.location.lon", format!("longitude {} is out of range", loc.lon));
        }
    }
}

fn validate_logging(config: &WeatherWiseConfig, report: &mut ValidationReport) {
    let Some(level) = config.logging.as_ref().and_then(|l| l.level.as_deref()) else {
        return;
    };
    if !matches!(
        level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        report.warn("logging.level", format!("Unknown log level '{level}'; using info"));
    }
}
