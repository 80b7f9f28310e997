use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use weatherwise_core::{AstronomyPicture, Coordinates, ForecastDay, WeatherReport};

use crate::{AstronomyProvider, ProviderError, WeatherProvider};

/// Canned weather for offline use and tests. Every lookup answers with the
/// same report, relocated to the requested coordinates.
pub struct StaticWeather {
    report: WeatherReport,
    start: NaiveDate,
}

impl StaticWeather {
    pub fn new() -> Self {
        Self {
            report: WeatherReport {
                location: "New York".to_string(),
                temperature: 22,
                condition: "Clear".to_string(),
                humidity: 55,
                wind_speed: 12,
                pressure: 1015,
                uv_index: 0,
                visibility: 10,
                dew_point: 13,
                feels_like: 22,
                icon: "01d".to_string(),
                coordinates: Coordinates::NEW_YORK,
            },
            start: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default(),
        }
    }

    pub fn with_report(mut self, report: WeatherReport) -> Self {
        self.report = report;
        self
    }

    pub fn starting(mut self, date: NaiveDate) -> Self {
        self.start = date;
        self
    }
}

impl Default for StaticWeather {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherProvider for StaticWeather {
    fn name(&self) -> &str {
        "static"
    }

    async fn current(&self, at: Coordinates) -> Result<WeatherReport, ProviderError> {
        Ok(WeatherReport {
            coordinates: at,
            ..self.report.clone()
        })
    }

    async fn by_city(&self, city: &str) -> Result<WeatherReport, ProviderError> {
        Ok(WeatherReport {
            location: city.to_string(),
            ..self.report.clone()
        })
    }

    async fn forecast(&self, _at: Coordinates) -> Result<Vec<ForecastDay>, ProviderError> {
        Ok((0..5)
            .map(|i| ForecastDay {
                date: self.start + Duration::days(i),
                temperature_min: self.report.temperature - 6 + i as i32,
                temperature_max: self.report.temperature + i as i32,
                condition: self.report.condition.clone(),
                icon: self.report.icon.clone(),
                precipitation: 0.0,
            })
            .collect())
    }
}

/// Canned astronomy picture.
#[derive(Default)]
pub struct StaticAstronomy {
    picture: Option<AstronomyPicture>,
}

impl StaticAstronomy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_picture(mut self, picture: AstronomyPicture) -> Self {
        self.picture = Some(picture);
        self
    }
}

#[async_trait]
impl AstronomyProvider for StaticAstronomy {
    async fn picture_of_the_day(&self) -> Result<AstronomyPicture, ProviderError> {
        Ok(self.picture.clone().unwrap_or_else(|| AstronomyPicture {
            title: "Pillars of Creation".to_string(),
            explanation: "Towers of cold gas and dust in the Eagle Nebula.".to_string(),
            url: "https://apod.nasa.gov/apod/image/pillars.jpg".to_string(),
            hd_url: None,
            media_type: "image".to_string(),
            date: "2024-06-01".to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn current_uses_requested_coordinates() {
        let provider = StaticWeather::new();
        let at = Coordinates::new(48.85, 2.35);
        let report = provider.current(at).await.unwrap();
        assert_eq!(report.coordinates, at);
        assert_eq!(report.temperature, 22);
    }

    #[tokio::test]
    async fn by_city_uses_city_name() {
        let report = StaticWeather::new().by_city("Oslo").await.unwrap();
        assert_eq!(report.location, "Oslo");
    }

    #[tokio::test]
    async fn forecast_has_five_consecutive_days() {
        let days = StaticWeather::new()
            .forecast(Coordinates::NEW_YORK)
            .await
            .unwrap();
        assert_eq!(days.len(), 5);
        for pair in days.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
        assert!(days.iter().all(|d| d.temperature_min <= d.temperature_max));
    }

    #[tokio::test]
    async fn astronomy_override() {
        let default = StaticAstronomy::new().picture_of_the_day().await.unwrap();
        assert_eq!(default.title, "Pillars of Creation");

        let custom = AstronomyPicture {
            title: "Moon".into(),
            ..default
        };
        let provider = StaticAstronomy::new().with_picture(custom.clone());
        assert_eq!(provider.picture_of_the_day().await.unwrap(), custom);
    }
}
