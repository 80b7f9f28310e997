//! Runtime context: prepared config plus provider wiring.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use weatherwise_config::schema::{ApiConfig, ProvidersConfig};
use weatherwise_config::{config_dir, config_file_path, load_and_prepare, WeatherWiseConfig};
use weatherwise_core::Coordinates;
use weatherwise_providers::{
    AstronomyProvider, FixedLocation, GeolocationProvider, NasaClient, OpenWeatherClient,
    StaticAstronomy, StaticWeather, WeatherProvider,
};

pub struct AppContext {
    pub path: PathBuf,
    pub config: WeatherWiseConfig,
}

impl AppContext {
    /// Load from `path`, or `<config dir>/config.yaml` when not given.
    pub async fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = path.unwrap_or_else(|| config_file_path(&config_dir()));
        let config = load_and_prepare(&path).await?;
        Ok(Self { path, config })
    }

    fn api(&self, pick: impl Fn(&ProvidersConfig) -> Option<&ApiConfig>) -> Option<ApiConfig> {
        self.config
            .providers
            .as_ref()
            .and_then(pick)
            .filter(|api| api.has_key())
            .cloned()
    }

    /// OpenWeatherMap when a key is configured, canned data otherwise.
    pub fn weather_provider(&self) -> Arc<dyn WeatherProvider> {
        match self.api(|p| p.open_weather.as_ref()) {
            Some(api) => {
                let mut client = OpenWeatherClient::new(api.api_key.unwrap_or_default());
                if let Some(url) = api.base_url {
                    client = client.with_base_url(url);
                }
                info!("Using OpenWeatherMap provider");
                Arc::new(client)
            }
            None => {
                warn!("No OpenWeatherMap key; serving canned weather");
                Arc::new(StaticWeather::new())
            }
        }
    }

    pub fn astronomy_provider(&self) -> Arc<dyn AstronomyProvider> {
        match self.api(|p| p.nasa.as_ref()) {
            Some(api) => {
                let mut client = NasaClient::new(api.api_key.unwrap_or_default());
                if let Some(url) = api.base_url {
                    client = client.with_base_url(url);
                }
                Arc::new(client)
            }
            None => {
                warn!("No NASA key; serving a canned picture");
                Arc::new(StaticAstronomy::new())
            }
        }
    }

    pub fn geolocation(&self) -> Arc<dyn GeolocationProvider> {
        let position = self
            .config
            .providers
            .as_ref()
            .and_then(|p| p.location)
            .map(|loc| Coordinates::new(loc.lat, loc.lon));
        Arc::new(match position {
            Some(at) => FixedLocation::new(at),
            None => FixedLocation::unavailable(),
        })
    }
}
