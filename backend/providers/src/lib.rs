//! Weather, astronomy, and geolocation providers.
//!
//! Third-party JSON is decoded into loosely-typed raw structs and then
//! normalized into the fully-typed records from `weatherwise-core`.
//! Required fields that are missing are rejected; everything else falls
//! back to a documented default.

pub mod error;
pub mod geolocation;
pub mod mock;
pub mod nasa;
pub mod openweather;

use async_trait::async_trait;
use weatherwise_core::{AstronomyPicture, Coordinates, ForecastDay, WeatherReport};

pub use error::ProviderError;
pub use geolocation::{locate_or_default, FixedLocation};
pub use mock::{StaticAstronomy, StaticWeather};
pub use nasa::NasaClient;
pub use openweather::OpenWeatherClient;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn current(&self, at: Coordinates) -> Result<WeatherReport, ProviderError>;

    async fn by_city(&self, city: &str) -> Result<WeatherReport, ProviderError>;

    /// Up to five days, in calendar order.
    async fn forecast(&self, at: Coordinates) -> Result<Vec<ForecastDay>, ProviderError>;
}

#[async_trait]
pub trait AstronomyProvider: Send + Sync {
    async fn picture_of_the_day(&self) -> Result<AstronomyPicture, ProviderError>;
}

#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn locate(&self) -> Result<Coordinates, ProviderError>;
}
