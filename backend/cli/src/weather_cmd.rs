//! `weatherwise weather` and `weatherwise apod`.

use anyhow::Result;
use weatherwise_core::Coordinates;
use weatherwise_providers::locate_or_default;

use crate::config::AppContext;

/// Where to look up weather.
pub enum Target {
    At(Coordinates),
    City(String),
    /// The device location, or the default when unavailable.
    Here,
}

impl Target {
    pub fn from_args(lat: Option<f64>, lon: Option<f64>, city: Option<String>) -> Result<Self> {
        match (lat, lon, city) {
            (_, _, Some(city)) => Ok(Target::City(city)),
            (Some(lat), Some(lon), None) => {
                let at = Coordinates::new(lat, lon);
                anyhow::ensure!(at.is_valid(), "coordinates ({lat}, {lon}) are out of range");
                Ok(Target::At(at))
            }
            (None, None, None) => Ok(Target::Here),
            _ => anyhow::bail!("--lat and --lon must be given together"),
        }
    }
}

pub async fn run(ctx: &AppContext, target: Target, forecast: bool) -> Result<()> {
    let provider = ctx.weather_provider();

    let at = match target {
        Target::At(at) => at,
        Target::Here => locate_or_default(ctx.geolocation().as_ref()).await,
        Target::City(city) => {
            let report = provider.by_city(&city).await?;
            if !forecast {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }
            report.coordinates
        }
    };

    if forecast {
        let days = provider.forecast(at).await?;
        println!("{}", serde_json::to_string_pretty(&days)?);
    } else {
        let report = provider.current(at).await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

pub async fn run_apod(ctx: &AppContext) -> Result<()> {
    let picture = ctx.astronomy_provider().picture_of_the_day().await?;
    println!("{}", serde_json::to_string_pretty(&picture)?);
    Ok(())
}
