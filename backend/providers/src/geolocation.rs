//! Device location.
//!
//! There is no platform location service here; the "device" reports a
//! fixed, configured position, or nothing at all.

use async_trait::async_trait;
use tracing::debug;
use weatherwise_core::Coordinates;

use crate::{GeolocationProvider, ProviderError};

#[derive(Debug, Clone, Default)]
pub struct FixedLocation {
    position: Option<Coordinates>,
}

impl FixedLocation {
    pub fn new(position: Coordinates) -> Self {
        Self {
            position: Some(position),
        }
    }

    /// A device that never grants a fix.
    pub fn unavailable() -> Self {
        Self { position: None }
    }
}

#[async_trait]
impl GeolocationProvider for FixedLocation {
    async fn locate(&self) -> Result<Coordinates, ProviderError> {
        match self.position {
            Some(at) if at.is_valid() => {
                debug!(lat = at.lat, lon = at.lon, "Resolved fixed location");
                Ok(at)
            }
            Some(at) => Err(ProviderError::Unavailable(format!(
                "configured position ({}, {}) is out of range",
                at.lat, at.lon
            ))),
            None => Err(ProviderError::Unavailable(
                "no location has been configured".to_string(),
            )),
        }
    }
}

/// Locate the device, falling back to New York when it can't.
pub async fn locate_or_default(provider: &dyn GeolocationProvider) -> Coordinates {
    match provider.locate().await {
        Ok(at) => at,
        Err(e) => {
            debug!(error = %e, "Falling back to default location");
            Coordinates::NEW_YORK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_configured_position() {
        let loc = FixedLocation::new(Coordinates::new(51.5, -0.12));
        assert_eq!(loc.locate().await.unwrap(), Coordinates::new(51.5, -0.12));
    }

    #[tokio::test]
    async fn unavailable_without_position() {
        let err = FixedLocation::unavailable().locate().await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[tokio::test]
    async fn rejects_out_of_range_position() {
        let loc = FixedLocation::new(Coordinates::new(91.0, 0.0));
        assert!(loc.locate().await.is_err());
    }

    #[tokio::test]
    async fn falls_back_to_new_york() {
        let at = locate_or_default(&FixedLocation::unavailable()).await;
        assert_eq!(at, Coordinates::NEW_YORK);
    }
}
