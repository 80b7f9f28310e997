//! NASA Astronomy Picture of the Day.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use weatherwise_core::AstronomyPicture;

use crate::error::{fetch_text, ProviderError};
use crate::AstronomyProvider;

const PROVIDER: &str = "nasa";

pub const DEFAULT_BASE_URL: &str = "https://api.nasa.gov";

pub struct NasaClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl NasaClient {
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
}

#[async_trait]
impl AstronomyProvider for NasaClient {
    async fn picture_of_the_day(&self) -> Result<AstronomyPicture, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured {
                provider: PROVIDER,
                reason: "missing API key",
            });
        }
        debug!("Requesting APOD");

        let request = self
            .client
            .get(format!("{}/planetary/apod", self.base_url))
            .query(&[("api_key", self.api_key.as_str())]);
        let body = fetch_text(PROVIDER, request).await?;
        parse_apod(&body)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawApod {
    title: Option<String>,
    explanation: Option<String>,
    url: Option<String>,
    hdurl: Option<String>,
    media_type: Option<String>,
    date: Option<String>,
}

pub fn parse_apod(body: &str) -> Result<AstronomyPicture, ProviderError> {
    let raw: RawApod = serde_json::from_str(body).map_err(|source| ProviderError::Decode {
        provider: PROVIDER,
        source,
    })?;

    let title = raw
        .title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ProviderError::missing(PROVIDER, "title"))?;
    let url = raw
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ProviderError::missing(PROVIDER, "url"))?;

    Ok(AstronomyPicture {
        title,
        explanation: raw.explanation.unwrap_or_default(),
        url,
        hd_url: raw.hdurl,
        media_type: raw.media_type.unwrap_or_else(|| "image".to_string()),
        date: raw.date.unwrap_or_default(),
    })
}
