use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} is not configured: {reason}")]
    NotConfigured {
        provider: &'static str,
        reason: &'static str,
    },

    #[error("{provider} HTTP request failed: {source}")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned {status}: {body}")]
    Http {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to decode {provider} response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{provider} response is missing required field `{field}`")]
    MissingField {
        provider: &'static str,
        field: &'static str,
    },

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

impl ProviderError {
    pub(crate) fn missing(provider: &'static str, field: &'static str) -> Self {
        ProviderError::MissingField { provider, field }
    }
}

/// Send a request and return the body, mapping transport and status failures.
pub(crate) async fn fetch_text(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<String, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|source| ProviderError::Request { provider, source })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Http {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    response
        .text()
        .await
        .map_err(|source| ProviderError::Request { provider, source })
}
