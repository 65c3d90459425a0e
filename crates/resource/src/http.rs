//! HTTP resource provider for remote font URLs.

use async_trait::async_trait;
use fontfall_traits::{ResourceError, ResourceProvider, SharedResourceData};
use log::debug;
use std::sync::Arc;

/// Fetches font binaries over HTTP(S).
///
/// A non-success status is reported as an error. No retries are attempted.
#[derive(Debug, Clone)]
pub struct HttpResourceProvider {
    client: reqwest::Client,
}

impl HttpResourceProvider {
    /// Creates a provider with a default client.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Io` if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, ResourceError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fontfall/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ResourceError::Io(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Creates a provider around an existing client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn network_error(url: &str, err: reqwest::Error) -> ResourceError {
    ResourceError::Network {
        url: url.to_string(),
        message: err.to_string(),
    }
}

#[async_trait]
impl ResourceProvider for HttpResourceProvider {
    async fn load(&self, url: &str) -> Result<SharedResourceData, ResourceError> {
        debug!("[RESOLVE] GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| network_error(url, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ResourceError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(ResourceError::Network {
                url: url.to_string(),
                message: format!("unexpected status {}", status),
            });
        }

        let body = response.bytes().await.map_err(|e| network_error(url, e))?;
        debug!("[RESOLVE] {} returned {} bytes", url, body.len());
        Ok(Arc::new(body.to_vec()))
    }

    fn name(&self) -> &'static str {
        "HttpResourceProvider"
    }
}
