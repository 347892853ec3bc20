//! HTTP retrieval of iCalendar documents.

use reqwest::Client;
use tracing::{debug, trace};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::BoxFuture;

use super::config::IcalConfig;

/// Retrieves the raw text of a calendar document.
pub trait DocumentFetcher: Send + Sync {
    /// Fetches the document at `url`.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProviderResult<String>>;
}

/// A [`DocumentFetcher`] doing plain HTTP GETs.
#[derive(Debug, Clone)]
pub struct HttpDocumentFetcher {
    client: Client,
}

impl HttpDocumentFetcher {
    /// Creates a fetcher using the timeout and user agent of `config`.
    pub fn new(config: &IcalConfig) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ProviderError::network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> ProviderResult<String> {
        debug!(url, "fetching calendar document");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::network("request timeout")
            } else if e.is_connect() {
                ProviderError::network(format!("connection failed: {}", e))
            } else {
                ProviderError::network(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::from_status(
                status.as_u16(),
                format!("server returned {} for {}", status, url),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        trace!(url, bytes = body.len(), "received calendar document");
        Ok(body)
    }
}

impl DocumentFetcher for HttpDocumentFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(self.get(url))
    }
}
