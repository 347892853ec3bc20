//! iCal feed source configuration.

use std::time::Duration;
use url::Url;

use crate::error::{ProviderError, ProviderResult};

/// Configuration for an iCal feed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcalConfig {
    /// URL of the iCalendar document.
    pub url: Url,

    /// Display name of the calendar. Feeds carry no usable name, so the
    /// widget's own name is used.
    pub calendar_name: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Sent with every request.
    pub user_agent: String,
}

impl IcalConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Creates a new configuration for the feed at `url`.
    ///
    /// `webcal://` URLs are fetched over HTTPS.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL is invalid or not HTTP(S).
    pub fn new(url: impl AsRef<str>, calendar_name: impl Into<String>) -> ProviderResult<Self> {
        let raw = url.as_ref().trim();
        let normalized = match raw.get(..9) {
            Some(scheme) if scheme.eq_ignore_ascii_case("webcal://") => format!("https://{}", &raw[9..]),
            _ => raw.to_string(),
        };

        let parsed = Url::parse(&normalized).map_err(|e| {
            ProviderError::configuration(format!("invalid calendar url {:?}: {}", raw, e)).with_source(e)
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProviderError::configuration(format!(
                "unsupported calendar url scheme {:?}",
                parsed.scheme()
            )));
        }

        Ok(Self {
            url: parsed,
            calendar_name: calendar_name.into(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("calwidget/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the feed URL as a string.
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }
}
