//! Google Calendar source configuration.

use std::time::Duration;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the Google Calendar source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleConfig {
    /// The API key sent as the `key` query parameter.
    pub api_key: String,
    /// The calendar to list, e.g. `team@group.calendar.google.com`.
    pub calendar_id: String,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl GoogleConfig {
    /// Creates a new configuration for one calendar.
    pub fn new(api_key: impl Into<String>, calendar_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            calendar_id: calendar_id.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns true if an API key is configured.
    ///
    /// Whitespace-only keys count as missing.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
