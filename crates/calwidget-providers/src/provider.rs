//! SourceAdapter trait definition.
//!
//! This module defines the [`SourceAdapter`] trait, the core abstraction for
//! calendar sources (Google Calendar, iCal feeds), and [`CalendarSource`],
//! the configured choice between them.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use calwidget_core::{CalendarFetchResult, DateWindow};
use thiserror::Error;
use tracing::warn;

use crate::error::{ProviderError, ProviderResult};

/// A boxed future for async trait methods.
///
/// Keeps the traits in this crate object-safe so sources can be held as
/// `Arc<dyn SourceAdapter>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The calendar sources a widget can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarSource {
    /// The Google Calendar events API.
    Google,
    /// An iCalendar document fetched over HTTP.
    Ical,
}

impl CalendarSource {
    /// Every source, in the order they are offered.
    pub const ALL: [CalendarSource; 2] = [Self::Google, Self::Ical];

    /// The configuration value for this source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Ical => "ical",
        }
    }

    /// The human-readable name shown in validation messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Ical => "iCal",
        }
    }
}

impl fmt::Display for CalendarSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a configured source name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported calendar source {0}")]
pub struct UnknownCalendarSource(pub String);

impl FromStr for CalendarSource {
    type Err = UnknownCalendarSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "ical" => Ok(Self::Ical),
            _ => Err(UnknownCalendarSource(s.to_string())),
        }
    }
}

/// Options for one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// The days to show, in the display time zone.
    pub window: DateWindow,
    /// Maximum number of events to return.
    pub max_results: Option<usize>,
}

impl FetchOptions {
    /// Creates fetch options for a window, without a result limit.
    pub fn new(window: DateWindow) -> Self {
        Self {
            window,
            max_results: None,
        }
    }

    /// Builder method to set max results.
    pub fn with_max_results(mut self, max: Option<usize>) -> Self {
        self.max_results = max;
        self
    }
}

/// The core abstraction for calendar sources.
///
/// Implementors provide [`fetch_events`](SourceAdapter::fetch_events);
/// callers use [`fetch`](SourceAdapter::fetch), which folds any failure
/// into [`CalendarFetchResult::error`] so a fetch never fails outright.
pub trait SourceAdapter: Send + Sync {
    /// Returns the name of this source (e.g., "google", "ical").
    fn name(&self) -> &str;

    /// Fetches and normalizes the events for a window.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on transport failures and undecodable data.
    fn fetch_events(&self, options: FetchOptions) -> BoxFuture<'_, ProviderResult<CalendarFetchResult>>;

    /// Fetches events, reporting failures in the result instead of raising.
    fn fetch(&self, options: FetchOptions) -> BoxFuture<'_, CalendarFetchResult> {
        Box::pin(async move {
            match self.fetch_events(options).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(source = self.name(), error = %e, "calendar fetch failed");
                    CalendarFetchResult::failed(e.to_string())
                }
            }
        })
    }
}

/// A source that always fails with the same message.
///
/// Stands in for a source that could not be configured, such as an
/// unrecognized source name.
#[derive(Debug, Clone)]
pub struct ErrorSource {
    name: String,
    message: String,
}

impl ErrorSource {
    /// Creates a new failing source.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl SourceAdapter for ErrorSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_events(&self, _options: FetchOptions) -> BoxFuture<'_, ProviderResult<CalendarFetchResult>> {
        let error = ProviderError::configuration(&self.message).with_provider(&self.name);
        Box::pin(async move { Err(error) })
    }

    // The configured message is reported as-is, without the error code prefix.
    fn fetch(&self, _options: FetchOptions) -> BoxFuture<'_, CalendarFetchResult> {
        let result = CalendarFetchResult::failed(&self.message);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn window() -> DateWindow {
        DateWindow::resolve(
            NaiveDate::from_ymd_opt(2025, 2, 5),
            None,
            7,
            Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
            chrono_tz::UTC,
        )
    }

    #[test]
    fn calendar_source_parsing() {
        assert_eq!("google".parse::<CalendarSource>(), Ok(CalendarSource::Google));
        assert_eq!(" iCal ".parse::<CalendarSource>(), Ok(CalendarSource::Ical));

        let err = "outlook".parse::<CalendarSource>().unwrap_err();
        assert_eq!(err.to_string(), "unsupported calendar source outlook");
    }

    #[test]
    fn calendar_source_labels() {
        let labels: Vec<_> = CalendarSource::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels, ["Google", "iCal"]);
        assert_eq!(CalendarSource::Ical.to_string(), "ical");
    }

    #[test]
    fn fetch_options_builder() {
        let options = FetchOptions::new(window()).with_max_results(Some(3));
        assert_eq!(options.max_results, Some(3));
        assert_eq!(options.window, window());
    }

    struct Broken;

    impl SourceAdapter for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn fetch_events(&self, _options: FetchOptions) -> BoxFuture<'_, ProviderResult<CalendarFetchResult>> {
            Box::pin(async { Err(ProviderError::network("connection refused").with_provider("broken")) })
        }
    }

    #[tokio::test]
    async fn fetch_folds_errors_into_result() {
        let result = Broken.fetch(FetchOptions::new(window())).await;
        assert!(result.is_error());
        assert!(result.items.is_empty());
        assert_eq!(
            result.error_message(),
            Some("[broken] network_error: connection refused")
        );
    }

    #[tokio::test]
    async fn error_source_reports_its_message() {
        let source = ErrorSource::new("outlook", "unsupported calendar source outlook");
        assert_eq!(source.name(), "outlook");

        let result = source.fetch(FetchOptions::new(window())).await;
        assert_eq!(result.error_message(), Some("unsupported calendar source outlook"));
        assert!(result.items.is_empty());

        let err = source.fetch_events(FetchOptions::new(window())).await.unwrap_err();
        assert_eq!(err.provider(), Some("outlook"));
    }
}
