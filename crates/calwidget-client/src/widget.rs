//! The calendar widget pipeline.
//!
//! A [`CalendarWidget`] turns one [`CalendarConfig`] into HTML documents:
//! it picks the configured source, resolves the date window against its
//! clock, fetches once and hands the result to the [`Formatter`].

use std::sync::Arc;

use calwidget_core::{
    CalendarFetchResult, Clock, ContentDocument, DateWindow, FormatOptions, Formatter,
    OutputFormat, SystemClock,
};
use calwidget_providers::google::{GoogleConfig, GoogleEventsApi, GoogleSource};
use calwidget_providers::ical::{DocumentFetcher, IcalConfig, IcalSource};
use calwidget_providers::{CalendarSource, ErrorSource, FetchOptions, SourceAdapter};
use tracing::{debug, info};

use crate::config::CalendarConfig;
use crate::error::WidgetError;

/// A configured calendar content item.
pub struct CalendarWidget {
    name: String,
    config: CalendarConfig,
    clock: Arc<dyn Clock>,
    document_fetcher: Option<Arc<dyn DocumentFetcher>>,
    google_api: Option<Arc<dyn GoogleEventsApi>>,
}

impl CalendarWidget {
    /// Creates a widget named `name` that fetches over HTTP.
    pub fn new(name: impl Into<String>, config: CalendarConfig) -> Self {
        Self {
            name: name.into(),
            config,
            clock: Arc::new(SystemClock),
            document_fetcher: None,
            google_api: None,
        }
    }

    /// Uses `clock` for "today" instead of the wall clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Retrieves iCal documents through `fetcher` instead of reqwest.
    pub fn with_document_fetcher(mut self, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        self.document_fetcher = Some(fetcher);
        self
    }

    /// Lists Google events through `api` instead of reqwest.
    pub fn with_google_api(mut self, api: Arc<dyn GoogleEventsApi>) -> Self {
        self.google_api = Some(api);
        self
    }

    /// The content item's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The widget configuration.
    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    /// Builds the source adapter for the configured source.
    ///
    /// A source that cannot be built is replaced by an [`ErrorSource`], so
    /// the problem surfaces as a fetch error.
    pub fn source(&self) -> Box<dyn SourceAdapter> {
        let source = match self.config.calendar_source.parse::<CalendarSource>() {
            Ok(source) => source,
            Err(e) => return Box::new(ErrorSource::new("calendar", e.to_string())),
        };

        match source {
            CalendarSource::Google => {
                let config = GoogleConfig::new(&self.config.api_key, &self.config.calendar_id)
                    .with_timeout(self.config.http_timeout());
                match &self.google_api {
                    Some(api) => Box::new(GoogleSource::new(config, Arc::clone(api))),
                    None => match GoogleSource::from_config(config) {
                        Ok(source) => Box::new(source),
                        Err(e) => Box::new(ErrorSource::new("google", e.to_string())),
                    },
                }
            }
            CalendarSource::Ical => {
                let config = match IcalConfig::new(&self.config.calendar_url, &self.name) {
                    Ok(config) => config.with_timeout(self.config.http_timeout()),
                    Err(e) => return Box::new(ErrorSource::new("ical", e.to_string())),
                };
                match &self.document_fetcher {
                    Some(fetcher) => Box::new(IcalSource::new(config, Arc::clone(fetcher))),
                    None => match IcalSource::from_config(config) {
                        Ok(source) => Box::new(source),
                        Err(e) => Box::new(ErrorSource::new("ical", e.to_string())),
                    },
                }
            }
        }
    }

    /// Resolves the window of days to show.
    pub fn window(&self) -> Result<DateWindow, String> {
        let tz = self.config.time_zone().map_err(|e| e.to_string())?;
        let start = self.config.start_date().map_err(|e| e.to_string())?;
        let end = self.config.end_date().map_err(|e| e.to_string())?;
        Ok(DateWindow::resolve(
            start,
            end,
            self.config.days_ahead,
            self.clock.now(),
            tz,
        ))
    }

    /// Fetches the calendar once. Failures are reported in the result.
    pub async fn fetch_calendar(&self) -> CalendarFetchResult {
        let window = match self.window() {
            Ok(window) => window,
            Err(message) => return CalendarFetchResult::failed(message),
        };
        debug!(start = %window.start, end = %window.end, "resolved date window");

        let options = FetchOptions::new(window).with_max_results(self.config.result_limit());
        self.source().fetch(options).await
    }

    /// The formatter options for this widget.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::UnsupportedFormat`] for an unknown layout.
    pub fn format_options(&self) -> Result<FormatOptions, WidgetError> {
        let output_format = self
            .config
            .output_format
            .parse::<OutputFormat>()
            .map_err(|e| WidgetError::UnsupportedFormat(e.0))?;

        let mut options = FormatOptions::new(output_format)
            .with_day_format(&self.config.day_format)
            .with_time_format(&self.config.time_format)
            .with_content_name(&self.name);
        if let Some(template) = self.config.item_template() {
            options = options.with_item_template(template);
        }
        Ok(options)
    }

    /// Fetches the calendar and renders it.
    ///
    /// The layout is checked before anything is fetched.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::UnsupportedFormat`] for an unknown layout and
    /// [`WidgetError::Fetch`] when the fetch failed; no documents are
    /// produced in either case.
    pub async fn build_content(&self) -> Result<Vec<ContentDocument>, WidgetError> {
        let options = self.format_options()?;
        let result = self.fetch_calendar().await;
        if let Some(message) = result.error {
            return Err(WidgetError::Fetch(message));
        }

        let documents = Formatter::new(options).format(&result);
        info!(
            widget = %self.name,
            events = result.items.len(),
            documents = documents.len(),
            "built calendar content"
        );
        Ok(documents)
    }
}
