//! iCal feed source implementation.

use std::sync::Arc;

use calwidget_core::{CalendarFetchResult, EventRecord, EventTime};
use chrono::{NaiveDateTime, NaiveTime};
use tracing::{debug, info};

use crate::error::ProviderResult;
use crate::normalize::normalize_events;
use crate::provider::{BoxFuture, FetchOptions, SourceAdapter};

use super::config::IcalConfig;
use super::expand::expand_events;
use super::fetch::{DocumentFetcher, HttpDocumentFetcher};
use super::parse::parse_ics_content;

/// iCal feed source.
///
/// Fetches the whole document on every call, expands recurring events
/// into the requested window and returns the earliest occurrences first.
pub struct IcalSource {
    config: IcalConfig,
    fetcher: Arc<dyn DocumentFetcher>,
}

impl IcalSource {
    /// Creates a source that retrieves the feed through `fetcher`.
    pub fn new(config: IcalConfig, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { config, fetcher }
    }

    /// Creates a source backed by the reqwest fetcher.
    pub fn from_config(config: IcalConfig) -> ProviderResult<Self> {
        let fetcher = HttpDocumentFetcher::new(&config)?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    /// Returns the configuration.
    pub fn config(&self) -> &IcalConfig {
        &self.config
    }

    async fn load(&self, options: FetchOptions) -> ProviderResult<CalendarFetchResult> {
        let tz = options.window.time_zone();
        let document = self.fetcher.fetch(self.config.url_str()).await?;

        let events = parse_ics_content(&document, tz)?;
        let occurrences = expand_events(&events, &options.window)?;

        let mut items = normalize_events(&occurrences, tz);
        items.sort_by_key(display_order);
        if let Some(max) = options.max_results {
            items.truncate(max);
        }

        info!(
            url = %self.config.url,
            events = events.len(),
            count = items.len(),
            "fetched iCal events"
        );
        debug!(start = %options.window.start, end = %options.window.end, "iCal window");

        Ok(CalendarFetchResult::with_items(
            self.config.calendar_name.clone(),
            items,
        ))
    }
}

impl SourceAdapter for IcalSource {
    fn name(&self) -> &str {
        "ical"
    }

    fn fetch_events(&self, options: FetchOptions) -> BoxFuture<'_, ProviderResult<CalendarFetchResult>> {
        Box::pin(async move {
            self.load(options)
                .await
                .map_err(|e| e.with_provider("ical"))
        })
    }
}

/// Orders events by their displayed start, all-day events first on their day.
///
/// Every record is already in the display zone, so local wall-clock time
/// orders them as shown.
fn display_order(item: &EventRecord) -> NaiveDateTime {
    match item.start_time() {
        EventTime::DateTime(dt) => dt.naive_local(),
        EventTime::AllDay(date) => date.and_time(NaiveTime::MIN),
    }
}
