//! Google Calendar source implementation.
//!
//! This module implements the [`SourceAdapter`] trait for Google Calendar.

use std::sync::Arc;

use calwidget_core::CalendarFetchResult;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use crate::error::ProviderResult;
use crate::normalize::normalize_events;
use crate::provider::{BoxFuture, FetchOptions, SourceAdapter};
use crate::raw_event::{RawEvent, RawEventTime};

use super::client::{ApiEvent, ApiEventTime, EventListRequest, GoogleCalendarClient, GoogleEventsApi};
use super::config::GoogleConfig;

/// Google Calendar source.
pub struct GoogleSource {
    config: GoogleConfig,
    api: Arc<dyn GoogleEventsApi>,
}

impl GoogleSource {
    /// Creates a source that lists events through `api`.
    pub fn new(config: GoogleConfig, api: Arc<dyn GoogleEventsApi>) -> Self {
        Self { config, api }
    }

    /// Creates a source backed by the reqwest client.
    pub fn from_config(config: GoogleConfig) -> ProviderResult<Self> {
        let client = GoogleCalendarClient::new(config.timeout)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    async fn list(&self, options: FetchOptions) -> ProviderResult<CalendarFetchResult> {
        if !self.config.has_api_key() {
            debug!(calendar = %self.config.calendar_id, "no google api key configured, skipping fetch");
            return Ok(CalendarFetchResult::new());
        }

        let request = EventListRequest {
            api_key: self.config.api_key.clone(),
            calendar_id: self.config.calendar_id.clone(),
            time_min: options.window.start.with_timezone(&Utc),
            max_results: options.max_results,
        };

        let list = self
            .api
            .list_events(&request)
            .await
            .map_err(|e| e.with_provider("google"))?;

        let raw_events: Vec<RawEvent> = list.items.into_iter().filter_map(convert_event).collect();
        let items = normalize_events(&raw_events, options.window.time_zone());

        debug!(calendar = %self.config.calendar_id, count = items.len(), "fetched google events");
        Ok(CalendarFetchResult::with_items(
            list.summary.unwrap_or_default(),
            items,
        ))
    }
}

impl SourceAdapter for GoogleSource {
    fn name(&self) -> &str {
        "google"
    }

    fn fetch_events(&self, options: FetchOptions) -> BoxFuture<'_, ProviderResult<CalendarFetchResult>> {
        Box::pin(self.list(options))
    }
}

/// Converts a Google Calendar API event to a RawEvent.
///
/// Cancelled events and events without a usable start are dropped.
fn convert_event(event: ApiEvent) -> Option<RawEvent> {
    if event.status.as_deref() == Some("cancelled") {
        return None;
    }

    let id = event.id.as_deref().unwrap_or("<unknown>");
    let Some(start) = convert_time(&event.start) else {
        warn!(event = id, "google event has no usable start time");
        return None;
    };

    let mut raw = RawEvent::new(start);
    raw.end = convert_time(&event.end);
    raw.summary = event.summary;
    raw.location = event.location;
    raw.description = event.description.into_iter().collect();
    Some(raw)
}

/// Prefers the precise `dateTime`, falling back to the all-day `date`.
fn convert_time(time: &ApiEventTime) -> Option<RawEventTime> {
    if let Some(ref dt) = time.date_time {
        match DateTime::parse_from_rfc3339(dt) {
            Ok(parsed) => return Some(RawEventTime::DateTime(parsed.with_timezone(&Utc))),
            Err(e) => warn!(value = %dt, error = %e, "failed to parse google dateTime"),
        }
    }

    let date = time.date.as_deref()?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| warn!(value = %date, error = %e, "failed to parse google date"))
        .ok()
        .map(RawEventTime::Date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProviderError, ProviderErrorCode};
    use crate::google::client::EventList;
    use calwidget_core::DateWindow;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Records requests and answers with a canned response.
    struct FakeApi {
        response: Result<String, u16>,
        requests: Mutex<Vec<EventListRequest>>,
    }

    impl FakeApi {
        fn ok(json: &str) -> Self {
            Self {
                response: Ok(json.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                response: Err(status),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl GoogleEventsApi for FakeApi {
        fn list_events<'a>(&'a self, request: &'a EventListRequest) -> BoxFuture<'a, ProviderResult<EventList>> {
            self.requests.lock().unwrap().push(request.clone());
            let result = match &self.response {
                Ok(json) => Ok(serde_json::from_str(json).unwrap()),
                Err(status) => Err(ProviderError::from_status(*status, "API error: Not Found")),
            };
            Box::pin(async move { result })
        }
    }

    fn options(tz: chrono_tz::Tz) -> FetchOptions {
        let now = Utc.with_ymd_and_hms(2025, 2, 5, 12, 0, 0).unwrap();
        FetchOptions::new(DateWindow::resolve(None, None, 7, now, tz)).with_max_results(Some(5))
    }

    const LISTING: &str = r#"{
        "summary": "Campus Events",
        "items": [
            {
                "id": "a",
                "summary": "Open day",
                "description": "Tours every hour",
                "location": "Main hall",
                "start": { "dateTime": "2025-02-05T15:00:00Z" },
                "end": { "dateTime": "2025-02-05T16:30:00Z" }
            },
            {
                "id": "b",
                "status": "cancelled",
                "summary": "Cancelled talk",
                "start": { "dateTime": "2025-02-05T17:00:00Z" },
                "end": { "dateTime": "2025-02-05T18:00:00Z" }
            },
            {
                "id": "c",
                "summary": "Reading week",
                "start": { "date": "2025-02-06" },
                "end": { "date": "2025-02-07" }
            }
        ]
    }"#;

    #[tokio::test]
    async fn fetch_maps_listing() {
        let api = Arc::new(FakeApi::ok(LISTING));
        let source = GoogleSource::new(GoogleConfig::new("k3y", "campus"), api.clone());

        let result = source.fetch(options(chrono_tz::America::New_York)).await;

        assert!(!result.is_error());
        assert_eq!(result.name, "Campus Events");
        assert_eq!(result.items.len(), 2);

        let open_day = &result.items[0];
        assert_eq!(open_day.name(), "Open day");
        assert_eq!(open_day.description(), "Tours every hour");
        assert_eq!(open_day.location(), "Main hall");
        assert_eq!(open_day.time_range("%H:%M"), "10:00 - 11:30");

        let reading_week = &result.items[1];
        assert!(reading_week.is_all_day());
        assert_eq!(
            reading_week.start_time().date(),
            NaiveDate::from_ymd_opt(2025, 2, 6).unwrap()
        );
    }

    #[tokio::test]
    async fn fetch_sends_window_start_and_limit() {
        let api = Arc::new(FakeApi::ok(r#"{"summary": "Empty"}"#));
        let source = GoogleSource::new(GoogleConfig::new("k3y", "campus"), api.clone());

        source.fetch(options(chrono_tz::America::New_York)).await;

        let requests = api.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].calendar_id, "campus");
        assert_eq!(requests[0].max_results, Some(5));
        // Local midnight in New York.
        assert_eq!(
            requests[0].time_min,
            Utc.with_ymd_and_hms(2025, 2, 5, 5, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn blank_api_key_skips_request() {
        let api = Arc::new(FakeApi::ok(LISTING));
        let source = GoogleSource::new(GoogleConfig::new("  ", "campus"), api.clone());

        let result = source.fetch(options(chrono_tz::UTC)).await;

        assert_eq!(api.calls(), 0);
        assert!(!result.is_error());
        assert!(result.items.is_empty());
        assert_eq!(result.name, "");
    }

    #[tokio::test]
    async fn api_failure_becomes_result_error() {
        let api = Arc::new(FakeApi::failing(404));
        let source = GoogleSource::new(GoogleConfig::new("k3y", "missing"), api);

        let err = source
            .fetch_events(options(chrono_tz::UTC))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::NotFound);
        assert_eq!(err.provider(), Some("google"));

        let result = source.fetch(options(chrono_tz::UTC)).await;
        assert!(result.items.is_empty());
        assert_eq!(
            result.error_message(),
            Some("[google] not_found: API error: Not Found")
        );
    }

    #[test]
    fn convert_time_prefers_date_time() {
        let time = ApiEventTime {
            date: Some("2025-02-05".to_string()),
            date_time: Some("2025-02-05T09:00:00+01:00".to_string()),
        };
        assert_eq!(
            convert_time(&time),
            Some(RawEventTime::DateTime(
                Utc.with_ymd_and_hms(2025, 2, 5, 8, 0, 0).unwrap()
            ))
        );

        assert_eq!(convert_time(&ApiEventTime::default()), None);
    }
}
