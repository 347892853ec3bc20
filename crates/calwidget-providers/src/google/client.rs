//! Google Calendar API client.
//!
//! [`GoogleEventsApi`] is the seam between the source and the network:
//! [`GoogleCalendarClient`] implements it with reqwest, tests use fakes.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::provider::BoxFuture;

/// Base URL for Google Calendar API v3.
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Parameters of one events.list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListRequest {
    /// The API key.
    pub api_key: String,
    /// The calendar identifier.
    pub calendar_id: String,
    /// Lower bound for event end time.
    pub time_min: DateTime<Utc>,
    /// Maximum number of events to return.
    pub max_results: Option<usize>,
}

impl EventListRequest {
    /// Returns the query parameters sent with the request.
    ///
    /// Recurring events are always expanded and ordered by start time.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("key", self.api_key.clone()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
            ("timeMin", self.time_min.to_rfc3339()),
        ];
        if let Some(max) = self.max_results {
            query.push(("maxResults", max.to_string()));
        }
        query
    }

    /// Returns the events.list URL for the calendar.
    pub fn url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            CALENDAR_API_BASE,
            urlencoding::encode(&self.calendar_id)
        )
    }
}

/// Lists events of a Google calendar.
pub trait GoogleEventsApi: Send + Sync {
    /// Performs one events.list call.
    fn list_events<'a>(&'a self, request: &'a EventListRequest) -> BoxFuture<'a, ProviderResult<EventList>>;
}

/// Google Calendar API client.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
}

impl GoogleCalendarClient {
    /// Creates a new client with the given request timeout.
    pub fn new(timeout: Duration) -> ProviderResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("calwidget/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ProviderError::network(format!("failed to create HTTP client: {}", e)).with_source(e)
            })?;

        Ok(Self { http_client })
    }

    async fn request_events(&self, request: &EventListRequest) -> ProviderResult<EventList> {
        let response = self
            .http_client
            .get(request.url())
            .query(&request.query())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::network("request timeout")
                } else if e.is_connect() {
                    ProviderError::network(format!("connection failed: {}", e))
                } else {
                    ProviderError::network(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(ProviderError::rate_limited(format!(
                "rate limit exceeded{}",
                retry_after
                    .map(|s| format!(", retry after {} seconds", s))
                    .unwrap_or_default()
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(
                status.as_u16(),
                format!("API error ({}): {}", status, api_error_message(&body)),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)))?;

        let list: EventList = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse response: {}", e)).with_source(e)
        })?;

        debug!(
            calendar = %request.calendar_id,
            count = list.items.len(),
            "listed google events"
        );
        Ok(list)
    }
}

impl GoogleEventsApi for GoogleCalendarClient {
    fn list_events<'a>(&'a self, request: &'a EventListRequest) -> BoxFuture<'a, ProviderResult<EventList>> {
        Box::pin(self.request_events(request))
    }
}

/// Extracts `error.message` from a Google error body, else the raw body.
fn api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Response from the events.list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventList {
    /// The calendar title.
    pub summary: Option<String>,
    /// The listed events.
    #[serde(default)]
    pub items: Vec<ApiEvent>,
}

/// A single event from the Google Calendar API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: Option<String>,
    pub status: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub start: ApiEventTime,
    #[serde(default)]
    pub end: ApiEventTime,
}

/// Event time from the API: `dateTime` for timed events, `date` for all-day ones.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date: Option<String>,
    pub date_time: Option<String>,
}
