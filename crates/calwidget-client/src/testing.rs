//! In-memory stand-ins for the network collaborators.

use std::sync::{Arc, Mutex};

use calwidget_core::FixedClock;
use calwidget_providers::google::{EventList, EventListRequest, GoogleEventsApi};
use calwidget_providers::ical::DocumentFetcher;
use calwidget_providers::{BoxFuture, ProviderError, ProviderResult};
use chrono::{TimeZone, Utc};

/// Wednesday 2025-02-05, noon UTC.
pub fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 2, 5, 12, 0, 0).unwrap()))
}

/// Serves one fixed document, or fails with an HTTP status.
pub struct FakeFetcher {
    body: Result<String, u16>,
    urls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn serving(body: &str) -> Arc<Self> {
        Arc::new(Self {
            body: Ok(body.to_string()),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            body: Err(status),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl DocumentFetcher for FakeFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, ProviderResult<String>> {
        self.urls.lock().unwrap().push(url.to_string());
        let result = self.body.clone().map_err(|status| {
            ProviderError::from_status(status, format!("server returned {}", status))
        });
        Box::pin(async move { result })
    }
}

/// Answers events.list with a fixed JSON body and records the requests.
pub struct FakeGoogleApi {
    body: String,
    requests: Mutex<Vec<EventListRequest>>,
}

impl FakeGoogleApi {
    pub fn serving(body: &str) -> Arc<Self> {
        Arc::new(Self {
            body: body.to_string(),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::serving(r#"{"summary": "Empty", "items": []}"#)
    }

    pub fn requests(&self) -> Vec<EventListRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl GoogleEventsApi for FakeGoogleApi {
    fn list_events<'a>(&'a self, request: &'a EventListRequest) -> BoxFuture<'a, ProviderResult<EventList>> {
        self.requests.lock().unwrap().push(request.clone());
        let list = serde_json::from_str::<EventList>(&self.body)
            .map_err(|e| ProviderError::invalid_response(e.to_string()));
        Box::pin(async move { list })
    }
}

/// Three events on two days, plus one outside the default window.
pub const CAMPUS_FEED: &str = "BEGIN:VCALENDAR\r\n\
    VERSION:2.0\r\n\
    PRODID:-//Campus//Events//EN\r\n\
    BEGIN:VEVENT\r\n\
    UID:yoga@example.com\r\n\
    DTSTART:20250205T140000Z\r\n\
    DTEND:20250205T150000Z\r\n\
    SUMMARY:Yoga\r\n\
    LOCATION:Gym\r\n\
    END:VEVENT\r\n\
    BEGIN:VEVENT\r\n\
    UID:lunch@example.com\r\n\
    DTSTART:20250205T170000Z\r\n\
    DTEND:20250205T180000Z\r\n\
    SUMMARY:Lunch & Learn\r\n\
    END:VEVENT\r\n\
    BEGIN:VEVENT\r\n\
    UID:hack@example.com\r\n\
    DTSTART:20250206T230000Z\r\n\
    SUMMARY:Hack night\r\n\
    END:VEVENT\r\n\
    BEGIN:VEVENT\r\n\
    UID:spring@example.com\r\n\
    DTSTART:20250401T140000Z\r\n\
    SUMMARY:Spring fair\r\n\
    END:VEVENT\r\n\
    END:VCALENDAR";
