//! Raw event type from calendar sources.
//!
//! [`RawEvent`] is the source-agnostic shape of an event as decoded from the
//! Google API or an iCal occurrence, before it is normalized into an
//! [`EventRecord`](calwidget_core::EventRecord) in the display time zone.

use chrono::{DateTime, NaiveDate, Utc};

/// A start or end as the source reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawEventTime {
    /// A specific instant.
    DateTime(DateTime<Utc>),
    /// A whole day, with no zone attached.
    Date(NaiveDate),
}

impl RawEventTime {
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

/// A raw calendar event from a source.
///
/// Missing text fields are `None` (or an empty description); normalization
/// turns them into empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// The event title.
    pub summary: Option<String>,
    /// Description parts, in source order.
    pub description: Vec<String>,
    /// The event location.
    pub location: Option<String>,
    /// When the event starts.
    pub start: RawEventTime,
    /// When the event ends, if the source said.
    pub end: Option<RawEventTime>,
}

impl RawEvent {
    /// Creates a new raw event with just a start time.
    pub fn new(start: RawEventTime) -> Self {
        Self {
            summary: None,
            description: Vec::new(),
            location: None,
            start,
            end: None,
        }
    }

    /// Sets the title.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Builder method to append a description part.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description.push(description.into());
        self
    }

    /// Sets the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set the end time.
    pub fn with_end(mut self, end: RawEventTime) -> Self {
        self.end = Some(end);
        self
    }

    /// Returns the title, or an empty string if the source had none.
    pub fn title(&self) -> &str {
        self.summary.as_deref().unwrap_or_default()
    }
}
