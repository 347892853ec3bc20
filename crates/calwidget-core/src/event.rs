//! Event types for calendar content.
//!
//! - [`EventRecord`]: A source-agnostic, normalized calendar event
//! - [`CalendarFetchResult`]: The outcome of one fetch against a calendar source

use crate::time::EventTime;

/// A normalized calendar event.
///
/// Records are built once by a source adapter and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    name: String,
    description: Vec<String>,
    location: String,
    start_time: EventTime,
    end_time: Option<EventTime>,
}

impl EventRecord {
    /// Creates a new event with a title and start time.
    pub fn new(name: impl Into<String>, start_time: EventTime) -> Self {
        Self {
            name: name.into(),
            description: Vec::new(),
            location: String::new(),
            start_time,
            end_time: None,
        }
    }

    /// Builder method to set a single-part description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = vec![description.into()];
        self
    }

    /// Builder method to set a multi-part description.
    pub fn with_description_parts<I, S>(mut self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.description = parts.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Builder method to set the end time.
    pub fn with_end_time(mut self, end_time: Option<EventTime>) -> Self {
        self.end_time = end_time;
        self
    }

    /// The event title.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The description parts as received from the source.
    pub fn description_parts(&self) -> &[String] {
        &self.description
    }

    /// The description with its parts joined by a single space.
    pub fn description(&self) -> String {
        self.description.join(" ")
    }

    /// The event location, empty when unknown.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// When the event starts.
    pub fn start_time(&self) -> &EventTime {
        &self.start_time
    }

    /// When the event ends, if the source said.
    pub fn end_time(&self) -> Option<&EventTime> {
        self.end_time.as_ref()
    }

    /// Returns true if this is an all-day event.
    pub fn is_all_day(&self) -> bool {
        self.start_time.is_all_day()
    }

    /// Renders the time range with `pattern`.
    ///
    /// Yields `"{start} - {end}"` when an end time exists and formats
    /// differently from the start, otherwise just `"{start}"`.
    pub fn time_range(&self, pattern: &str) -> String {
        let start = self.start_time.strftime(pattern);
        match self.end_time.as_ref().map(|end| end.strftime(pattern)) {
            Some(end) if end != start => format!("{} - {}", start, end),
            _ => start,
        }
    }
}

/// The outcome of fetching one calendar.
///
/// When `error` is set the fetch failed and `items` is empty; callers must
/// surface the error instead of rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarFetchResult {
    /// Display name of the calendar.
    pub name: String,
    /// Events in display order.
    pub items: Vec<EventRecord>,
    /// Failure description, if the fetch failed.
    pub error: Option<String>,
}

impl CalendarFetchResult {
    /// Creates an empty, successful result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a successful result with events.
    pub fn with_items(name: impl Into<String>, items: Vec<EventRecord>) -> Self {
        Self {
            name: name.into(),
            items,
            error: None,
        }
    }

    /// Creates a failed result. Failed results never carry events.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            items: Vec::new(),
            error: Some(message.into()),
        }
    }

    /// Returns true if the fetch failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns the failure description, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
