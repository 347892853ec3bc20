//! RawEvent to EventRecord conversion.
//!
//! Precise times are converted into the display time zone so every layout
//! renders them as local wall-clock times. All-day dates are kept as dates.

use calwidget_core::{EventRecord, EventTime};
use chrono_tz::Tz;

use crate::raw_event::{RawEvent, RawEventTime};

/// Converts a [`RawEvent`] to an [`EventRecord`] displayed in `tz`.
pub fn normalize_event(raw: &RawEvent, tz: Tz) -> EventRecord {
    EventRecord::new(raw.title(), convert_time(&raw.start, tz))
        .with_description_parts(raw.description.iter().cloned())
        .with_location(raw.location.clone().unwrap_or_default())
        .with_end_time(raw.end.as_ref().map(|end| convert_time(end, tz)))
}

/// Batch normalize multiple raw events, keeping their order.
pub fn normalize_events(raw_events: &[RawEvent], tz: Tz) -> Vec<EventRecord> {
    raw_events.iter().map(|raw| normalize_event(raw, tz)).collect()
}

fn convert_time(raw: &RawEventTime, tz: Tz) -> EventTime {
    match raw {
        RawEventTime::DateTime(dt) => EventTime::from_datetime(dt.with_timezone(&tz)),
        RawEventTime::Date(date) => EventTime::from_date(*date),
    }
}
