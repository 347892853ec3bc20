//! ICS/iCalendar parsing utilities.
//!
//! This module parses iCalendar (RFC 5545) documents into [`IcsEvent`]s,
//! keeping each event's recurrence data so it can be expanded later.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event, EventLike,
    Property,
};
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};

/// A VEVENT start, end, or exception date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcsTime {
    /// A `VALUE=DATE` date.
    Date(NaiveDate),
    /// A date-time in the zone it was written in.
    DateTime(DateTime<Tz>),
}

impl IcsTime {
    /// Returns the instant used to match occurrences against exceptions.
    ///
    /// Dates map to midnight UTC, the same anchor recurrence expansion uses.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            Self::Date(date) => date.and_time(chrono::NaiveTime::MIN).and_utc(),
            Self::DateTime(dt) => dt.with_timezone(&Utc),
        }
    }
}

/// An event as written in the document, before recurrence expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcsEvent {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: IcsTime,
    pub end: Option<IcsTime>,
    /// The raw `RRULE` value, e.g. `FREQ=WEEKLY;BYDAY=MO`.
    pub rrule: Option<String>,
    /// Extra occurrences added with `RDATE`.
    pub rdates: Vec<IcsTime>,
    /// Occurrences removed with `EXDATE`.
    pub exdates: Vec<IcsTime>,
    /// Set on an override of one occurrence of a recurring event.
    pub recurrence_id: Option<IcsTime>,
}

/// Parses ICS content and extracts its events.
///
/// Floating times and times in an unknown `TZID` are read as wall-clock
/// times in `floating_zone`. Events without a start are skipped.
///
/// # Errors
///
/// Returns an invalid response error if the content is not an iCalendar
/// document.
pub fn parse_ics_content(ics: &str, floating_zone: Tz) -> ProviderResult<Vec<IcsEvent>> {
    if !ics.contains("BEGIN:VCALENDAR") {
        return Err(ProviderError::invalid_response(
            "response is not an iCalendar document",
        ));
    }

    let calendar = ics.parse::<Calendar>().map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse iCalendar data: {}", e))
    })?;

    let events: Vec<IcsEvent> = calendar
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => parse_event(event, floating_zone),
            _ => None,
        })
        .collect();

    debug!(count = events.len(), "parsed events from ICS");
    Ok(events)
}

/// Parses a single VEVENT component.
fn parse_event(event: &Event, floating_zone: Tz) -> Option<IcsEvent> {
    let Some(start) = event.get_start() else {
        warn!(uid = ?event.get_uid(), "skipping VEVENT without DTSTART");
        return None;
    };

    Some(IcsEvent {
        uid: event.get_uid().map(str::to_string),
        summary: event.get_summary().map(str::to_string),
        description: event.get_description().map(str::to_string),
        location: event.get_location().map(str::to_string),
        start: convert_date_time(start, floating_zone),
        end: event
            .get_end()
            .map(|end| convert_date_time(end, floating_zone)),
        rrule: event.property_value("RRULE").map(str::to_string),
        rdates: repeated_dates(event, "RDATE", floating_zone),
        exdates: repeated_dates(event, "EXDATE", floating_zone),
        recurrence_id: event
            .properties()
            .get("RECURRENCE-ID")
            .and_then(|property| property_dates(property, floating_zone).into_iter().next()),
    })
}

/// Reads every line of a repeatable date property such as `EXDATE`.
///
/// icalendar keeps these apart from the single-valued properties, one
/// [`Property`] per line.
fn repeated_dates(event: &Event, name: &str, floating_zone: Tz) -> Vec<IcsTime> {
    event
        .multi_properties()
        .get(name)
        .into_iter()
        .flatten()
        .flat_map(|property| property_dates(property, floating_zone))
        .collect()
}

/// Reads a comma-separated date list, honoring the line's own `TZID`.
///
/// `PERIOD` values keep only their start.
fn property_dates(property: &Property, floating_zone: Tz) -> Vec<IcsTime> {
    let zone = property
        .params()
        .get("TZID")
        .map(|tzid| resolve_zone(tzid.value(), floating_zone))
        .unwrap_or(floating_zone);

    property
        .value()
        .split(',')
        .filter_map(|value| {
            let start = value.split_once('/').map_or(value, |(start, _)| start);
            let parsed = parse_icalendar_datetime(start, zone);
            if parsed.is_none() {
                warn!(property = property.key(), value, "unparsable date value");
            }
            parsed
        })
        .collect()
}

/// Converts icalendar DatePerhapsTime to IcsTime.
fn convert_date_time(dt: DatePerhapsTime, floating_zone: Tz) -> IcsTime {
    match dt {
        DatePerhapsTime::Date(date) => IcsTime::Date(date),
        DatePerhapsTime::DateTime(cdt) => IcsTime::DateTime(match cdt {
            CalendarDateTime::Utc(dt) => dt.with_timezone(&Tz::UTC),
            CalendarDateTime::Floating(naive) => localize(naive, floating_zone),
            CalendarDateTime::WithTimezone { date_time, tzid } => {
                localize(date_time, resolve_zone(&tzid, floating_zone))
            }
        }),
    }
}

/// Looks up an IANA zone name, falling back to `fallback` for names
/// chrono-tz does not know (e.g. Windows zone names).
fn resolve_zone(tzid: &str, fallback: Tz) -> Tz {
    tzid.trim_matches('"').parse::<Tz>().unwrap_or_else(|_| {
        warn!(tzid, fallback = %fallback, "unknown TZID, reading times as floating");
        fallback
    })
}

/// Maps a wall-clock time into `tz`, taking the earlier reading of an
/// ambiguous time and shifting through DST gaps.
fn localize(naive: NaiveDateTime, tz: Tz) -> DateTime<Tz> {
    tz.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// Parses an iCalendar date or date-time value.
///
/// Handles formats like:
/// - 20250205T100000Z (UTC)
/// - 20250205T100000 (wall-clock time in `zone`)
/// - 20250205 (date only)
pub fn parse_icalendar_datetime(s: &str, zone: Tz) -> Option<IcsTime> {
    let s = s.trim();

    if s.len() == 8 && s.chars().all(|c| c.is_ascii_digit()) {
        let date = NaiveDate::parse_from_str(s, "%Y%m%d").ok()?;
        return Some(IcsTime::Date(date));
    }

    if let Some(utc) = s.strip_suffix('Z') {
        let dt = NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S").ok()?;
        return Some(IcsTime::DateTime(Tz::UTC.from_utc_datetime(&dt)));
    }

    NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%S")
        .ok()
        .map(|dt| IcsTime::DateTime(localize(dt, zone)))
}
