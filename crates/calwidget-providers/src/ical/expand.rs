//! Recurrence expansion for parsed iCal events.
//!
//! Every [`IcsEvent`] becomes zero or more [`RawEvent`] occurrences whose
//! start falls inside the [`DateWindow`] (both ends inclusive). Recurring
//! events are expanded with the `rrule` crate in the zone they were written
//! in, so wall-clock times survive DST changes.

use std::collections::HashSet;

use calwidget_core::{DateWindow, EventTime};
use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use rrule::{RRule, Tz, Unvalidated};
use tracing::{debug, trace};

use crate::error::{ProviderError, ProviderResult};
use crate::raw_event::{RawEvent, RawEventTime};

use super::parse::{IcsEvent, IcsTime, parse_icalendar_datetime};

/// Days of slack added around the window when asking `rrule` for
/// occurrences. The exact inclusive filter is applied afterwards.
const EXPANSION_MARGIN_DAYS: i64 = 1;

/// Expands all events of a document into occurrences within `window`.
///
/// Overrides (events with a `RECURRENCE-ID`) replace the occurrence of the
/// recurring event with the same `UID` that they name.
///
/// # Errors
///
/// Returns a calendar error if a recurrence rule cannot be parsed.
pub fn expand_events(events: &[IcsEvent], window: &DateWindow) -> ProviderResult<Vec<RawEvent>> {
    let overridden: HashSet<(&str, DateTime<Utc>)> = events
        .iter()
        .filter_map(|event| Some((event.uid.as_deref()?, event.recurrence_id?.to_utc())))
        .collect();

    let mut occurrences = Vec::new();
    for event in events {
        let skip: HashSet<DateTime<Utc>> = event
            .exdates
            .iter()
            .map(IcsTime::to_utc)
            .chain(
                overridden
                    .iter()
                    .filter(|(uid, _)| event.recurrence_id.is_none() && event.uid.as_deref() == Some(*uid))
                    .map(|(_, at)| *at),
            )
            .collect();
        occurrences.extend(expand_event(event, window, &skip)?);
    }

    debug!(
        events = events.len(),
        occurrences = occurrences.len(),
        "expanded iCal events"
    );
    Ok(occurrences)
}

/// Expands one event, dropping occurrences whose start is in `skip`.
///
/// `RDATE`s are added to the rule's occurrences; a start listed twice is
/// kept once.
fn expand_event(
    event: &IcsEvent,
    window: &DateWindow,
    skip: &HashSet<DateTime<Utc>>,
) -> ProviderResult<Vec<RawEvent>> {
    let mut starts = match event.rrule.as_deref() {
        Some(rule) if event.recurrence_id.is_none() => recurrence_starts(rule, event.start, window)?,
        _ => vec![event.start],
    };
    if event.recurrence_id.is_none() {
        starts.extend(event.rdates.iter().copied());
    }

    let mut seen = HashSet::new();
    Ok(starts
        .into_iter()
        .filter(|start| seen.insert(start.to_utc()))
        .filter(|start| !skip.contains(&start.to_utc()))
        .filter(|start| window.contains_event_time(&to_event_time(*start)))
        .map(|start| occurrence(event, start))
        .collect())
}

/// Lists the starts of a recurring event near `window`.
fn recurrence_starts(rule: &str, dtstart: IcsTime, window: &DateWindow) -> ProviderResult<Vec<IcsTime>> {
    let invalid = |e: &dyn std::fmt::Display| {
        ProviderError::calendar(format!("invalid recurrence rule {:?}: {}", rule, e))
    };

    let (body, until) = split_until(rule);
    let mut rrule = body
        .parse::<RRule<Unvalidated>>()
        .map_err(|e| invalid(&e))?;
    if let Some(value) = until {
        let until = until_instant(value, dtstart)
            .ok_or_else(|| invalid(&format!("unreadable UNTIL {:?}", value)))?;
        rrule = rrule.until(until.with_timezone(&Tz::UTC));
    }

    let dt_start = match dtstart {
        IcsTime::Date(date) => Tz::UTC.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
        IcsTime::DateTime(dt) => dt.with_timezone(&Tz::Tz(dt.timezone())),
    };

    let margin = TimeDelta::days(EXPANSION_MARGIN_DAYS);
    let after = (window.start.with_timezone(&Utc) - margin).with_timezone(&Tz::UTC);
    let before = (window.end.with_timezone(&Utc) + margin).with_timezone(&Tz::UTC);

    let dates = rrule
        .build(dt_start)
        .map_err(|e| invalid(&e))?
        .after(after)
        .before(before)
        .all(u16::MAX)
        .dates;

    trace!(rule, count = dates.len(), "expanded recurrence rule");
    Ok(dates
        .into_iter()
        .map(|date| match dtstart {
            IcsTime::Date(_) => IcsTime::Date(date.date_naive()),
            IcsTime::DateTime(original) => {
                IcsTime::DateTime(date.with_timezone(&original.timezone()))
            }
        })
        .collect())
}

/// Takes the `UNTIL` part out of a rule.
///
/// `rrule` reads a date or floating `UNTIL` in the host's local zone and
/// then rejects it against a zoned start, so the bound is read separately.
fn split_until(rule: &str) -> (String, Option<&str>) {
    let mut until = None;
    let body: Vec<&str> = rule
        .split(';')
        .filter(|part| match part.split_once('=') {
            Some((key, value)) if key.trim().eq_ignore_ascii_case("UNTIL") => {
                until = Some(value.trim());
                false
            }
            _ => true,
        })
        .collect();
    (body.join(";"), until)
}

/// Resolves an `UNTIL` value against the event start.
///
/// Floating values are wall-clock times in the start's zone. A date bound
/// on a timed event covers that whole day.
fn until_instant(value: &str, dtstart: IcsTime) -> Option<DateTime<Utc>> {
    let zone = match dtstart {
        IcsTime::Date(_) => chrono_tz::UTC,
        IcsTime::DateTime(dt) => dt.timezone(),
    };
    match (parse_icalendar_datetime(value, zone)?, dtstart) {
        (IcsTime::Date(date), IcsTime::DateTime(_)) => zone
            .from_local_datetime(&date.and_hms_opt(23, 59, 59)?)
            .latest()
            .map(|end| end.with_timezone(&Utc)),
        (until, _) => Some(until.to_utc()),
    }
}

/// Builds the occurrence starting at `start`, keeping the event's duration.
fn occurrence(event: &IcsEvent, start: IcsTime) -> RawEvent {
    let mut raw = RawEvent::new(to_raw_time(start));
    raw.summary = event.summary.clone();
    raw.description = event.description.iter().cloned().collect();
    raw.location = event.location.clone();
    raw.end = event
        .end
        .map(|end| shift(end, event.start, start))
        .map(to_raw_time);
    raw
}

/// Moves `end` by the distance between `original_start` and `start`.
fn shift(end: IcsTime, original_start: IcsTime, start: IcsTime) -> IcsTime {
    let offset = start.to_utc() - original_start.to_utc();
    match end {
        IcsTime::Date(date) => IcsTime::Date(date + TimeDelta::days(offset.num_days())),
        IcsTime::DateTime(dt) => IcsTime::DateTime(dt + offset),
    }
}

fn to_event_time(time: IcsTime) -> EventTime {
    match time {
        IcsTime::Date(date) => EventTime::from_date(date),
        IcsTime::DateTime(dt) => EventTime::from_datetime(dt),
    }
}

fn to_raw_time(time: IcsTime) -> RawEventTime {
    match time {
        IcsTime::Date(date) => RawEventTime::from_date(date),
        IcsTime::DateTime(dt) => RawEventTime::from_datetime(dt.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ical::parse_ics_content;
    use chrono::NaiveDate;
    use chrono_tz::America::New_York;

    fn window(first: (i32, u32, u32), last: (i32, u32, u32)) -> DateWindow {
        DateWindow::resolve(
            NaiveDate::from_ymd_opt(first.0, first.1, first.2),
            NaiveDate::from_ymd_opt(last.0, last.1, last.2),
            0,
            Utc::now(),
            New_York,
        )
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> IcsTime {
        IcsTime::DateTime(New_York.with_ymd_and_hms(y, m, d, h, min, 0).unwrap())
    }

    fn event(start: IcsTime, end: Option<IcsTime>) -> IcsEvent {
        IcsEvent {
            uid: Some("e@example.com".to_string()),
            summary: Some("Standup".to_string()),
            description: Some("Daily sync".to_string()),
            location: None,
            start,
            end,
            rrule: None,
            rdates: Vec::new(),
            exdates: Vec::new(),
            recurrence_id: None,
        }
    }

    fn starts(raw: &[RawEvent]) -> Vec<RawEventTime> {
        raw.iter().map(|r| r.start.clone()).collect()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> RawEventTime {
        RawEventTime::from_datetime(Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap())
    }

    #[test]
    fn single_event_inside_window() {
        let events = [event(at(2025, 2, 5, 9, 0), Some(at(2025, 2, 5, 10, 0)))];
        let raw = expand_events(&events, &window((2025, 2, 5), (2025, 2, 5))).unwrap();

        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].title(), "Standup");
        assert_eq!(raw[0].description, ["Daily sync"]);
        assert_eq!(raw[0].end, Some(utc(2025, 2, 5, 15, 0)));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let events = [
            event(at(2025, 2, 5, 0, 0), None),
            event(
                IcsTime::DateTime(
                    New_York
                        .from_local_datetime(
                            &NaiveDate::from_ymd_opt(2025, 2, 6)
                                .unwrap()
                                .and_hms_nano_opt(23, 59, 59, 999_999_999)
                                .unwrap(),
                        )
                        .single()
                        .unwrap(),
                ),
                None,
            ),
            event(at(2025, 2, 7, 0, 0), None),
            event(at(2025, 2, 4, 23, 59), None),
        ];
        let raw = expand_events(&events, &window((2025, 2, 5), (2025, 2, 6))).unwrap();
        assert_eq!(raw.len(), 2);
        assert!(raw.iter().all(|r| r.end.is_none()));
    }

    #[test]
    fn weekly_rule_keeps_wall_clock_across_dst() {
        let mut weekly = event(at(2025, 3, 3, 9, 0), Some(at(2025, 3, 3, 9, 30)));
        weekly.rrule = Some("FREQ=WEEKLY;COUNT=3".to_string());

        let raw = expand_events(&[weekly], &window((2025, 3, 1), (2025, 3, 31))).unwrap();

        // DST starts on 2025-03-09 in New York.
        assert_eq!(
            starts(&raw),
            [
                utc(2025, 3, 3, 14, 0),
                utc(2025, 3, 10, 13, 0),
                utc(2025, 3, 17, 13, 0),
            ]
        );
        assert_eq!(raw[1].end, Some(utc(2025, 3, 10, 13, 30)));
    }

    #[test]
    fn occurrences_outside_window_are_dropped() {
        let mut daily = event(at(2025, 2, 1, 9, 0), None);
        daily.rrule = Some("FREQ=DAILY".to_string());

        let raw = expand_events(&[daily], &window((2025, 2, 5), (2025, 2, 6))).unwrap();
        assert_eq!(starts(&raw), [utc(2025, 2, 5, 14, 0), utc(2025, 2, 6, 14, 0)]);
    }

    #[test]
    fn exdates_and_overrides_replace_occurrences() {
        let mut daily = event(at(2025, 2, 5, 9, 0), Some(at(2025, 2, 5, 9, 15)));
        daily.rrule = Some("FREQ=DAILY;COUNT=4".to_string());
        daily.exdates = vec![at(2025, 2, 6, 9, 0)];

        let mut moved = event(at(2025, 2, 7, 11, 0), Some(at(2025, 2, 7, 11, 15)));
        moved.summary = Some("Standup (moved)".to_string());
        moved.recurrence_id = Some(at(2025, 2, 7, 9, 0));

        let raw = expand_events(&[daily, moved], &window((2025, 2, 5), (2025, 2, 10))).unwrap();
        let mut seen: Vec<_> = raw.iter().map(|r| (r.start.clone(), r.title().to_string())).collect();
        seen.sort_by_key(|(start, _)| match start {
            RawEventTime::DateTime(dt) => *dt,
            RawEventTime::Date(_) => unreachable!(),
        });

        assert_eq!(
            seen,
            [
                (utc(2025, 2, 5, 14, 0), "Standup".to_string()),
                (utc(2025, 2, 7, 16, 0), "Standup (moved)".to_string()),
                (utc(2025, 2, 8, 14, 0), "Standup".to_string()),
            ]
        );
    }

    #[test]
    fn all_day_recurrence_stays_date_only() {
        let first = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
        let mut weekly = event(
            IcsTime::Date(first),
            Some(IcsTime::Date(NaiveDate::from_ymd_opt(2025, 2, 4).unwrap())),
        );
        weekly.rrule = Some("FREQ=WEEKLY;BYDAY=MO".to_string());

        let raw = expand_events(&[weekly], &window((2025, 2, 5), (2025, 2, 17))).unwrap();
        assert_eq!(
            starts(&raw),
            [
                RawEventTime::from_date(NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()),
                RawEventTime::from_date(NaiveDate::from_ymd_opt(2025, 2, 17).unwrap()),
            ]
        );
        assert_eq!(
            raw[0].end,
            Some(RawEventTime::from_date(NaiveDate::from_ymd_opt(2025, 2, 11).unwrap()))
        );
    }

    fn expand_document(body: &str, window: &DateWindow) -> Vec<RawEventTime> {
        let ics = format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nUID:doc@example.com\r\n\
             SUMMARY:Clinic\r\n{}END:VEVENT\r\nEND:VCALENDAR",
            body
        );
        let events = parse_ics_content(&ics, New_York).unwrap();
        let mut starts = starts(&expand_events(&events, window).unwrap());
        starts.sort_by_key(|start| match start {
            RawEventTime::DateTime(dt) => dt.date_naive(),
            RawEventTime::Date(date) => *date,
        });
        starts
    }

    fn day(d: u32) -> RawEventTime {
        RawEventTime::from_date(NaiveDate::from_ymd_opt(2025, 2, d).unwrap())
    }

    #[test]
    fn document_exdate_removes_occurrence() {
        let starts = expand_document(
            "DTSTART:20250205T140000Z\r\n\
             RRULE:FREQ=DAILY;COUNT=3\r\n\
             EXDATE:20250206T140000Z\r\n",
            &window((2025, 2, 5), (2025, 2, 10)),
        );
        assert_eq!(starts, [utc(2025, 2, 5, 14, 0), utc(2025, 2, 7, 14, 0)]);
    }

    #[test]
    fn document_rdate_adds_occurrences() {
        let starts = expand_document(
            "DTSTART;TZID=America/New_York:20250205T090000\r\n\
             DTEND;TZID=America/New_York:20250205T093000\r\n\
             RRULE:FREQ=WEEKLY;COUNT=2\r\n\
             RDATE;TZID=America/New_York:20250207T150000\r\n\
             RDATE;TZID=America/New_York:20250212T090000\r\n\
             EXDATE:20250212T140000Z\r\n",
            &window((2025, 2, 5), (2025, 2, 20)),
        );
        // The second RDATE repeats a rule occurrence that EXDATE removes.
        assert_eq!(starts, [utc(2025, 2, 5, 14, 0), utc(2025, 2, 7, 20, 0)]);
    }

    #[test]
    fn rdate_without_rule_adds_to_start() {
        let starts = expand_document(
            "DTSTART;VALUE=DATE:20250205\r\n\
             RDATE;VALUE=DATE:20250207,20250211\r\n",
            &window((2025, 2, 5), (2025, 2, 10)),
        );
        assert_eq!(starts, [day(5), day(7)]);
    }

    #[test]
    fn date_until_on_all_day_event() {
        let starts = expand_document(
            "DTSTART;VALUE=DATE:20250203\r\n\
             DTEND;VALUE=DATE:20250204\r\n\
             RRULE:FREQ=WEEKLY;UNTIL=20250224\r\n",
            &window((2025, 2, 1), (2025, 3, 31)),
        );
        assert_eq!(starts, [day(3), day(10), day(17), day(24)]);
    }

    #[test]
    fn floating_until_on_floating_start() {
        let starts = expand_document(
            "DTSTART:20250203T090000\r\n\
             RRULE:FREQ=WEEKLY;UNTIL=20250224T090000\r\n",
            &window((2025, 2, 1), (2025, 3, 31)),
        );
        assert_eq!(
            starts,
            [
                utc(2025, 2, 3, 14, 0),
                utc(2025, 2, 10, 14, 0),
                utc(2025, 2, 17, 14, 0),
                utc(2025, 2, 24, 14, 0),
            ]
        );
    }

    #[test]
    fn until_bounds_on_zoned_start() {
        let window = window((2025, 2, 1), (2025, 2, 28));

        let date_until = expand_document(
            "DTSTART;TZID=America/New_York:20250203T090000\r\n\
             RRULE:FREQ=DAILY;UNTIL=20250205\r\n",
            &window,
        );
        assert_eq!(
            date_until,
            [utc(2025, 2, 3, 14, 0), utc(2025, 2, 4, 14, 0), utc(2025, 2, 5, 14, 0)]
        );

        let utc_until = expand_document(
            "DTSTART;TZID=America/New_York:20250203T090000\r\n\
             RRULE:FREQ=WEEKLY;UNTIL=20250217T140000Z\r\n",
            &window,
        );
        assert_eq!(
            utc_until,
            [utc(2025, 2, 3, 14, 0), utc(2025, 2, 10, 14, 0), utc(2025, 2, 17, 14, 0)]
        );
    }

    #[test]
    fn split_until_keeps_other_parts() {
        assert_eq!(
            split_until("FREQ=WEEKLY;UNTIL=20250224;BYDAY=MO"),
            ("FREQ=WEEKLY;BYDAY=MO".to_string(), Some("20250224"))
        );
        assert_eq!(split_until("FREQ=DAILY;COUNT=3"), ("FREQ=DAILY;COUNT=3".to_string(), None));
    }

    #[test]
    fn invalid_rule_is_a_calendar_error() {
        let mut broken = event(at(2025, 2, 5, 9, 0), None);
        broken.rrule = Some("FREQ=SOMETIMES".to_string());

        let err = expand_events(&[broken], &window((2025, 2, 5), (2025, 2, 6))).unwrap_err();
        assert_eq!(err.code(), crate::error::ProviderErrorCode::CalendarError);
    }
}
