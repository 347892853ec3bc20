//! Times, days and "today".
//!
//! - [`EventTime`]: when an event starts or ends, timed or all-day
//! - [`DateWindow`]: the inclusive range of days a widget shows
//! - [`Clock`]: where "today" comes from

use std::fmt::Write as _;

use chrono::{
    DateTime, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use chrono_tz::Tz;
use tracing::warn;

/// The start or end of an event.
///
/// Timed values keep the offset of the zone they are displayed in, so
/// formatting never converts again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTime {
    /// A specific datetime with its display offset.
    DateTime(DateTime<FixedOffset>),
    /// A whole day.
    AllDay(NaiveDate),
}

impl EventTime {
    /// Keeps the instant and the offset `dt` is expressed in.
    pub fn from_datetime<Z: TimeZone>(dt: DateTime<Z>) -> Self {
        Self::DateTime(dt.fixed_offset())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// Returns the calendar date of this event time, as displayed.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::DateTime(dt) => dt.date_naive(),
            Self::AllDay(date) => *date,
        }
    }

    /// Formats this time with a strftime-style pattern.
    ///
    /// All-day dates are formatted as midnight. A pattern chrono cannot
    /// render is returned verbatim.
    pub fn strftime(&self, pattern: &str) -> String {
        let mut out = String::new();
        let written = match self {
            Self::DateTime(dt) => write!(out, "{}", dt.format(pattern)),
            Self::AllDay(date) => write!(out, "{}", date.and_time(NaiveTime::MIN).format(pattern)),
        };

        if written.is_err() {
            warn!(pattern, "unsupported strftime pattern");
            return pattern.to_string();
        }
        out
    }
}

/// Source of "now", injectable so date windows are deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The range of days a calendar widget displays.
///
/// Both bounds are inclusive: `start` is the first instant of the first day
/// and `end` the last instant of the last day, in the display time zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    /// Start of the first day (inclusive).
    pub start: DateTime<Tz>,
    /// End of the last day (inclusive).
    pub end: DateTime<Tz>,
}

impl DateWindow {
    /// Resolves the window from optional configured dates.
    ///
    /// Without a start date the window starts today (according to `now`).
    /// Without an end date it ends `days_ahead` days after the start day.
    pub fn resolve(
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        days_ahead: u32,
        now: DateTime<Utc>,
        tz: Tz,
    ) -> Self {
        let first_day = start_date.unwrap_or_else(|| now.with_timezone(&tz).date_naive());
        let last_day = end_date.unwrap_or_else(|| {
            first_day
                .checked_add_days(Days::new(u64::from(days_ahead)))
                .unwrap_or(first_day)
        });

        Self {
            start: start_of_day(first_day, tz),
            end: end_of_day(last_day, tz),
        }
    }

    /// Returns the time zone of this window.
    pub fn time_zone(&self) -> Tz {
        self.start.timezone()
    }

    /// Checks if an instant falls within this window (both ends inclusive).
    pub fn contains<Z: TimeZone>(&self, dt: &DateTime<Z>) -> bool {
        let utc = dt.with_timezone(&Utc);
        self.start.with_timezone(&Utc) <= utc && utc <= self.end.with_timezone(&Utc)
    }

    /// Checks if an event time falls within this window.
    ///
    /// All-day dates are tested at the start of their day in the window's zone.
    pub fn contains_event_time(&self, et: &EventTime) -> bool {
        match et {
            EventTime::DateTime(dt) => self.contains(dt),
            EventTime::AllDay(date) => self.contains(&start_of_day(*date, self.time_zone())),
        }
    }
}

fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    localize(date.and_time(NaiveTime::MIN), tz, true)
}

fn end_of_day(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    let last = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN);
    localize(date.and_time(last), tz, false)
}

/// Maps a wall-clock time into `tz`, picking the earliest or latest reading
/// when a DST transition makes it ambiguous, and shifting through gaps.
fn localize(naive: NaiveDateTime, tz: Tz, earliest: bool) -> DateTime<Tz> {
    let mapped = tz.from_local_datetime(&naive);
    let resolved = if earliest {
        mapped.earliest()
    } else {
        mapped.latest()
    };
    resolved.unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

/// Parses a configured date string.
///
/// Accepts ISO dates (`2025-02-05`), slashed dates (`2025/02/05`,
/// `02/05/2025`) and RFC 3339 timestamps, of which only the date is kept.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    const FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %B %Y"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
