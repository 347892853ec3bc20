//! iCal feed source implementation.
//!
//! This module provides an [`IcalSource`] that reads events from an
//! iCalendar document published at a URL.
//!
//! # Features
//!
//! - `webcal://` URLs are fetched over HTTPS
//! - RRULE expansion (with EXDATE and RECURRENCE-ID overrides) via `rrule`
//! - TZID resolution via `chrono-tz`; floating times use the display zone
//! - Filtering to the date window happens locally, since feeds take no
//!   query parameters
//!
//! # Example
//!
//! ```ignore
//! use calwidget_providers::ical::{IcalConfig, IcalSource};
//!
//! let config = IcalConfig::new("webcal://example.com/campus.ics", "Campus Events")?;
//! let source = IcalSource::from_config(config)?;
//! let result = source.fetch(FetchOptions::new(window)).await;
//! ```

mod config;
mod expand;
mod fetch;
mod parse;
mod provider;

pub use config::IcalConfig;
pub use expand::expand_events;
pub use fetch::{DocumentFetcher, HttpDocumentFetcher};
pub use parse::{IcsEvent, IcsTime, parse_ics_content, parse_icalendar_datetime};
pub use provider::IcalSource;
