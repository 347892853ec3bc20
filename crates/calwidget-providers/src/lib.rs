//! SourceAdapter trait and implementations.
//!
//! This crate provides the abstraction layer for calendar sources:
//!
//! - [`SourceAdapter`] - The core trait that all calendar sources implement
//! - [`CalendarSource`] - The configured choice of source
//! - [`RawEvent`] - Source-agnostic raw event data
//! - [`normalize_event`] - Pipeline to convert raw events to [`EventRecord`]s
//! - [`ProviderError`] - Error types for source operations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐
//! │  Google API     │    │  iCal document  │
//! └────────┬────────┘    └────────┬────────┘
//!          │                      │ parse + expand
//!          ▼                      ▼
//! ┌─────────────────┐    ┌─────────────────┐
//! │  GoogleSource   │    │   IcalSource    │
//! └────────┬────────┘    └────────┬────────┘
//!          │    SourceAdapter     │
//!          └──────────┬───────────┘
//!                     ▼
//!              ┌─────────────┐
//!              │  RawEvent   │
//!              └──────┬──────┘
//!                     ▼ normalize_event()
//!           ┌─────────────────────┐
//!           │ CalendarFetchResult │
//!           └─────────────────────┘
//! ```
//!
//! [`EventRecord`]: calwidget_core::EventRecord

pub mod error;
#[cfg(feature = "google")]
pub mod google;
#[cfg(feature = "ical")]
pub mod ical;
pub mod normalize;
pub mod provider;
pub mod raw_event;

// Re-export main types at crate root
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use normalize::{normalize_event, normalize_events};
pub use provider::{
    BoxFuture, CalendarSource, ErrorSource, FetchOptions, SourceAdapter, UnknownCalendarSource,
};
pub use raw_event::{RawEvent, RawEventTime};
