//! Core types: events, time windows, HTML layouts, tracing

pub mod event;
pub mod format;
pub mod time;
pub mod tracing;

pub use event::{CalendarFetchResult, EventRecord};
pub use format::{
    html_escape, parameterize, ContentDocument, FormatOptions, Formatter, ItemTemplate,
    OutputFormat, UnknownOutputFormat,
};
pub use time::{parse_date, Clock, DateWindow, EventTime, FixedClock, SystemClock};
pub use self::tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
