//! Google Calendar source implementation.
//!
//! This module provides a [`GoogleSource`] that lists events from a public
//! or key-accessible calendar through the Google Calendar API v3.
//!
//! # Behavior
//!
//! - Authenticates with an API key only; a blank key yields an empty result
//!   without any request
//! - Recurring events are expanded server-side (`singleEvents=true`)
//! - Only the lower bound of the date window is sent; the API's own
//!   `maxResults` limits the upper end
//!
//! # Example
//!
//! ```ignore
//! use calwidget_providers::google::{GoogleConfig, GoogleSource};
//!
//! let config = GoogleConfig::new("api-key", "team@group.calendar.google.com");
//! let source = GoogleSource::from_config(config)?;
//! let result = source.fetch(FetchOptions::new(window)).await;
//! ```

mod client;
mod config;
mod provider;

pub use client::{
    ApiEvent, ApiEventTime, EventList, EventListRequest, GoogleCalendarClient, GoogleEventsApi,
};
pub use config::GoogleConfig;
pub use provider::GoogleSource;
