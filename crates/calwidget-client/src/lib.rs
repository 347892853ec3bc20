//! Calendar widget pipeline, configuration validation and CLI
//!
//! This crate provides the `calwidget` command-line interface and the
//! [`CalendarWidget`] that fetches, normalizes and renders a calendar.

pub mod cli;
pub mod config;
pub mod error;
pub mod validate;
pub mod widget;

#[cfg(test)]
mod testing;

pub use cli::Cli;
pub use config::CalendarConfig;
pub use error::{ClientError, ClientResult, ConfigError, WidgetError};
pub use validate::{ConfigValidator, FieldError, ValidationReport};
pub use widget::CalendarWidget;
