//! Configuration validation.
//!
//! [`ConfigValidator`] checks a widget's settings the way an editor form
//! would: every problem is collected, and when the calendar can be located
//! at all a live fetch proves it actually loads.

use std::fmt;

use calwidget_core::OutputFormat;
use calwidget_providers::CalendarSource;
use tracing::debug;

use crate::widget::CalendarWidget;

const BLANK: &str = "can't be blank";
const INVALID_DATE: &str = "is not a valid date";

/// A problem with one configuration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// The configuration key.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", humanize(self.field), self.message)
    }
}

/// Everything wrong with a configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems tied to a key.
    pub field_errors: Vec<FieldError>,
    /// Problems with the configuration as a whole.
    pub base_errors: Vec<String>,
}

impl ValidationReport {
    /// Returns true when nothing was reported.
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty() && self.base_errors.is_empty()
    }

    /// Number of problems reported.
    pub fn len(&self) -> usize {
        self.field_errors.len() + self.base_errors.len()
    }

    /// Returns true when nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.is_valid()
    }

    /// Messages reported for `field`.
    pub fn errors_on(&self, field: &str) -> Vec<&str> {
        self.field_errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// Every problem as a sentence, field errors first.
    pub fn full_messages(&self) -> Vec<String> {
        self.field_errors
            .iter()
            .map(ToString::to_string)
            .chain(self.base_errors.iter().cloned())
            .collect()
    }

    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.field_errors.push(FieldError {
            field,
            message: message.into(),
        });
    }
}

/// Validates the configuration of a [`CalendarWidget`].
pub struct ConfigValidator<'a> {
    widget: &'a CalendarWidget,
}

impl<'a> ConfigValidator<'a> {
    /// Creates a validator for `widget`.
    pub fn new(widget: &'a CalendarWidget) -> Self {
        Self { widget }
    }

    /// Runs every check.
    ///
    /// The live fetch is skipped when the calendar id or URL is missing.
    pub async fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        let prerequisites_met = self.check_fields(&mut report);

        if prerequisites_met {
            let result = self.widget.fetch_calendar().await;
            if let Some(message) = result.error_message() {
                report
                    .base_errors
                    .push(format!("Could not fetch calendar - {}", message));
            }
        } else {
            debug!(widget = self.widget.name(), "calendar not located, skipping live fetch");
        }

        debug!(
            widget = self.widget.name(),
            problems = report.len(),
            "validated calendar configuration"
        );
        report
    }

    /// Checks the keys one by one. Returns whether the calendar can be located.
    fn check_fields(&self, report: &mut ValidationReport) -> bool {
        let config = self.widget.config();
        let source = config.calendar_source.parse::<CalendarSource>().ok();
        let mut prerequisites_met = true;

        if source == Some(CalendarSource::Google) {
            if config.calendar_id.trim().is_empty() {
                report.add("calendar_id", BLANK);
                prerequisites_met = false;
            }
        } else if config.calendar_url.trim().is_empty() {
            report.add("calendar_url", BLANK);
            prerequisites_met = false;
        }

        match config.max_results {
            None => report.add("max_results", BLANK),
            Some(max) if max < 1 => report.add("max_results", "must be at least 1"),
            Some(_) => {}
        }

        let start = config.start_date();
        let end = config.end_date();
        if start.is_err() {
            report.add("start_date", INVALID_DATE);
        }
        if end.is_err() {
            report.add("end_date", INVALID_DATE);
        }
        if let (Ok(Some(start)), Ok(Some(end))) = (start, end) {
            if start > end {
                report.add("start_date", "must precede end date");
            }
        }

        if source.is_none() {
            report.add("calendar_source", must_be(CalendarSource::ALL.iter().map(|s| s.label())));
        }
        if config.output_format.parse::<OutputFormat>().is_err() {
            report.add("output_format", must_be(OutputFormat::ALL.iter().map(|f| f.label())));
        }
        if config.time_zone().is_err() {
            report.add("time_zone", "is not a known time zone");
        }

        prerequisites_met
    }
}

fn must_be<'s>(labels: impl Iterator<Item = &'s str>) -> String {
    format!("must be {}", labels.collect::<Vec<_>>().join(" or "))
}

/// `calendar_url` becomes `Calendar url`.
fn humanize(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
