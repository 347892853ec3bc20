//! HTML rendering of calendar content.
//!
//! This module turns a [`CalendarFetchResult`] into named HTML documents in
//! one of four layouts:
//! - **Headlines**: up to five events per document, grouped under day headers
//! - **Custom list**: up to five events per document, each through the item template
//! - **Detailed**: one document per event, through the item template
//! - **Detailed list**: a single document with every event, bucketed by date
//!
//! Every text value is HTML-escaped before it reaches the markup.
//!
//! # Example
//!
//! ```rust
//! use calwidget_core::format::{FormatOptions, Formatter, OutputFormat};
//! use calwidget_core::CalendarFetchResult;
//!
//! let options = FormatOptions::new(OutputFormat::DetailedList).with_content_name("Events");
//! let documents = Formatter::new(options).format(&CalendarFetchResult::new());
//! assert_eq!(documents.len(), 1);
//! ```

mod template;


use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::event::{CalendarFetchResult, EventRecord};

pub use template::{CUSTOM_LIST_TEMPLATE, DETAILED_TEMPLATE, ItemTemplate, Placeholder};

/// Number of events per document in the grouped layouts.
pub const GROUP_SIZE: usize = 5;

/// Default strftime pattern for day headers.
pub const DEFAULT_DAY_FORMAT: &str = "%A %b %e";

/// Default strftime pattern for event times.
pub const DEFAULT_TIME_FORMAT: &str = "%l:%M %P";

static SLUG_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\-_]+").expect("Invalid slug regex"));

static SLUG_DASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("Invalid slug dash regex"));

/// The HTML layout of the rendered content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Five events per document, titles under day headers.
    #[default]
    Headlines,
    /// Five events per document, each rendered through the item template.
    CustomList,
    /// One document per event, rendered through the item template.
    Detailed,
    /// Every event in one document, bucketed by date.
    DetailedList,
}

impl OutputFormat {
    /// All recognized formats, in display order.
    pub const ALL: [OutputFormat; 4] = [
        Self::Headlines,
        Self::CustomList,
        Self::Detailed,
        Self::DetailedList,
    ];

    /// Returns the configuration value for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Headlines => "headlines",
            Self::CustomList => "custom_list",
            Self::Detailed => "detailed",
            Self::DetailedList => "detailed_list",
        }
    }

    /// Returns the human-readable label shown to editors.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Headlines => "List (Multiple)",
            Self::CustomList => "List (Custom)",
            Self::Detailed => "Detailed (Single)",
            Self::DetailedList => "Detailed List",
        }
    }
}

/// Error returned when a configuration value names no known layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected output format {0:?}")]
pub struct UnknownOutputFormat(pub String);

impl FromStr for OutputFormat {
    type Err = UnknownOutputFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| UnknownOutputFormat(s.to_string()))
    }
}

/// Options controlling how content is rendered.
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Which layout to produce.
    pub output_format: OutputFormat,
    /// strftime pattern for day headers and the `#{date}` placeholder.
    pub day_format: String,
    /// strftime pattern for event times.
    pub time_format: String,
    /// Custom item template; blank means the layout's default.
    pub item_template: Option<String>,
    /// The content item's own display name, used for CSS hooks.
    pub content_name: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::default(),
            day_format: DEFAULT_DAY_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            item_template: None,
            content_name: String::new(),
        }
    }
}

impl FormatOptions {
    /// Creates options for a layout with default patterns.
    pub fn new(output_format: OutputFormat) -> Self {
        Self {
            output_format,
            ..Self::default()
        }
    }

    /// Sets the day header pattern.
    pub fn with_day_format(mut self, day_format: impl Into<String>) -> Self {
        self.day_format = day_format.into();
        self
    }

    /// Sets the event time pattern.
    pub fn with_time_format(mut self, time_format: impl Into<String>) -> Self {
        self.time_format = time_format.into();
        self
    }

    /// Sets a custom item template.
    pub fn with_item_template(mut self, template: impl Into<String>) -> Self {
        self.item_template = Some(template.into());
        self
    }

    /// Sets the content item's display name.
    pub fn with_content_name(mut self, name: impl Into<String>) -> Self {
        self.content_name = name.into();
        self
    }
}

/// A named unit of HTML handed to the content system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDocument {
    /// Document name (plain text).
    pub name: String,
    /// HTML body.
    pub data: String,
}

impl ContentDocument {
    /// Creates a document.
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Renders fetch results into HTML documents.
#[derive(Debug, Clone)]
pub struct Formatter {
    options: FormatOptions,
}

impl Formatter {
    /// Creates a new Formatter with the given options.
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Renders the events of a successful fetch.
    ///
    /// Callers must not pass a failed result; its error has to be surfaced
    /// instead. A failed result renders as if it had no events.
    pub fn format(&self, result: &CalendarFetchResult) -> Vec<ContentDocument> {
        let documents = match self.options.output_format {
            OutputFormat::Headlines => self.format_headlines(result),
            OutputFormat::CustomList => self.format_custom_list(result),
            OutputFormat::Detailed => self.format_detailed(result),
            OutputFormat::DetailedList => vec![self.format_detailed_list(result)],
        };

        debug!(
            format = self.options.output_format.as_str(),
            events = result.items.len(),
            documents = documents.len(),
            "rendered calendar content"
        );
        documents
    }

    fn format_headlines(&self, result: &CalendarFetchResult) -> Vec<ContentDocument> {
        result
            .items
            .chunks(GROUP_SIZE)
            .enumerate()
            .map(|(index, items)| {
                let data = format!(
                    "<h1>{}</h1>{}",
                    html_escape(&result.name),
                    self.day_runs_html(items)
                );
                ContentDocument::new(numbered_name(&result.name, index), data)
            })
            .collect()
    }

    fn format_custom_list(&self, result: &CalendarFetchResult) -> Vec<ContentDocument> {
        let template = self.item_template(CUSTOM_LIST_TEMPLATE);
        result
            .items
            .chunks(GROUP_SIZE)
            .enumerate()
            .map(|(index, items)| {
                let rendered: String = items.iter().map(|item| self.render_item(&template, item)).collect();
                let data = format!(
                    "<div class='cal cal-custom-list'><h1 class='content-name'>{}</h1>{}</div>",
                    html_escape(&result.name),
                    rendered
                );
                ContentDocument::new(numbered_name(&result.name, index), data)
            })
            .collect()
    }

    fn format_detailed(&self, result: &CalendarFetchResult) -> Vec<ContentDocument> {
        let template = self.item_template(DETAILED_TEMPLATE);
        result
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                ContentDocument::new(
                    numbered_name(&result.name, index),
                    self.render_item(&template, item),
                )
            })
            .collect()
    }

    fn format_detailed_list(&self, result: &CalendarFetchResult) -> ContentDocument {
        let mut html = String::new();
        html.push_str(&format!(
            "<ul class='cal cal-{} cal-{}'>",
            parameterize(self.options.output_format.as_str()),
            parameterize(&self.options.content_name)
        ));

        for (day, items) in group_by_date(&result.items) {
            html.push_str("<li class='event-date'>");
            html.push_str(&format!("<h2>{}</h2>", html_escape(&format_day(day, &self.options.day_format))));
            html.push_str("<ul class='events'>");
            for item in items {
                html.push_str("<li>");
                html.push_str(&format!(
                    "<div class='event-time'>{}</div>",
                    html_escape(&item.time_range(&self.options.time_format))
                ));
                html.push_str(&format!(
                    "<div class='event-title'>{}</div> <div class='event-description'>{}</div> <div class='event-location'>{}</div>",
                    html_escape(item.name()),
                    html_escape(&item.description()),
                    html_escape(item.location())
                ));
                html.push_str("</li>");
            }
            html.push_str("</ul>");
            html.push_str("</li>");
        }
        html.push_str("</ul>");

        ContentDocument::new(result.name.clone(), html)
    }

    /// Renders events as a definition list, opening a new day header each
    /// time an event's date differs from the previous event's date.
    fn day_runs_html(&self, items: &[EventRecord]) -> String {
        let mut html = String::new();
        let mut last_date: Option<NaiveDate> = None;

        for item in items {
            let date = item.start_time().date();
            if last_date != Some(date) {
                if last_date.is_some() {
                    html.push_str("</dl>");
                }
                html.push_str(&format!(
                    "<h2>{}</h2>",
                    html_escape(&item.start_time().strftime(&self.options.day_format))
                ));
                html.push_str("<dl>");
            }

            html.push_str(&format!(
                "<dt>{}</dt>",
                html_escape(&item.time_range(&self.options.time_format))
            ));
            if item.is_all_day() {
                html.push_str("<dt>Time N/A</dt>");
            }
            html.push_str(&format!("<dd>{}</dd>", html_escape(item.name())));
            last_date = Some(date);
        }

        if last_date.is_some() {
            html.push_str("</dl>");
        }
        html
    }

    fn item_template<'a>(&'a self, default: &'a str) -> ItemTemplate<'a> {
        ItemTemplate::or_default(self.options.item_template.as_deref(), default)
    }

    fn render_item(&self, template: &ItemTemplate<'_>, item: &EventRecord) -> String {
        template.render(item, &self.options.day_format, &self.options.time_format)
    }
}

/// Names the `index`th (0-based) document of a calendar, 1-based for display.
fn numbered_name(calendar_name: &str, index: usize) -> String {
    format!("{} ({})", calendar_name, index + 1)
}

fn format_day(day: NaiveDate, pattern: &str) -> String {
    crate::time::EventTime::from_date(day).strftime(pattern)
}

/// Buckets events by start date, keeping dates in order of first appearance.
fn group_by_date(items: &[EventRecord]) -> Vec<(NaiveDate, Vec<&EventRecord>)> {
    let mut days: Vec<(NaiveDate, Vec<&EventRecord>)> = Vec::new();
    for item in items {
        let date = item.start_time().date();
        match days.iter_mut().find(|(day, _)| *day == date) {
            Some((_, bucket)) => bucket.push(item),
            None => days.push((date, vec![item])),
        }
    }
    days
}

/// Escapes text for HTML display.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Turns a display name into a CSS-safe class fragment.
///
/// Lowercases, collapses every run of characters other than ASCII letters,
/// digits, `-` and `_` into a single `-`, and trims dashes at both ends.
pub fn parameterize(s: &str) -> String {
    let lowered = s.trim().to_lowercase();
    let replaced = SLUG_SEPARATOR.replace_all(&lowered, "-");
    let collapsed = SLUG_DASHES.replace_all(&replaced, "-");
    collapsed.trim_matches('-').to_string()
}
