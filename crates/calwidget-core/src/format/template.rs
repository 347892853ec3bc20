//! Item templates: small HTML fragments with `#{name}` placeholders.
//!
//! Only a fixed vocabulary of placeholders is recognized, and each is
//! replaced by a literal, HTML-escaped value. Anything else that looks like
//! a placeholder is copied through untouched. Substitution is a single pass
//! over the template, so a value that itself contains `#{...}` is never
//! expanded again.

use super::html_escape;
use crate::event::EventRecord;

/// Default item template for the custom list layout.
pub const CUSTOM_LIST_TEMPLATE: &str = concat!(
    "<div class=\"event\">",
    "<div class=\"event-title\">#{title}</div>",
    "<div class=\"event-date\">#{date}</div>",
    "<div class=\"event-time\">#{time}</div>",
    "<div class=\"event-location\">#{location}</div>",
    "<div class=\"event-description\">#{description}</div>",
    "</div>"
);

/// Default item template for the detailed layout.
pub const DETAILED_TEMPLATE: &str = concat!(
    "<h1>#{title}</h1>",
    "<h2>#{date}</h2>",
    "<div class=\"cal-time\">#{time}</div>",
    "<div class=\"cal-location\">#{location}</div>",
    "<p>#{description}</p>"
);

/// A recognized template placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `#{title}`: the event title.
    Title,
    /// `#{date}`: the start date, formatted with the day pattern.
    Date,
    /// `#{time}`: the time range, formatted with the time pattern.
    Time,
    /// `#{location}`: the event location.
    Location,
    /// `#{description}`: the description, parts joined by a space.
    Description,
}

impl Placeholder {
    /// Looks up a placeholder by the name between `#{` and `}`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Self::Title),
            "date" => Some(Self::Date),
            "time" => Some(Self::Time),
            "location" => Some(Self::Location),
            "description" => Some(Self::Description),
            _ => None,
        }
    }

    fn value(self, item: &EventRecord, day_format: &str, time_format: &str) -> String {
        match self {
            Self::Title => item.name().to_string(),
            Self::Date => item.start_time().strftime(day_format),
            Self::Time => item.time_range(time_format),
            Self::Location => item.location().to_string(),
            Self::Description => item.description(),
        }
    }
}

/// An item template ready to render events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemTemplate<'a> {
    source: &'a str,
}

impl<'a> ItemTemplate<'a> {
    /// Wraps template source text.
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Uses `custom` unless it is missing or blank, else `default`.
    pub fn or_default(custom: Option<&'a str>, default: &'a str) -> Self {
        match custom {
            Some(source) if !source.trim().is_empty() => Self::new(source),
            _ => Self::new(default),
        }
    }

    /// Returns the template source.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Renders one event.
    pub fn render(&self, item: &EventRecord, day_format: &str, time_format: &str) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut rest = self.source;

        while let Some(open) = rest.find("#{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            let placeholder = after
                .find('}')
                .and_then(|close| Placeholder::from_name(&after[..close]).map(|p| (p, close)));

            match placeholder {
                Some((placeholder, close)) => {
                    out.push_str(&html_escape(&placeholder.value(item, day_format, time_format)));
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str("#{");
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::EventTime;
    use chrono::{TimeZone, Utc};

    fn sample() -> EventRecord {
        let start = Utc.with_ymd_and_hms(2025, 2, 5, 9, 0, 0).unwrap();
        EventRecord::new("Book & Bagels", EventTime::from_datetime(start))
            .with_end_time(Some(EventTime::from_datetime(start + chrono::Duration::minutes(90))))
            .with_location("Library")
            .with_description_parts(["Bring a book.", "<Snacks provided>"])
    }

    #[test]
    fn replaces_every_placeholder() {
        let template = ItemTemplate::new("#{title}|#{date}|#{time}|#{location}|#{description}");
        assert_eq!(
            template.render(&sample(), "%Y-%m-%d", "%H:%M"),
            "Book &amp; Bagels|2025-02-05|09:00 - 10:30|Library|Bring a book. &lt;Snacks provided&gt;"
        );
    }

    #[test]
    fn repeated_placeholders() {
        let template = ItemTemplate::new("#{title}/#{title}");
        assert_eq!(
            template.render(&sample(), "%F", "%R"),
            "Book &amp; Bagels/Book &amp; Bagels"
        );
    }

    #[test]
    fn unknown_and_unclosed_tokens_pass_through() {
        let template = ItemTemplate::new("#{organizer} #{title #{1 + 1}");
        assert_eq!(template.render(&sample(), "%F", "%R"), "#{organizer} #{title #{1 + 1}");
    }

    #[test]
    fn substituted_values_are_not_expanded_again() {
        let start = Utc.with_ymd_and_hms(2025, 2, 5, 9, 0, 0).unwrap();
        let item = EventRecord::new("#{location}", EventTime::from_datetime(start)).with_location("secret");
        let template = ItemTemplate::new("<b>#{title}</b>");
        assert_eq!(template.render(&item, "%F", "%R"), "<b>#{location}</b>");
    }

    #[test]
    fn blank_custom_template_falls_back() {
        assert_eq!(ItemTemplate::or_default(None, "d").source(), "d");
        assert_eq!(ItemTemplate::or_default(Some("  \n"), "d").source(), "d");
        assert_eq!(ItemTemplate::or_default(Some("c"), "d").source(), "c");
    }

    #[test]
    fn defaults_use_every_placeholder() {
        for template in [CUSTOM_LIST_TEMPLATE, DETAILED_TEMPLATE] {
            for name in ["title", "date", "time", "location", "description"] {
                assert!(template.contains(&format!("#{{{}}}", name)));
            }
        }
    }
}
