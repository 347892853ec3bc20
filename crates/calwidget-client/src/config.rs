//! Widget configuration.
//!
//! A calendar widget is configured with a flat set of keys, loaded from a
//! TOML file (`~/.config/calwidget/config.toml` by default) or a JSON file.
//! Every key is optional and falls back to the defaults below.
//!
//! ```toml
//! calendar_source = "ical"
//! calendar_url = "webcal://example.com/campus.ics"
//! max_results = 10
//! days_ahead = 7
//! output_format = "detailed_list"
//! time_zone = "America/New_York"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use calwidget_core::format::{DEFAULT_DAY_FORMAT, DEFAULT_TIME_FORMAT};
use calwidget_core::{OutputFormat, parse_date};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Configuration of one calendar widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// `google` or `ical`.
    pub calendar_source: String,

    /// Google API key. A blank key disables Google fetches.
    pub api_key: String,

    /// Google calendar identifier.
    pub calendar_id: String,

    /// iCal document URL.
    pub calendar_url: String,

    /// Maximum number of events. Blank strings count as unset.
    #[serde(deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub max_results: Option<i64>,

    /// Days after the start date to include when no end date is set.
    pub days_ahead: u32,

    /// First day to show; today when blank.
    pub start_date: String,

    /// Last day to show; `days_ahead` after the start when blank.
    pub end_date: String,

    /// `headlines`, `custom_list`, `detailed` or `detailed_list`.
    pub output_format: String,

    /// strftime pattern for dates.
    pub day_format: String,

    /// strftime pattern for times.
    pub time_format: String,

    /// Item template for the custom list and detailed layouts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_template: Option<String>,

    /// IANA time zone events are displayed in.
    pub time_zone: String,

    /// HTTP request timeout in seconds.
    pub http_timeout_secs: u64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_source: "ical".to_string(),
            api_key: String::new(),
            calendar_id: String::new(),
            calendar_url: String::new(),
            max_results: Some(10),
            days_ahead: 7,
            start_date: String::new(),
            end_date: String::new(),
            output_format: OutputFormat::default().as_str().to_string(),
            day_format: DEFAULT_DAY_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            item_template: None,
            time_zone: "UTC".to_string(),
            http_timeout_secs: 10,
        }
    }
}

impl CalendarConfig {
    /// Loads configuration from the default path, or defaults if it is missing.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    ///
    /// Files ending in `.json` are read as JSON, everything else as TOML.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(toml::from_str(&content)?)
        }
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calwidget")
            .join("config.toml")
    }

    /// Parses `start_date`. `Ok(None)` when blank.
    pub fn start_date(&self) -> Result<Option<NaiveDate>, ConfigError> {
        optional_date("start_date", &self.start_date)
    }

    /// Parses `end_date`. `Ok(None)` when blank.
    pub fn end_date(&self) -> Result<Option<NaiveDate>, ConfigError> {
        optional_date("end_date", &self.end_date)
    }

    /// Parses `time_zone`.
    pub fn time_zone(&self) -> Result<Tz, ConfigError> {
        self.time_zone
            .trim()
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimeZone(self.time_zone.clone()))
    }

    /// The result limit passed to sources. Non-positive limits mean none.
    pub fn result_limit(&self) -> Option<usize> {
        self.max_results
            .filter(|max| *max >= 1)
            .and_then(|max| usize::try_from(max).ok())
    }

    /// The item template, unless blank.
    pub fn item_template(&self) -> Option<&str> {
        self.item_template
            .as_deref()
            .filter(|template| !template.trim().is_empty())
    }

    /// The HTTP request timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn optional_date(field: &'static str, value: &str) -> Result<Option<NaiveDate>, ConfigError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_date(value)
        .map(Some)
        .ok_or_else(|| ConfigError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

/// Accepts an integer, a numeric string, or a blank string (unset).
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        Str(String),
    }

    match Option::<IntOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IntOrString::Int(n)) => Ok(Some(n)),
        Some(IntOrString::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(IntOrString::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid integer {:?}", s))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = CalendarConfig::default();
        assert_eq!(config.calendar_source, "ical");
        assert_eq!(config.day_format, "%A %b %e");
        assert_eq!(config.time_format, "%l:%M %P");
        assert_eq!(config.max_results, Some(10));
        assert_eq!(config.days_ahead, 7);
        assert_eq!(config.output_format, "headlines");
        assert_eq!(config.time_zone().unwrap(), chrono_tz::UTC);
    }

    #[test]
    fn load_toml_fills_missing_keys() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
calendar_url = "https://example.com/campus.ics"
output_format = "detailed_list"
time_zone = "America/New_York"
"#
        )
        .unwrap();

        let config = CalendarConfig::load_from(file.path()).unwrap();
        assert_eq!(config.calendar_url, "https://example.com/campus.ics");
        assert_eq!(config.output_format, "detailed_list");
        assert_eq!(config.time_zone().unwrap(), chrono_tz::America::New_York);
        assert_eq!(config.calendar_source, "ical");
        assert_eq!(config.max_results, Some(10));
    }

    #[test]
    fn load_json_with_blank_max_results() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"calendar_source": "google", "calendar_id": "primary", "max_results": ""}}"#
        )
        .unwrap();

        let config = CalendarConfig::load_from(file.path()).unwrap();
        assert_eq!(config.calendar_source, "google");
        assert_eq!(config.max_results, None);
        assert_eq!(config.result_limit(), None);
    }

    #[test]
    fn max_results_accepts_numeric_strings() {
        let config: CalendarConfig = serde_json::from_str(r#"{"max_results": " 25 "}"#).unwrap();
        assert_eq!(config.result_limit(), Some(25));

        assert!(serde_json::from_str::<CalendarConfig>(r#"{"max_results": "lots"}"#).is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CalendarConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn date_parsing() {
        let config = CalendarConfig {
            start_date: "2025-02-05".to_string(),
            end_date: "soon".to_string(),
            ..Default::default()
        };
        assert_eq!(config.start_date().unwrap(), NaiveDate::from_ymd_opt(2025, 2, 5));
        assert!(matches!(
            config.end_date(),
            Err(ConfigError::InvalidDate { field: "end_date", .. })
        ));
        assert_eq!(CalendarConfig::default().start_date().unwrap(), None);
    }

    #[test]
    fn blank_item_template_is_none() {
        let config = CalendarConfig {
            item_template: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.item_template(), None);
    }

    #[test]
    fn unknown_time_zone() {
        let config = CalendarConfig {
            time_zone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.time_zone(), Err(ConfigError::UnknownTimeZone(_))));
    }
}
