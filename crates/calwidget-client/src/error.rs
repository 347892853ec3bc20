//! Client error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML.
    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file is not valid JSON.
    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),

    /// A date key could not be parsed.
    #[error("{field} is not a valid date: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    /// The time zone is not an IANA name.
    #[error("unknown time zone {0:?}")]
    UnknownTimeZone(String),
}

/// Errors that abort building widget content.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WidgetError {
    /// The calendar could not be fetched; carries the fetch error message.
    #[error("{0}")]
    Fetch(String),

    /// The configured output format is not one of the known layouts.
    #[error("unsupported output format {0}")]
    UnsupportedFormat(String),
}

/// Errors reported by the `calwidget` binary.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rendering failed.
    #[error("render failed: {0}")]
    Widget(#[from] WidgetError),

    /// The configuration did not validate.
    #[error("configuration is invalid ({0} problem(s))")]
    Invalid(usize),

    /// Output could not be serialized.
    #[error("failed to encode output: {0}")]
    Encode(String),
}
