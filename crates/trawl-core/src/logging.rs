//! Logging settings shared by the engine and the command-line tool.
//!
//! The engine only emits `tracing` events. Which of them reach the terminal,
//! and in what shape, is decided once by whoever installs the subscriber.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Filter used when the caller does not supply one: engine warnings only.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// How log lines are rendered on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, fields flattened.
    Json,
    /// Terse single-line text for interactive use.
    #[default]
    Compact,
}

/// Error for an unknown [`LogFormat`] name.
pub type LogFormatParseError = strum::ParseError;

/// Filter expression and output format for one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    filter: String,
    format: LogFormat,
}

impl LogSettings {
    /// Creates settings from a filter expression such as `trawl=debug`.
    #[must_use]
    pub fn new(filter: impl Into<String>, format: LogFormat) -> Self {
        Self {
            filter: filter.into(),
            format,
        }
    }

    /// Returns the filter expression.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Returns the output format.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FILTER, LogFormat::default())
    }
}
