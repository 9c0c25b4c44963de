//! Severity levels for emitters, handlers and records

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Ordered log severity.
///
/// `NotSet` on an emitter or handler means "no threshold": every record passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Severity {
    #[default]
    NotSet = 0,
    Debug = 10,
    Info = 20,
    Warning = 30,
    Error = 40,
    Critical = 50,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::NotSet,
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// Upper-case name as rendered in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::NotSet => "NOTSET",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Numeric value (0, 10, ... 50)
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Whether a record at `record` passes a threshold of `self`
    pub fn allows(&self, record: Severity) -> bool {
        *self == Severity::NotSet || record >= *self
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when a string does not name a severity
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown severity '{0}'")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "notset" | "0" => Ok(Severity::NotSet),
            "debug" | "10" => Ok(Severity::Debug),
            "info" | "20" => Ok(Severity::Info),
            "warning" | "warn" | "30" => Ok(Severity::Warning),
            "error" | "40" => Ok(Severity::Error),
            "critical" | "fatal" | "50" => Ok(Severity::Critical),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = ParseSeverityError;

    fn try_from(value: String) -> Result<Self, ParseSeverityError> {
        value.parse()
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Severity::Error,
            log::Level::Warn => Severity::Warning,
            log::Level::Info => Severity::Info,
            // `log` has no level below debug that maps to a threshold
            log::Level::Debug | log::Level::Trace => Severity::Debug,
        }
    }
}

impl From<Severity> for log::Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::NotSet => log::Level::Trace,
            Severity::Debug => log::Level::Debug,
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error | Severity::Critical => log::Level::Error,
        }
    }
}

impl From<log::LevelFilter> for Severity {
    /// `Off` maps to `Critical`, the strictest threshold available
    fn from(filter: log::LevelFilter) -> Self {
        match filter {
            log::LevelFilter::Off => Severity::Critical,
            log::LevelFilter::Error => Severity::Error,
            log::LevelFilter::Warn => Severity::Warning,
            log::LevelFilter::Info => Severity::Info,
            log::LevelFilter::Debug | log::LevelFilter::Trace => Severity::Debug,
        }
    }
}

impl From<Severity> for log::LevelFilter {
    fn from(severity: Severity) -> Self {
        log::Level::from(severity).to_level_filter()
    }
}
