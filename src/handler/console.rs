//! Console sink

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use super::{Formatter, Handler, Record};
use crate::severity::Severity;

/// Console stream to write to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    #[default]
    Stderr,
    Stdout,
}

/// Writes formatted records to stderr or stdout
#[derive(Debug, Clone)]
pub struct ConsoleHandler {
    stream: Stream,
    formatter: Formatter,
    level: Severity,
    color: bool,
}

impl Default for ConsoleHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleHandler {
    /// Stderr, default format, no color
    pub fn new() -> Self {
        Self {
            stream: Stream::Stderr,
            formatter: Formatter::default(),
            level: Severity::NotSet,
            color: false,
        }
    }

    pub fn with_stream(mut self, stream: Stream) -> Self {
        self.stream = stream;
        self
    }

    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    /// Colorize the level name. Off by default so output matches the plain format.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn stream(&self) -> Stream {
        self.stream
    }

    fn render(&self, record: &Record) -> String {
        if self.color {
            self.formatter.format_colored(record)
        } else {
            self.formatter.format(record)
        }
    }
}

impl Handler for ConsoleHandler {
    fn level(&self) -> Severity {
        self.level
    }

    fn handle(&self, record: &Record) -> io::Result<()> {
        let line = self.render(record);
        match self.stream {
            Stream::Stderr => {
                let mut out = io::stderr().lock();
                writeln!(out, "{}", line)?;
                out.flush()
            }
            Stream::Stdout => {
                let mut out = io::stdout().lock();
                writeln!(out, "{}", line)?;
                out.flush()
            }
        }
    }

    fn flush(&self) -> io::Result<()> {
        match self.stream {
            Stream::Stderr => io::stderr().flush(),
            Stream::Stdout => io::stdout().flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let handler = ConsoleHandler::new();
        assert_eq!(handler.stream(), Stream::Stderr);
        assert_eq!(handler.level(), Severity::NotSet);
        assert_eq!(handler.formatter.template(), crate::handler::DEFAULT_FORMAT);
    }

    #[test]
    fn test_plain_render_has_no_escape_codes() {
        let handler = ConsoleHandler::new().with_formatter(Formatter::format_with("{level} {message}"));
        let record = Record::new(Severity::Warning, "x", "f.rs", 1, "careful");
        assert_eq!(handler.render(&record), "WARNING careful");
    }

    #[test]
    fn test_handle_writes_without_error() {
        let handler = ConsoleHandler::new().with_stream(Stream::Stdout);
        let record = Record::new(Severity::Debug, "x", "f.rs", 1, "console test");
        assert!(handler.handle(&record).is_ok());
    }

    #[test]
    fn test_stream_serde_lowercase() {
        let stream: Stream = serde_yaml::from_str("stdout").expect("Failed to deserialize");
        assert_eq!(stream, Stream::Stdout);
    }
}
