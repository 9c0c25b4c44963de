//! Message formatting
//!
//! Templates use brace placeholders: `{timestamp}`, `{level}`, `{name}`,
//! `{file}`, `{line}` and `{message}`. Anything else is copied literally.

use chrono::format::{Item, StrftimeItems};
use colored::*;

use super::Record;
use crate::severity::Severity;

/// `"<timestamp>: <LEVEL> [<name>:<line>]\n> <message>"`
pub const DEFAULT_FORMAT: &str = "{timestamp}: {level} [{name}:{line}]\n> {message}";

/// e.g. `2024-03-01 12:00:00,123`
pub const DEFAULT_DATEFMT: &str = "%Y-%m-%d %H:%M:%S,%3f";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Timestamp,
    Level,
    Name,
    File,
    Line,
    Message,
}

fn parse_template(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            literal.push_str(&rest[open..]);
            rest = "";
            break;
        };

        let field = match &after[..close] {
            "timestamp" => Some(Segment::Timestamp),
            "level" => Some(Segment::Level),
            "name" => Some(Segment::Name),
            "file" => Some(Segment::File),
            "line" => Some(Segment::Line),
            "message" => Some(Segment::Message),
            _ => None,
        };

        match field {
            Some(segment) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(segment);
            }
            None => literal.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

fn valid_datefmt(datefmt: &str) -> bool {
    !StrftimeItems::new(datefmt).any(|item| matches!(item, Item::Error))
}

/// Renders records into text lines
#[derive(Debug, Clone)]
pub struct Formatter {
    template: String,
    datefmt: String,
    segments: Vec<Segment>,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::format_with(DEFAULT_FORMAT)
    }
}

impl Formatter {
    /// Build a formatter from a template
    pub fn format_with(template: &str) -> Self {
        Self {
            template: template.to_string(),
            datefmt: DEFAULT_DATEFMT.to_string(),
            segments: parse_template(template),
        }
    }

    /// Use a chrono strftime pattern for `{timestamp}`.
    /// An invalid pattern is ignored and the default is kept.
    pub fn with_datefmt(mut self, datefmt: &str) -> Self {
        if valid_datefmt(datefmt) {
            self.datefmt = datefmt.to_string();
        } else {
            log::warn!("Invalid timestamp format '{}', keeping '{}'", datefmt, self.datefmt);
        }
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn datefmt(&self) -> &str {
        &self.datefmt
    }

    /// Render a record with the plain level name
    pub fn format(&self, record: &Record) -> String {
        self.render(record, record.severity.as_str())
    }

    /// Render a record with a terminal-colored level name
    pub fn format_colored(&self, record: &Record) -> String {
        let level = record.severity.as_str();
        let colored = match record.severity {
            Severity::NotSet => level.normal(),
            Severity::Debug => level.cyan(),
            Severity::Info => level.green(),
            Severity::Warning => level.yellow(),
            Severity::Error => level.red(),
            Severity::Critical => level.red().bold(),
        };
        self.render(record, &colored.to_string())
    }

    fn render(&self, record: &Record, level: &str) -> String {
        let mut out = String::with_capacity(self.template.len() + record.message.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Timestamp => out.push_str(&record.timestamp.format(&self.datefmt).to_string()),
                Segment::Level => out.push_str(level),
                Segment::Name => out.push_str(&record.name),
                Segment::File => out.push_str(&record.file),
                Segment::Line => out.push_str(&record.line.to_string()),
                Segment::Message => out.push_str(&record.message),
            }
        }
        out
    }
}
