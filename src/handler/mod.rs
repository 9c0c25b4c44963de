//! Output handlers shared between emitters
//!
//! A handler is a sink for formatted records. Handlers are shared by reference
//! (`Arc<dyn Handler>`): the same instance may be attached to many emitters and
//! is identified by its allocation, not by its contents.
//!
//! Sinks provided here:
//! - Console - stderr (default) or stdout
//! - File - plain formatted lines appended to a file
//! - Json - one JSON object per record (JSONL)
//! - Memory - keeps records in memory for inspection

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::severity::Severity;

pub mod console;
pub mod file;
pub mod format;
pub mod memory;

pub use console::{ConsoleHandler, Stream};
pub use file::{FileHandler, JsonHandler};
pub use format::{DEFAULT_DATEFMT, DEFAULT_FORMAT, Formatter};
pub use memory::MemoryHandler;

/// A single log event
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    /// Local time the record was created
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    /// Name of the emitter that produced the record
    pub name: String,
    /// Source file of the call site
    pub file: String,
    /// Source line of the call site
    pub line: u32,
    pub message: String,
}

impl Record {
    pub fn new(severity: Severity, name: &str, file: &str, line: u32, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            severity,
            name: name.to_string(),
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }
}

/// An output sink for records
pub trait Handler: Send + Sync + fmt::Debug {
    /// Threshold applied after the emitter's own threshold
    fn level(&self) -> Severity {
        Severity::NotSet
    }

    /// Write one record
    fn handle(&self, record: &Record) -> io::Result<()>;

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Whether two handles point at the same handler instance
pub fn same_handler<T: ?Sized, U: ?Sized>(a: &Arc<T>, b: &Arc<U>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Ordered set of shared handlers without duplicate instances
#[derive(Debug, Clone, Default)]
pub struct HandlerSet {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The library default: one console handler on stderr using [`DEFAULT_FORMAT`]
    pub fn default_set() -> Self {
        Self::new().with(Arc::new(ConsoleHandler::new()))
    }

    /// Builder form of [`HandlerSet::insert`]
    pub fn with(mut self, handler: Arc<dyn Handler>) -> Self {
        self.insert(handler);
        self
    }

    /// Append `handler` unless this exact instance is already present.
    /// Returns whether it was added.
    pub fn insert(&mut self, handler: Arc<dyn Handler>) -> bool {
        if self.contains(&handler) {
            return false;
        }
        self.handlers.push(handler);
        true
    }

    pub fn contains<T: ?Sized>(&self, handler: &Arc<T>) -> bool {
        self.handlers.iter().any(|h| same_handler(h, handler))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Handler>> {
        self.handlers.iter()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Flush every handler, reporting failures through `log`
    pub fn flush(&self) {
        for handler in &self.handlers {
            if let Err(e) = handler.flush() {
                log::warn!("Failed to flush handler {:?}: {}", handler, e);
            }
        }
    }
}

impl FromIterator<Arc<dyn Handler>> for HandlerSet {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Handler>>>(iter: I) -> Self {
        let mut set = Self::new();
        for handler in iter {
            set.insert(handler);
        }
        set
    }
}

impl<'a> IntoIterator for &'a HandlerSet {
    type Item = &'a Arc<dyn Handler>;
    type IntoIter = std::slice::Iter<'a, Arc<dyn Handler>>;

    fn into_iter(self) -> Self::IntoIter {
        self.handlers.iter()
    }
}
