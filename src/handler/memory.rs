//! In-memory sink

use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{Formatter, Handler, Record};
use crate::severity::Severity;

/// Keeps every handled record in memory
#[derive(Debug, Default)]
pub struct MemoryHandler {
    formatter: Formatter,
    level: Severity,
    records: Mutex<Vec<Record>>,
}

impl MemoryHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    fn records_guard(&self) -> MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of captured records
    pub fn records(&self) -> Vec<Record> {
        self.records_guard().clone()
    }

    /// Captured records rendered with this handler's formatter
    pub fn lines(&self) -> Vec<String> {
        self.records_guard().iter().map(|r| self.formatter.format(r)).collect()
    }

    /// Captured message bodies only
    pub fn messages(&self) -> Vec<String> {
        self.records_guard().iter().map(|r| r.message.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records_guard().is_empty()
    }

    pub fn clear(&self) {
        self.records_guard().clear();
    }
}

impl Handler for MemoryHandler {
    fn level(&self) -> Severity {
        self.level
    }

    fn handle(&self, record: &Record) -> io::Result<()> {
        self.records_guard().push(record.clone());
        Ok(())
    }
}
