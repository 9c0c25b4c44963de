//! Named log emitters
//!
//! An emitter has a severity threshold and an ordered list of shared handlers.
//! Emitters are created and handed out by the [`Registry`](crate::Registry);
//! every clone of the returned `Arc<Emitter>` sees the same level and handlers.

use std::fmt;
use std::panic::Location;
use std::sync::{Arc, PoisonError, RwLock};

use crate::handler::{Handler, HandlerSet, Record};
use crate::severity::Severity;

#[derive(Debug)]
pub struct Emitter {
    name: String,
    level: RwLock<Severity>,
    handlers: RwLock<HandlerSet>,
}

impl Emitter {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: RwLock::new(Severity::NotSet),
            handlers: RwLock::new(HandlerSet::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Severity {
        *self.level.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the threshold. Affects every holder of this emitter.
    pub fn set_level(&self, level: Severity) {
        *self.level.write().unwrap_or_else(PoisonError::into_inner) = level;
    }

    /// Snapshot of the attached handlers, in attachment order
    pub fn handlers(&self) -> HandlerSet {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn has_handler<T: ?Sized>(&self, handler: &Arc<T>) -> bool {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner).contains(handler)
    }

    /// Attach `handler` unless this instance is already attached
    pub fn add_handler(&self, handler: Arc<dyn Handler>) -> bool {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner).insert(handler)
    }

    pub fn is_enabled_for(&self, severity: Severity) -> bool {
        self.level().allows(severity)
    }

    /// Emit `message` at `severity`, tagged with the caller's source location
    #[track_caller]
    pub fn log(&self, severity: Severity, message: impl fmt::Display) {
        if !self.is_enabled_for(severity) {
            return;
        }
        let caller = Location::caller();
        let record = Record::new(severity, &self.name, caller.file(), caller.line(), message.to_string());
        self.dispatch(&record);
    }

    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Severity::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.log(Severity::Info, message);
    }

    #[track_caller]
    pub fn warning(&self, message: impl fmt::Display) {
        self.log(Severity::Warning, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.log(Severity::Error, message);
    }

    #[track_caller]
    pub fn critical(&self, message: impl fmt::Display) {
        self.log(Severity::Critical, message);
    }

    /// Emit a pre-built record, subject to this emitter's threshold
    pub fn log_record(&self, record: &Record) {
        if self.is_enabled_for(record.severity) {
            self.dispatch(record);
        }
    }

    fn dispatch(&self, record: &Record) {
        // Handlers run outside the lock so a handler may log through this emitter.
        let handlers = self.handlers();
        for handler in &handlers {
            if !handler.level().allows(record.severity) {
                continue;
            }
            if let Err(e) = handler.handle(record) {
                log::warn!("Failed to emit '{}' record to {:?}: {}", self.name, handler, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::MemoryHandler;

    fn emitter_with_memory(level: Severity) -> (Emitter, Arc<MemoryHandler>) {
        let emitter = Emitter::new("test");
        let memory = Arc::new(MemoryHandler::new());
        emitter.add_handler(memory.clone());
        emitter.set_level(level);
        (emitter, memory)
    }

    #[test]
    fn test_new_emitter_is_notset_without_handlers() {
        let emitter = Emitter::new("fresh");
        assert_eq!(emitter.name(), "fresh");
        assert_eq!(emitter.level(), Severity::NotSet);
        assert!(emitter.handlers().is_empty());
    }

    #[test]
    fn test_threshold_filters_records() {
        let (emitter, memory) = emitter_with_memory(Severity::Warning);
        emitter.debug("hidden");
        emitter.info("hidden");
        emitter.warning("shown");
        emitter.critical("shown too");
        assert_eq!(memory.messages(), vec!["shown", "shown too"]);
    }

    #[test]
    fn test_notset_passes_everything() {
        let (emitter, memory) = emitter_with_memory(Severity::NotSet);
        emitter.debug("a");
        emitter.error("b");
        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn test_record_carries_caller_line() {
        let (emitter, memory) = emitter_with_memory(Severity::Debug);
        let line = line!() + 1;
        emitter.info("where am I");
        let records = memory.records();
        assert_eq!(records[0].line, line);
        assert!(records[0].file.ends_with("emitter.rs"));
        assert_eq!(records[0].name, "test");
    }

    #[test]
    fn test_handler_level_applies_after_emitter_level() {
        let emitter = Emitter::new("split");
        let all = Arc::new(MemoryHandler::new());
        let errors_only = Arc::new(MemoryHandler::new().with_level(Severity::Error));
        emitter.add_handler(all.clone());
        emitter.add_handler(errors_only.clone());
        emitter.set_level(Severity::Info);

        emitter.info("info");
        emitter.error("error");

        assert_eq!(all.messages(), vec!["info", "error"]);
        assert_eq!(errors_only.messages(), vec!["error"]);
    }

    #[test]
    fn test_add_handler_twice_is_noop() {
        let (emitter, memory) = emitter_with_memory(Severity::Debug);
        assert!(!emitter.add_handler(memory.clone()));
        emitter.info("once");
        assert_eq!(memory.len(), 1);
        assert!(emitter.has_handler(&memory));
    }

    #[test]
    fn test_log_record_respects_threshold() {
        let (emitter, memory) = emitter_with_memory(Severity::Error);
        emitter.log_record(&Record::new(Severity::Info, "test", "x.rs", 1, "dropped"));
        emitter.log_record(&Record::new(Severity::Error, "test", "x.rs", 2, "kept"));
        assert_eq!(memory.messages(), vec!["kept"]);
    }
}
