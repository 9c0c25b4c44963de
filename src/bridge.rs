//! `log` facade integration
//!
//! [`LogBridge`] lets code that logs through the `log` macros reach registry
//! emitters: a record is delivered to the emitter whose name equals the record
//! target. Targets with no registered emitter are dropped.

use std::sync::Arc;

use crate::handler::Record;
use crate::registry::Registry;
use crate::severity::Severity;

#[derive(Debug, Clone)]
pub struct LogBridge {
    registry: Arc<Registry>,
}

impl LogBridge {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Install as the global `log` logger. Filtering is left to the emitters.
    pub fn install(registry: Arc<Registry>) -> Result<(), log::SetLoggerError> {
        let bridge: &'static LogBridge = Box::leak(Box::new(Self::new(registry)));
        log::set_logger(bridge)?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(())
    }

    /// Targets of this crate's own modules, e.g. `emitter_registry::emitter`
    fn is_own_diagnostic(target: &str) -> bool {
        target == env!("CARGO_CRATE_NAME") || target.starts_with(concat!(env!("CARGO_CRATE_NAME"), "::"))
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        if Self::is_own_diagnostic(metadata.target()) {
            return false;
        }
        self.registry
            .emitter(metadata.target())
            .is_some_and(|emitter| emitter.is_enabled_for(metadata.level().into()))
    }

    fn log(&self, record: &log::Record<'_>) {
        // Own diagnostics never route back into emitters
        if Self::is_own_diagnostic(record.target()) {
            return;
        }
        let Some(emitter) = self.registry.emitter(record.target()) else {
            return;
        };
        let severity = Severity::from(record.level());
        if !emitter.is_enabled_for(severity) {
            return;
        }

        let record = Record::new(
            severity,
            emitter.name(),
            record.file().unwrap_or("<unknown>"),
            record.line().unwrap_or(0),
            record.args().to_string(),
        );
        emitter.log_record(&record);
    }

    fn flush(&self) {
        self.registry.flush();
    }
}
