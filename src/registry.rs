//! Name-keyed emitter registry
//!
//! The registry maps emitter names to shared [`Emitter`] instances. For a given
//! name at most one emitter ever exists, and the map only grows.
//!
//! Create one `Registry` at startup and pass it around as `Arc<Registry>`.
//! For code that cannot be wired that way, [`global`] lazily builds one
//! process-wide instance, and [`init_global`] installs a custom one.

use eyre::Result;
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::config::Config;
use crate::emitter::Emitter;
use crate::error::RegistryError;
use crate::handler::HandlerSet;
use crate::severity::Severity;
use crate::timing::TimedExecution;

/// Per-call options for [`Registry::get_emitter_with`]
#[derive(Debug, Clone, Default)]
pub struct EmitterOptions {
    /// Level to set; the registry default when `None`
    pub level: Option<Severity>,
    /// Handlers to ensure are attached; the registry default set when `None`
    pub handlers: Option<HandlerSet>,
}

impl EmitterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: Severity) -> Self {
        self.level = Some(level);
        self
    }

    pub fn handlers(mut self, handlers: HandlerSet) -> Self {
        self.handlers = Some(handlers);
        self
    }
}

#[derive(Debug)]
pub struct Registry {
    default_level: RwLock<Severity>,
    default_handlers: HandlerSet,
    emitters: Mutex<IndexMap<String, Arc<Emitter>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// DEBUG default level, one stderr console handler
    pub fn new() -> Self {
        Self::with_defaults(Severity::Debug, HandlerSet::default_set())
    }

    pub fn with_defaults(level: Severity, handlers: HandlerSet) -> Self {
        Self {
            default_level: RwLock::new(level),
            default_handlers: handlers,
            emitters: Mutex::new(IndexMap::new()),
        }
    }

    /// Build a registry whose defaults come from `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let handlers = config.build_handlers()?;
        Ok(Self::with_defaults(config.level, handlers))
    }

    fn lock_emitters(&self) -> MutexGuard<'_, IndexMap<String, Arc<Emitter>>> {
        self.emitters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Level given to emitters fetched without an explicit level
    pub fn default_level(&self) -> Severity {
        *self.default_level.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change the default level for later `get_emitter` calls.
    /// Existing emitters keep their level.
    pub fn set_default_level(&self, level: Severity) {
        *self.default_level.write().unwrap_or_else(PoisonError::into_inner) = level;
    }

    pub fn default_handlers(&self) -> &HandlerSet {
        &self.default_handlers
    }

    /// Get or create the emitter `name` with the default level and handlers.
    ///
    /// See [`Registry::get_emitter_with`]: fetching an existing emitter
    /// RESETS its level to the default.
    pub fn get_emitter(&self, name: &str) -> Arc<Emitter> {
        self.get_emitter_with(name, EmitterOptions::default())
    }

    /// Get or create the emitter `name`.
    ///
    /// **This is not a read-only lookup.** When `name` already exists, the same
    /// instance is returned after its handlers are topped up and its level is
    /// overwritten with `options.level` (or the registry default). Levels are
    /// therefore global per name: a later call with another level changes the
    /// emitter for every holder. Use [`Registry::emitter`] to look up without
    /// side effects.
    pub fn get_emitter_with(&self, name: &str, options: EmitterOptions) -> Arc<Emitter> {
        let mut emitters = self.lock_emitters();
        let emitter = match emitters.get(name) {
            Some(existing) => existing.clone(),
            None => {
                log::debug!("Registering emitter '{}'", name);
                let created = Arc::new(Emitter::new(name));
                emitters.insert(name.to_string(), created.clone());
                created
            }
        };

        self.attach_handlers(&emitter, options.handlers.as_ref());
        emitter.set_level(options.level.unwrap_or_else(|| self.default_level()));
        emitter
    }

    /// Attach each handler of `handlers` (default set when `None`) that the
    /// emitter does not already have, keeping order
    pub fn attach_handlers(&self, emitter: &Emitter, handlers: Option<&HandlerSet>) {
        let handlers = handlers.unwrap_or(&self.default_handlers);
        for handler in handlers {
            emitter.add_handler(handler.clone());
        }
    }

    /// Set the level of one emitter, or of every registered emitter when `name` is `None`.
    ///
    /// The sweep does not change the default level for emitters created later;
    /// use [`Registry::set_default_level`] for that. An unknown `name` is an
    /// error and nothing is created.
    pub fn set_level(&self, level: Severity, name: Option<&str>) -> Result<(), RegistryError> {
        let emitters = self.lock_emitters();
        match name {
            None => {
                for emitter in emitters.values() {
                    emitter.set_level(level);
                }
                Ok(())
            }
            Some(name) => {
                let emitter = emitters.get(name).ok_or_else(|| RegistryError::NotFound {
                    name: name.to_string(),
                })?;
                emitter.set_level(level);
                Ok(())
            }
        }
    }

    /// Look up without creating or modifying anything
    pub fn emitter(&self, name: &str) -> Option<Arc<Emitter>> {
        self.lock_emitters().get(name).cloned()
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<String> {
        self.lock_emitters().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock_emitters().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_emitters().is_empty()
    }

    /// Flush every handler reachable from this registry: the default set and
    /// anything attached to a registered emitter, each instance once
    pub fn flush(&self) {
        let mut handlers = self.default_handlers.clone();
        {
            let emitters = self.lock_emitters();
            for emitter in emitters.values() {
                for handler in &emitter.handlers() {
                    handlers.insert(handler.clone());
                }
            }
        }
        handlers.flush();
    }

    /// Decorator factory that times calls and reports through `emitter`
    pub fn register_timed_execution(&self, emitter: &Arc<Emitter>) -> TimedExecution {
        TimedExecution::new(emitter.clone())
    }
}

static GLOBAL: OnceCell<Registry> = OnceCell::new();

/// The process-wide registry, built from [`Config::load`] on first use.
/// A config that fails to load falls back to [`Registry::new`].
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(|| match Config::load(None).and_then(|config| Registry::from_config(&config)) {
        Ok(registry) => registry,
        Err(e) => {
            log::warn!("Failed to configure global registry, using defaults: {:#}", e);
            Registry::new()
        }
    })
}

/// Install `registry` as the process-wide instance.
/// Fails when [`global`] or `init_global` already ran.
pub fn init_global(registry: Registry) -> Result<(), RegistryError> {
    GLOBAL.set(registry).map_err(|_| RegistryError::AlreadyInitialized)
}
