//! Named, pre-configured log emitters for libraries
//!
//! This crate provides:
//! - A [`Registry`] handing out one shared [`Emitter`] per name
//! - A default [`HandlerSet`] (one console handler) attached to every emitter
//! - Severity control per emitter or across all of them
//! - [`TimedExecution`], which logs how long wrapped calls take
//!
//! ```
//! use emitter_registry::{EmitterOptions, Registry, Severity};
//!
//! let registry = Registry::new();
//! let emitter = registry.get_emitter_with("library.core", EmitterOptions::new().level(Severity::Info));
//! emitter.info("ready");
//! // 2024-03-01 12:00:00,123: INFO [library.core:5]
//! // > ready
//!
//! registry.set_level(Severity::Warning, None).unwrap();
//! assert_eq!(emitter.level(), Severity::Warning);
//! ```
//!
//! Fetching an existing emitter through [`Registry::get_emitter`] is not a
//! pure lookup: it re-applies the level and handlers to the shared instance.

pub mod bridge;
pub mod config;
pub mod emitter;
pub mod error;
pub mod handler;
pub mod registry;
pub mod severity;
pub mod timing;

pub use bridge::LogBridge;
pub use config::{Config, HandlerConfig};
pub use emitter::Emitter;
pub use error::RegistryError;
pub use handler::{
    ConsoleHandler, FileHandler, Formatter, Handler, HandlerSet, JsonHandler, MemoryHandler, Record, Stream,
};
pub use registry::{EmitterOptions, Registry, global, init_global};
pub use severity::Severity;
pub use timing::{Invoke, Timed, TimedExecution};
