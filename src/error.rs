//! Error types for registry operations.
//!
//! Only registry lookups and global installation can fail for domain reasons.
//! Sink construction reports `std::io::Error` directly, and configuration
//! loading uses `eyre` with context.

use thiserror::Error;

/// Errors produced by [`Registry`](crate::Registry) operations.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A named emitter was requested but was never registered.
    #[error("emitter '{name}' not found")]
    NotFound {
        /// The requested emitter name.
        name: String,
    },

    /// The process-wide registry was already installed or created.
    #[error("global registry already initialized")]
    AlreadyInitialized,
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::NotFound { .. } => "registry_not_found",
            RegistryError::AlreadyInitialized => "registry_already_initialized",
        }
    }
}
