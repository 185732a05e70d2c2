//! Error types surfaced by configuration loading and the demo binary.
//!
//! The virtualisation core never propagates failures to its caller; data
//! source failures travel as [`crate::source::SourceError`] and are absorbed
//! by the fetch loop. This type covers everything around the core.

use thiserror::Error;

/// Errors surfaced while configuring or driving the list engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SmartListError {
    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },
}
