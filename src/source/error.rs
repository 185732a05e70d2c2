//! Error types exposed at the data-source boundary.

use thiserror::Error;

/// Failures reported by a [`super::PagedSource`] call.
///
/// Every variant is transient from the engine's point of view: the affected
/// page or count is treated as "no data yet" for the current cycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The backing store could not be reached.
    #[error("data source unavailable: {message}")]
    Unavailable {
        /// Transport or backend detail.
        message: String,
    },

    /// The backing store refused the request.
    #[error("data source rejected the request: {message}")]
    Rejected {
        /// Reason supplied by the backing store.
        message: String,
    },
}
