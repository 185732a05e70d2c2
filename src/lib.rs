//! Virtualised, lazily paged list engine.
//!
//! The crate presents an unbounded dataset, served page by page by an
//! asynchronous [`source::PagedSource`], as one scrollable list whose size
//! is discovered progressively. A host only draws the items currently in
//! view; [`viewport::ViewportController`] decides which pages must be
//! resident, fetches them without letting a stale request overwrite a
//! newer one, and projects the result into a [`viewport::RenderModel`]
//! whose filler blocks respect the host's maximum element height.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geometry;
pub mod source;
pub mod telemetry;
pub mod viewport;
pub mod window;

pub use config::SmartListConfig;
pub use error::SmartListError;
pub use source::{ListSource, PagedSource, SourceError, SourceEvent};
pub use viewport::{RenderModel, Viewport, ViewportController, ViewportOptions};
