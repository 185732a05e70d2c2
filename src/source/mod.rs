//! The paged data-source contract.
//!
//! Every dataset shown through a [`crate::viewport::ViewportController`]
//! implements [`PagedSource`]: an asynchronous, page-addressed accessor
//! plus a change-notification capability. The trait-based design lets tests
//! substitute `MockPagedSource` or the scripted source from the
//! `test-support` feature, while [`ListSource`] serves in-memory data.

use std::num::NonZeroUsize;

use async_trait::async_trait;

pub mod error;
pub mod memory;
pub mod notify;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::SourceError;
pub use memory::ListSource;
pub use notify::{ChangeNotifier, SourceEvent, Subscription};

/// Data provider consumed by the virtualisation engine.
///
/// `page_items` returning fewer than [`PagedSource::page_size`] items (or
/// none) is the only end-of-data signal; implementations must not fail for
/// indices past the end.
#[cfg_attr(test, mockall::automock(type Item = String;))]
#[async_trait]
pub trait PagedSource: Send + Sync {
    /// Item type held by the source.
    type Item: Clone + Send + Sync + 'static;

    /// Returns the current best-known total item count.
    ///
    /// May be expensive; the engine calls it once at start-up and whenever a
    /// recount is explicitly requested.
    async fn total_count(&self) -> Result<usize, SourceError>;

    /// Returns the fixed page size.
    fn page_size(&self) -> NonZeroUsize;

    /// Returns up to `page_size` items starting at `page_index * page_size`.
    async fn page_items(&self, page_index: usize) -> Result<Vec<Self::Item>, SourceError>;

    /// Registers for [`SourceEvent`] notifications.
    fn subscribe(&self) -> Subscription;
}
