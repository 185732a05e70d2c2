//! Shared test utilities.

use std::sync::Arc;

use smartlist::ListSource;
use smartlist::source::test_support::ScriptedSource;

pub mod runtime;

/// Builds a scripted source of `count` items titled `Item 1`, `Item 2`, ...
/// in pages of `page_size`.
///
/// # Panics
///
/// Panics if `page_size` is zero.
pub fn titled_source(count: usize, page_size: usize) -> Arc<ScriptedSource<String>> {
    let page_size = std::num::NonZeroUsize::new(page_size)
        .unwrap_or_else(|| panic!("page size must be non-zero"));
    let titles = (1..=count).map(|n| format!("Item {n}")).collect();
    Arc::new(ScriptedSource::new(ListSource::with_page_size(
        titles, page_size,
    )))
}
