//! In-memory paged source backed by a vector.

use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::{ChangeNotifier, PagedSource, SourceError, SourceEvent, Subscription};

const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(size) => size,
    None => NonZeroUsize::MIN,
};

/// Growable list exposed through the [`PagedSource`] contract.
///
/// Appending through [`ListSource::push`] announces the new count and the
/// page that received the item, which is how a live viewport learns about
/// growth.
///
/// # Example
///
/// ```
/// use smartlist::source::{ListSource, PagedSource, SourceEvent};
///
/// # tokio_test_block_on(async {
/// let source = ListSource::new(vec!["a", "b", "c", "d"]);
/// let mut events = source.subscribe();
///
/// assert_eq!(source.page_items(1).await, Ok(vec!["d"]));
///
/// source.push("e");
/// assert_eq!(
///     events.try_recv(),
///     Some(SourceEvent::TotalCountChanged { new_total_count: 5 })
/// );
/// assert_eq!(events.try_recv(), Some(SourceEvent::PageChanged { page_index: 1 }));
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(future: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread()
/// #         .build()
/// #         .unwrap_or_else(|error| panic!("runtime: {error}"))
/// #         .block_on(future)
/// # }
/// ```
#[derive(Debug)]
pub struct ListSource<T> {
    items: Mutex<Vec<T>>,
    page_size: NonZeroUsize,
    notifier: ChangeNotifier,
}

impl<T> ListSource<T> {
    /// Creates a source with the default page size of three items.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self::with_page_size(items, DEFAULT_PAGE_SIZE)
    }

    /// Creates a source with an explicit page size.
    #[must_use]
    pub fn with_page_size(items: Vec<T>, page_size: NonZeroUsize) -> Self {
        Self {
            items: Mutex::new(items),
            page_size,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Returns the number of items currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true when the source holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the notifier used to announce mutations.
    #[must_use]
    pub const fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Appends an item and announces the new count and the touched page.
    pub fn push(&self, item: T) {
        let new_total_count = {
            let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
            items.push(item);
            items.len()
        };

        let last_index = new_total_count.saturating_sub(1);
        self.notifier
            .publish(SourceEvent::TotalCountChanged { new_total_count });
        self.notifier.publish(SourceEvent::PageChanged {
            page_index: last_index.div_euclid(self.page_size.get()),
        });
    }

    /// Appends every item in order, announcing each one.
    pub fn extend(&self, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.push(item);
        }
    }
}

#[async_trait]
impl<T> PagedSource for ListSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    async fn total_count(&self) -> Result<usize, SourceError> {
        Ok(self.len())
    }

    fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    async fn page_items(&self, page_index: usize) -> Result<Vec<T>, SourceError> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        let start = page_index.saturating_mul(self.page_size.get());
        let end = start.saturating_add(self.page_size.get()).min(items.len());

        Ok(items
            .get(start..end)
            .map(<[T]>::to_vec)
            .unwrap_or_default())
    }

    fn subscribe(&self) -> Subscription {
        self.notifier.subscribe()
    }
}
