//! Resident pages and the known total count.
//!
//! [`PageCache`] is the single owner of page data for one viewport. It
//! merges count observations and page results, tracks pages invalidated by
//! the source, and applies the configured [`EvictionPolicy`] after each
//! committed fetch cycle.

use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroUsize;

use crate::window::PageWindow;

/// A contiguous, index-addressed chunk of the dataset.
///
/// Only the last page of the data may hold fewer than `page_size` items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    index: usize,
    items: Vec<T>,
}

impl<T> Page<T> {
    /// Creates a page.
    #[must_use]
    pub const fn new(index: usize, items: Vec<T>) -> Self {
        Self { index, items }
    }

    /// Returns the page index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the items held by the page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Returns the number of items held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when the page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the absolute index of the page's first slot.
    #[must_use]
    pub const fn first_item_index(&self, page_size: NonZeroUsize) -> usize {
        self.index.saturating_mul(page_size.get())
    }

    /// Returns the lower bound on the total count implied by this page.
    #[must_use]
    pub fn implied_count(&self, page_size: NonZeroUsize) -> usize {
        self.first_item_index(page_size).saturating_add(self.len())
    }
}

/// How many pages outside the visible window a cache may keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Keep exactly the pages of the most recent committed cycle.
    #[default]
    WindowOnly,
    /// Keep off-window pages until the cache holds `max_pages`, evicting
    /// those farthest from the window first. Window pages always stay.
    Retain {
        /// Budget for resident pages. Window pages count toward it but are
        /// never evicted, so a window wider than the budget leaves only the
        /// window resident.
        max_pages: usize,
    },
}

/// Outcome of one page request, as merged into the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFetch<T> {
    /// The source returned at least one item.
    Loaded(Page<T>),
    /// The source returned no items: the page lies past the end of data.
    Empty,
    /// The request failed; whatever was cached before stays.
    Failed,
}

/// Resident pages plus the known total count.
#[derive(Debug, Clone)]
pub struct PageCache<T> {
    page_size: NonZeroUsize,
    pages: BTreeMap<usize, Page<T>>,
    stale: BTreeSet<usize>,
    known_total_count: Option<usize>,
}

impl<T> PageCache<T> {
    /// Creates an empty cache for pages of `page_size` items.
    #[must_use]
    pub const fn new(page_size: NonZeroUsize) -> Self {
        Self {
            page_size,
            pages: BTreeMap::new(),
            stale: BTreeSet::new(),
            known_total_count: None,
        }
    }

    /// Returns the page size the cache was built for.
    #[must_use]
    pub const fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    /// Returns the known total count, if any has been observed.
    #[must_use]
    pub const fn known_total_count(&self) -> Option<usize> {
        self.known_total_count
    }

    /// Merges a count observation and returns the resulting count.
    ///
    /// The known count is the maximum of every observation so far.
    ///
    /// ```
    /// use std::num::NonZeroUsize;
    ///
    /// use smartlist::cache::PageCache;
    ///
    /// let mut cache: PageCache<u8> = PageCache::new(NonZeroUsize::MIN);
    /// assert_eq!(cache.observe_count(21), 21);
    /// assert_eq!(cache.observe_count(4), 21);
    /// assert_eq!(cache.observe_count(22), 22);
    /// ```
    pub fn observe_count(&mut self, count: usize) -> usize {
        let merged = self.known_total_count.unwrap_or(0).max(count);
        self.known_total_count = Some(merged);
        merged
    }

    /// Stores a page, replacing any previous copy with the same index.
    ///
    /// Non-empty pages also raise the known count to the bound they imply.
    pub fn insert_page(&mut self, page: Page<T>) {
        if !page.is_empty() {
            self.observe_count(page.implied_count(self.page_size));
        }
        self.stale.remove(&page.index);
        self.pages.insert(page.index, page);
    }

    /// Removes a page and returns it.
    pub fn remove_page(&mut self, page_index: usize) -> Option<Page<T>> {
        self.stale.remove(&page_index);
        self.pages.remove(&page_index)
    }

    /// Marks a page as out of date so the next cycle refetches it.
    pub fn mark_stale(&mut self, page_index: usize) {
        self.stale.insert(page_index);
    }

    /// Returns true when a page was invalidated since it was last loaded.
    #[must_use]
    pub fn is_stale(&self, page_index: usize) -> bool {
        self.stale.contains(&page_index)
    }

    /// Returns true when a page is resident.
    #[must_use]
    pub fn is_resident(&self, page_index: usize) -> bool {
        self.pages.contains_key(&page_index)
    }

    /// Returns true when a page is missing or stale.
    #[must_use]
    pub fn needs_fetch(&self, page_index: usize) -> bool {
        !self.is_resident(page_index) || self.is_stale(page_index)
    }

    /// Returns a resident page.
    #[must_use]
    pub fn page(&self, page_index: usize) -> Option<&Page<T>> {
        self.pages.get(&page_index)
    }

    /// Iterates resident pages in ascending index order.
    pub fn pages(&self) -> impl Iterator<Item = &Page<T>> {
        self.pages.values()
    }

    /// Iterates resident page indices in ascending order.
    pub fn resident_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.pages.keys().copied()
    }

    /// Returns the number of resident pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns true when no pages are resident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Applies one fetch cycle's results, then evicts per `policy`.
    ///
    /// Loaded pages replace their predecessors, empty pages are dropped,
    /// and failed pages keep their previous content. Afterwards the cache
    /// holds the pages of `wanted`, plus whatever `policy` lets survive.
    pub fn commit_pages(
        &mut self,
        wanted: PageWindow,
        results: impl IntoIterator<Item = (usize, PageFetch<T>)>,
        policy: EvictionPolicy,
    ) {
        for (page_index, result) in results {
            match result {
                PageFetch::Loaded(page) => self.insert_page(page),
                PageFetch::Empty => {
                    self.remove_page(page_index);
                }
                PageFetch::Failed => {}
            }
        }
        self.evict(wanted, policy);
    }

    /// Drops pages outside `wanted` as `policy` dictates.
    pub fn evict(&mut self, wanted: PageWindow, policy: EvictionPolicy) {
        match policy {
            EvictionPolicy::WindowOnly => {
                self.pages.retain(|index, _| wanted.contains(*index));
            }
            EvictionPolicy::Retain { max_pages } => {
                let mut off_window: Vec<usize> = self
                    .resident_indices()
                    .filter(|index| !wanted.contains(*index))
                    .collect();
                off_window.sort_by_key(|index| std::cmp::Reverse(wanted.distance_to(*index)));

                let excess = self.pages.len().saturating_sub(max_pages);
                for index in off_window.into_iter().take(excess) {
                    self.pages.remove(&index);
                }
            }
        }
        let pages = &self.pages;
        self.stale.retain(|index| pages.contains_key(index));
    }
}

#[cfg(test)]
mod tests;
