//! Mapping from scroll position to the pages a viewport needs.
//!
//! This module is pure: [`required_pages`] turns a [`WindowRequest`] into a
//! [`PageWindow`] without touching any state, so identical requests always
//! yield identical windows.

use std::num::{NonZeroU32, NonZeroUsize};
use std::ops::Range;

use serde::Serialize;

/// Default number of extra pages kept on each side of the visible region.
pub const DEFAULT_LOOKAHEAD_PAGES: usize = 1;

/// Half-open, ascending range of page indices.
///
/// # Example
///
/// ```
/// use smartlist::window::PageWindow;
///
/// let window = PageWindow::new(2, 5);
/// assert_eq!(window.iter().collect::<Vec<_>>(), vec![2, 3, 4]);
/// assert!(window.contains(4));
/// assert!(!window.contains(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct PageWindow {
    start: usize,
    end: usize,
}

impl PageWindow {
    /// Creates a window covering `start..end`; an inverted range is empty.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        if end < start {
            Self { start, end: start }
        } else {
            Self { start, end }
        }
    }

    /// Returns a window covering no pages.
    #[must_use]
    pub const fn empty() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Returns the pages needed to hold `item_count` items.
    #[must_use]
    pub const fn covering_items(item_count: usize, page_size: NonZeroUsize) -> Self {
        Self::new(0, item_count.div_ceil(page_size.get()))
    }

    /// Returns the smallest window containing both `self` and `other`.
    #[must_use]
    pub fn hull(self, other: Self) -> Self {
        match (self.is_empty(), other.is_empty()) {
            (true, _) => other,
            (_, true) => self,
            _ => Self::new(self.start.min(other.start), self.end.max(other.end)),
        }
    }

    /// First page index in the window.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// One past the last page index in the window.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Number of pages in the window.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true when the window covers no pages.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true when `page_index` lies inside the window.
    #[must_use]
    pub const fn contains(&self, page_index: usize) -> bool {
        self.start <= page_index && page_index < self.end
    }

    /// Distance in pages from the window to `page_index`; zero when inside.
    #[must_use]
    pub const fn distance_to(&self, page_index: usize) -> usize {
        if page_index < self.start {
            self.start - page_index
        } else if page_index >= self.end {
            page_index - self.end + 1
        } else {
            0
        }
    }

    /// Iterates page indices in ascending order.
    #[must_use]
    pub fn iter(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl IntoIterator for PageWindow {
    type Item = usize;
    type IntoIter = Range<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.start..self.end
    }
}

/// Inputs to [`required_pages`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRequest {
    /// Scroll offset in pixels; negative overscroll is tolerated.
    pub scroll_offset: i64,
    /// Viewport height in pixels.
    pub viewport_height: u32,
    /// Fixed item height in pixels.
    pub item_height: NonZeroU32,
    /// Items per page.
    pub page_size: NonZeroUsize,
    /// Extra pages kept before and after the visible pages.
    pub lookahead: usize,
}

/// Computes the pages that must be resident for a viewport.
///
/// The window starts `lookahead` pages before the page under the top edge
/// and ends `lookahead` pages after the page under the last visible pixel.
/// Negative indices are dropped, so overscrolling past the top clamps to
/// page zero instead of failing.
///
/// # Example
///
/// ```
/// use std::num::{NonZeroU32, NonZeroUsize};
///
/// use smartlist::window::{PageWindow, WindowRequest, required_pages};
///
/// let request = WindowRequest {
///     scroll_offset: 144,
///     viewport_height: 144,
///     item_height: NonZeroU32::new(24).expect("non-zero"),
///     page_size: NonZeroUsize::new(3).expect("non-zero"),
///     lookahead: 1,
/// };
/// // 72px pages: pages 2 and 3 are visible, plus one page either side.
/// assert_eq!(required_pages(request), PageWindow::new(1, 5));
/// ```
#[must_use]
pub fn required_pages(request: WindowRequest) -> PageWindow {
    let page_size = i128::try_from(request.page_size.get()).unwrap_or(i128::MAX);
    let page_height = page_size
        .saturating_mul(i128::from(request.item_height.get()))
        .max(1);
    let lookahead = i128::try_from(request.lookahead).unwrap_or(i128::MAX);

    let top = i128::from(request.scroll_offset);
    let first_visible = top.div_euclid(page_height);
    let last_visible = if request.viewport_height == 0 {
        first_visible - 1
    } else {
        (top + i128::from(request.viewport_height) - 1).div_euclid(page_height)
    };

    let start = first_visible.saturating_sub(lookahead);
    let end = last_visible.saturating_add(1).saturating_add(lookahead);

    PageWindow::new(clamp_index(start), clamp_index(end))
}

fn clamp_index(value: i128) -> usize {
    usize::try_from(value.max(0)).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests;
