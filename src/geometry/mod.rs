//! Layout geometry for virtualised lists.
//!
//! Host surfaces cap the height of a single element. A list whose logical
//! height exceeds that cap is represented by several consecutive filler
//! blocks, each no taller than the cap, whose heights add up to the exact
//! logical height.

use std::fmt;
use std::num::{NonZeroU32, NonZeroU64};

use serde::{Serialize, Serializer};

/// Default ceiling for a single element's height, in pixels.
pub const DEFAULT_MAX_ELEMENT_HEIGHT: NonZeroU64 = match NonZeroU64::new(10_000) {
    Some(height) => height,
    None => NonZeroU64::MIN,
};

/// A length in whole pixels.
///
/// Formats as `"{n}px"` with no grouping separators, independent of any
/// locale, and serialises the same way.
///
/// ```
/// use smartlist::geometry::Pixels;
///
/// assert_eq!(Pixels::new(1_234_567).to_string(), "1234567px");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pixels(u64);

impl Pixels {
    /// Wraps a pixel count.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw pixel count.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Pixels {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}px", self.0)
    }
}

impl Serialize for Pixels {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Converts item indices and counts into pixel geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryProjector {
    item_height: NonZeroU32,
    max_element_height: NonZeroU64,
}

impl GeometryProjector {
    /// Creates a projector for fixed-height items.
    #[must_use]
    pub const fn new(item_height: NonZeroU32, max_element_height: NonZeroU64) -> Self {
        Self {
            item_height,
            max_element_height,
        }
    }

    /// Returns the fixed item height.
    #[must_use]
    pub const fn item_height(&self) -> NonZeroU32 {
        self.item_height
    }

    /// Returns the ceiling for a single filler block.
    #[must_use]
    pub const fn max_element_height(&self) -> NonZeroU64 {
        self.max_element_height
    }

    /// Returns the top offset of the item at `index`.
    #[must_use]
    pub fn pixel_offset(&self, index: usize) -> Pixels {
        self.span(index)
    }

    /// Returns the logical height of `item_count` items.
    #[must_use]
    pub fn total_height(&self, item_count: usize) -> Pixels {
        self.span(item_count)
    }

    /// Partitions the logical height of `item_count` items into blocks no
    /// taller than the maximum element height.
    ///
    /// ```
    /// use std::num::{NonZeroU32, NonZeroU64};
    ///
    /// use smartlist::geometry::{GeometryProjector, Pixels};
    ///
    /// let projector = GeometryProjector::new(
    ///     NonZeroU32::new(24).expect("non-zero"),
    ///     NonZeroU64::new(10_000).expect("non-zero"),
    /// );
    /// let blocks: Vec<Pixels> = projector.filler_blocks(1_000).collect();
    /// assert_eq!(
    ///     blocks,
    ///     vec![Pixels::new(10_000), Pixels::new(10_000), Pixels::new(4_000)]
    /// );
    /// ```
    #[must_use]
    pub fn filler_blocks(&self, item_count: usize) -> FillerBlocks {
        FillerBlocks {
            remaining: self.total_height(item_count).get(),
            max_block: self.max_element_height.get(),
        }
    }

    fn span(&self, items: usize) -> Pixels {
        let items = u64::try_from(items).unwrap_or(u64::MAX);
        Pixels(items.saturating_mul(u64::from(self.item_height.get())))
    }
}

/// Iterator over filler block heights, produced by
/// [`GeometryProjector::filler_blocks`].
#[derive(Debug, Clone)]
pub struct FillerBlocks {
    remaining: u64,
    max_block: u64,
}

impl Iterator for FillerBlocks {
    type Item = Pixels;

    fn next(&mut self) -> Option<Pixels> {
        if self.remaining == 0 {
            return None;
        }
        let block = self.remaining.min(self.max_block);
        self.remaining -= block;
        Some(Pixels(block))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let blocks = usize::try_from(self.remaining.div_ceil(self.max_block)).unwrap_or(usize::MAX);
        (blocks, Some(blocks))
    }
}

impl ExactSizeIterator for FillerBlocks {}
