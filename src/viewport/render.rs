//! Pure projection of cache state into what a host draws.

use serde::Serialize;

use crate::cache::PageCache;
use crate::geometry::{GeometryProjector, Pixels};

/// An item positioned in the scroll container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedItem<T> {
    /// Absolute item index.
    pub index: usize,
    /// The item, or whatever a template produced from it.
    pub item: T,
    /// Distance from the top of the content.
    pub top_offset: Pixels,
}

/// Size of the visible container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ContainerSize {
    /// Container height.
    pub height: Pixels,
    /// Container width.
    pub width: Pixels,
}

/// Everything a host needs to draw the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderModel<T> {
    /// Whether the total count has been determined.
    pub count_known: bool,
    /// Resident items in ascending index order; holes are omitted.
    pub items: Vec<PlacedItem<T>>,
    /// Stacked blocks reproducing the full content height.
    pub filler_blocks: Vec<Pixels>,
    /// Logical content height.
    pub total_height: Pixels,
    /// Visible container size.
    pub container: ContainerSize,
}

impl<T> RenderModel<T> {
    /// Applies an item template to every placed item, keeping positions.
    ///
    /// ```
    /// use smartlist::geometry::Pixels;
    /// use smartlist::viewport::{ContainerSize, PlacedItem, RenderModel};
    ///
    /// let model = RenderModel {
    ///     count_known: true,
    ///     items: vec![PlacedItem { index: 0, item: "Ada", top_offset: Pixels::new(0) }],
    ///     filler_blocks: vec![Pixels::new(24)],
    ///     total_height: Pixels::new(24),
    ///     container: ContainerSize::default(),
    /// };
    /// let rows = model.render_with(|name| format!("<li>{name}</li>"));
    /// assert_eq!(rows[0].item, "<li>Ada</li>");
    /// ```
    pub fn render_with<R>(&self, template: impl Fn(&T) -> R) -> Vec<PlacedItem<R>> {
        self.items
            .iter()
            .map(|placed| PlacedItem {
                index: placed.index,
                item: template(&placed.item),
                top_offset: placed.top_offset,
            })
            .collect()
    }
}

/// Builds the render model for `cache`.
///
/// With no known count the content height is zero, but any resident items
/// are still placed.
#[must_use]
pub fn project_render_model<T: Clone>(
    cache: &PageCache<T>,
    geometry: &GeometryProjector,
    container: ContainerSize,
) -> RenderModel<T> {
    let count = cache.known_total_count().unwrap_or(0);
    let page_size = cache.page_size();
    let items = cache
        .pages()
        .flat_map(|page| {
            let first = page.first_item_index(page_size);
            page.items()
                .iter()
                .enumerate()
                .map(move |(offset, item)| (first.saturating_add(offset), item))
        })
        .map(|(index, item)| PlacedItem {
            index,
            item: item.clone(),
            top_offset: geometry.pixel_offset(index),
        })
        .collect();

    RenderModel {
        count_known: cache.known_total_count().is_some(),
        items,
        filler_blocks: geometry.filler_blocks(count).collect(),
        total_height: geometry.total_height(count),
        container,
    }
}
