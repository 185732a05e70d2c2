//! Unit and property tests for window computation.

use std::num::{NonZeroU32, NonZeroUsize};

use proptest::prelude::*;
use rstest::rstest;

use super::{PageWindow, WindowRequest, required_pages};

fn request(scroll_offset: i64, viewport_height: u32, lookahead: usize) -> WindowRequest {
    WindowRequest {
        scroll_offset,
        viewport_height,
        item_height: NonZeroU32::new(24).expect("non-zero literal"),
        page_size: NonZeroUsize::new(3).expect("non-zero literal"),
        lookahead,
    }
}

#[rstest]
#[case::top_of_list(0, 300, 1, PageWindow::new(0, 6))]
#[case::mid_list_scroll(500, 300, 1, PageWindow::new(5, 13))]
#[case::aligned_without_lookahead(144, 144, 0, PageWindow::new(2, 4))]
#[case::partial_trailing_page(10, 72, 0, PageWindow::new(0, 2))]
#[case::overscroll_clamps_to_zero(-50, 300, 1, PageWindow::new(0, 5))]
#[case::overscroll_past_viewport(-500, 300, 1, PageWindow::empty())]
#[case::zero_height_viewport(144, 0, 1, PageWindow::new(1, 3))]
#[case::zero_height_no_lookahead(144, 0, 0, PageWindow::new(2, 2))]
fn computes_required_pages(
    #[case] scroll_offset: i64,
    #[case] viewport_height: u32,
    #[case] lookahead: usize,
    #[case] expected: PageWindow,
) {
    let window = required_pages(request(scroll_offset, viewport_height, lookahead));

    assert_eq!(window, expected);
}

#[rstest]
#[case::inside(PageWindow::new(3, 6), 4, 0)]
#[case::before(PageWindow::new(3, 6), 0, 3)]
#[case::just_after(PageWindow::new(3, 6), 6, 1)]
#[case::far_after(PageWindow::new(3, 6), 10, 5)]
fn measures_distance_to_window(
    #[case] window: PageWindow,
    #[case] page_index: usize,
    #[case] expected: usize,
) {
    assert_eq!(window.distance_to(page_index), expected);
}

#[rstest]
fn inverted_window_is_empty() {
    let window = PageWindow::new(7, 2);

    assert!(window.is_empty());
    assert_eq!(window.len(), 0);
    assert_eq!(window.iter().count(), 0);
}

#[rstest]
#[case::exact_pages(21, PageWindow::new(0, 7))]
#[case::partial_last_page(22, PageWindow::new(0, 8))]
#[case::no_items(0, PageWindow::empty())]
fn covers_item_counts(#[case] item_count: usize, #[case] expected: PageWindow) {
    let page_size = NonZeroUsize::new(3).expect("non-zero literal");

    assert_eq!(PageWindow::covering_items(item_count, page_size), expected);
}

#[rstest]
fn hull_ignores_empty_windows() {
    let window = PageWindow::new(2, 4);

    assert_eq!(window.hull(PageWindow::empty()), window);
    assert_eq!(PageWindow::empty().hull(window), window);
    assert_eq!(window.hull(PageWindow::new(6, 9)), PageWindow::new(2, 9));
}

proptest! {
    #[test]
    fn every_visible_item_has_its_page_in_the_window(
        scroll_offset in -10_000_i64..1_000_000,
        viewport_height in 0_u32..5_000,
        item_height in 1_u32..200,
        page_size in 1_usize..100,
        lookahead in 0_usize..4,
    ) {
        let item_height = NonZeroU32::new(item_height).expect("range excludes zero");
        let page_size = NonZeroUsize::new(page_size).expect("range excludes zero");
        let window = required_pages(WindowRequest {
            scroll_offset,
            viewport_height,
            item_height,
            page_size,
            lookahead,
        });

        let height = i64::from(item_height.get());
        let first_pixel = scroll_offset.max(0);
        let last_pixel = scroll_offset + i64::from(viewport_height);
        let mut pixel = first_pixel.div_euclid(height) * height;
        while pixel < last_pixel {
            let item = usize::try_from(pixel.div_euclid(height)).expect("non-negative");
            let page = item.div_euclid(page_size.get());
            prop_assert!(
                window.contains(page),
                "item {} on page {} missing from {:?}",
                item,
                page,
                window
            );
            pixel += height;
        }
    }

    #[test]
    fn recomputation_is_idempotent(
        scroll_offset in any::<i64>(),
        viewport_height in any::<u32>(),
        item_height in 1_u32..,
        page_size in 1_usize..10_000,
        lookahead in 0_usize..16,
    ) {
        let request = WindowRequest {
            scroll_offset,
            viewport_height,
            item_height: NonZeroU32::new(item_height).expect("range excludes zero"),
            page_size: NonZeroUsize::new(page_size).expect("range excludes zero"),
            lookahead,
        };

        let first = required_pages(request);
        let second = required_pages(request);

        prop_assert_eq!(first, second);
        prop_assert_eq!(
            first.iter().collect::<Vec<_>>(),
            second.iter().collect::<Vec<_>>()
        );
        prop_assert!(first.start() <= first.end());
    }
}
