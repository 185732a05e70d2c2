//! Unit tests for page merging, count tracking, and eviction.

use std::num::NonZeroUsize;

use proptest::prelude::*;
use rstest::{fixture, rstest};

use super::{EvictionPolicy, Page, PageCache, PageFetch};
use crate::window::PageWindow;

fn page(index: usize, len: usize) -> Page<usize> {
    let first = index * 3;
    Page::new(index, (first..first + len).collect())
}

#[fixture]
fn cache() -> PageCache<usize> {
    PageCache::new(NonZeroUsize::new(3).expect("non-zero literal"))
}

fn resident(cache: &PageCache<usize>) -> Vec<usize> {
    cache.resident_indices().collect()
}

#[rstest]
fn count_is_unknown_until_observed(cache: PageCache<usize>) {
    assert_eq!(cache.known_total_count(), None);
}

#[rstest]
fn short_page_raises_count_to_implied_bound(mut cache: PageCache<usize>) {
    cache.observe_count(10);

    cache.insert_page(page(7, 1));

    assert_eq!(cache.known_total_count(), Some(22));
}

#[rstest]
fn empty_page_implies_nothing(mut cache: PageCache<usize>) {
    cache.observe_count(21);

    cache.insert_page(Page::new(9, Vec::new()));

    assert_eq!(cache.known_total_count(), Some(21));
}

#[rstest]
fn later_copy_of_a_page_replaces_earlier(mut cache: PageCache<usize>) {
    cache.insert_page(Page::new(1, vec![100]));
    cache.insert_page(Page::new(1, vec![3, 4, 5]));

    assert_eq!(cache.page(1).map(Page::items), Some(&[3, 4, 5][..]));
    assert_eq!(cache.len(), 1);
}

#[rstest]
fn stale_pages_need_fetching_until_reloaded(mut cache: PageCache<usize>) {
    cache.insert_page(page(2, 3));
    assert!(!cache.needs_fetch(2));

    cache.mark_stale(2);
    assert!(cache.needs_fetch(2));
    assert!(cache.is_resident(2), "stale pages stay resident");

    cache.insert_page(page(2, 3));
    assert!(!cache.needs_fetch(2));
}

#[rstest]
fn commit_keeps_failed_pages_and_drops_empty_ones(mut cache: PageCache<usize>) {
    cache.insert_page(page(0, 3));
    cache.insert_page(page(1, 3));

    cache.commit_pages(
        PageWindow::new(0, 3),
        vec![
            (0, PageFetch::Failed),
            (1, PageFetch::Empty),
            (2, PageFetch::Loaded(page(2, 2))),
        ],
        EvictionPolicy::WindowOnly,
    );

    assert_eq!(resident(&cache), vec![0, 2]);
    assert_eq!(cache.page(0), Some(&page(0, 3)));
}

#[rstest]
fn window_only_policy_evicts_everything_outside(mut cache: PageCache<usize>) {
    for index in 0..7 {
        cache.insert_page(page(index, 3));
    }

    cache.commit_pages(PageWindow::new(5, 9), Vec::new(), EvictionPolicy::WindowOnly);

    assert_eq!(resident(&cache), vec![5, 6]);
}

#[rstest]
fn retain_policy_evicts_farthest_pages_first(mut cache: PageCache<usize>) {
    for index in 0..10 {
        cache.insert_page(page(index, 3));
    }

    cache.evict(PageWindow::new(4, 6), EvictionPolicy::Retain { max_pages: 5 });

    assert_eq!(resident(&cache), vec![3, 4, 5, 6, 7]);
}

#[rstest]
fn retain_policy_never_evicts_window_pages(mut cache: PageCache<usize>) {
    for index in 0..6 {
        cache.insert_page(page(index, 3));
    }

    cache.evict(PageWindow::new(1, 5), EvictionPolicy::Retain { max_pages: 2 });

    assert_eq!(resident(&cache), vec![1, 2, 3, 4]);
}

#[rstest]
fn retain_policy_counts_window_pages_toward_the_budget(mut cache: PageCache<usize>) {
    for index in 0..6 {
        cache.insert_page(page(index, 3));
    }

    cache.evict(PageWindow::new(2, 4), EvictionPolicy::Retain { max_pages: 3 });

    assert_eq!(resident(&cache), vec![2, 3, 4]);
}

#[rstest]
fn eviction_clears_stale_marks_of_evicted_pages(mut cache: PageCache<usize>) {
    cache.insert_page(page(0, 3));
    cache.insert_page(page(4, 3));
    cache.mark_stale(0);

    cache.evict(PageWindow::new(4, 5), EvictionPolicy::WindowOnly);

    assert!(!cache.is_stale(0));
}

#[derive(Debug, Clone)]
enum Observation {
    Count(usize),
    PageLength { index: usize, len: usize },
}

fn observation() -> impl Strategy<Value = Observation> {
    prop_oneof![
        (0_usize..10_000).prop_map(Observation::Count),
        (0_usize..3_000, 0_usize..=3).prop_map(|(index, len)| Observation::PageLength { index, len }),
    ]
}

proptest! {
    #[test]
    fn known_count_never_decreases(observations in prop::collection::vec(observation(), 1..64)) {
        let mut cache: PageCache<usize> =
            PageCache::new(NonZeroUsize::new(3).expect("non-zero literal"));
        let mut previous: Option<usize> = None;

        for step in observations {
            match step {
                Observation::Count(count) => {
                    cache.observe_count(count);
                }
                Observation::PageLength { index, len } => {
                    cache.insert_page(Page::new(index, vec![0; len]));
                }
            }

            let current = cache.known_total_count();
            if let Some(before) = previous {
                prop_assert!(current.is_some_and(|now| now >= before));
            }
            previous = current.or(previous);
        }
    }
}
