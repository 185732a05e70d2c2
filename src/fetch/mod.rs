//! Race-safe retrieval of the pages a window needs.
//!
//! Each window change starts a fetch cycle identified by a [`FetchToken`].
//! A cycle runs in two halves: [`FetchCycle::fetch`] talks to the source
//! and borrows nothing from the cache, then [`FetchCoordinator::commit`]
//! merges the results, but only if no newer cycle has started in between.
//! A superseded cycle is dropped whole; nothing is aborted mid-flight.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use crate::cache::{EvictionPolicy, Page, PageCache, PageFetch};
use crate::source::{PagedSource, SourceError};
use crate::telemetry::{TelemetryEvent, TelemetrySink};
use crate::window::PageWindow;

/// Generation number of a fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct FetchToken(u64);

impl FetchToken {
    /// Returns the raw generation number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Result of offering a fetched batch for commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The batch was merged into the cache.
    Committed {
        /// Token of the committed cycle.
        token: FetchToken,
        /// Window the cycle was computed for.
        window: PageWindow,
        /// Pages resident after the merge.
        resident_pages: usize,
    },
    /// A newer cycle started first; nothing was merged.
    Discarded {
        /// Token of the dropped cycle.
        token: FetchToken,
        /// Token of the newest cycle at commit time.
        superseded_by: FetchToken,
    },
}

impl CommitOutcome {
    /// Returns true when the batch was merged.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Allocates fetch tokens and guards commits against stale cycles.
#[derive(Debug, Default)]
pub struct FetchCoordinator {
    latest: FetchToken,
}

impl FetchCoordinator {
    /// Creates a coordinator that has not started any cycle.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: FetchToken(0),
        }
    }

    /// Returns the token of the newest cycle.
    #[must_use]
    pub const fn latest(&self) -> FetchToken {
        self.latest
    }

    /// Returns true when `token` belongs to the newest cycle.
    #[must_use]
    pub fn is_current(&self, token: FetchToken) -> bool {
        token == self.latest
    }

    /// Starts a cycle, superseding every cycle started before it.
    ///
    /// `window` is the visible window the cycle serves and `wanted` the
    /// pages it must leave resident (usually the same range). Only pages
    /// that are missing from `cache` or marked stale are requested.
    pub fn begin<T>(
        &mut self,
        window: PageWindow,
        wanted: PageWindow,
        cache: &PageCache<T>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> FetchCycle {
        self.latest = self.latest.next();
        let planned = wanted
            .iter()
            .filter(|page_index| cache.needs_fetch(*page_index))
            .collect();

        FetchCycle {
            token: self.latest,
            window,
            wanted,
            planned,
            page_size: cache.page_size(),
            telemetry,
        }
    }

    /// Merges a batch if its cycle is still the newest one.
    ///
    /// The merge is all-or-nothing: a superseded batch leaves `cache`
    /// untouched.
    pub fn commit<T>(
        &self,
        batch: FetchedBatch<T>,
        cache: &mut PageCache<T>,
        policy: EvictionPolicy,
    ) -> CommitOutcome {
        let FetchedBatch {
            token,
            window,
            wanted,
            results,
            telemetry,
        } = batch;

        if !self.is_current(token) {
            tracing::debug!(
                "discarding fetch cycle {} superseded by {}",
                token.get(),
                self.latest.get()
            );
            telemetry.record(TelemetryEvent::StaleCycleDiscarded {
                token: token.get(),
                current: self.latest.get(),
            });
            return CommitOutcome::Discarded {
                token,
                superseded_by: self.latest,
            };
        }

        cache.commit_pages(wanted, results, policy);
        let resident_pages = cache.len();
        tracing::debug!(
            "committed fetch cycle {} with {resident_pages} resident pages",
            token.get()
        );
        telemetry.record(TelemetryEvent::CycleCommitted {
            token: token.get(),
            resident_pages,
        });

        CommitOutcome::Committed {
            token,
            window,
            resident_pages,
        }
    }
}

/// A started fetch cycle, ready to query the source.
pub struct FetchCycle {
    token: FetchToken,
    window: PageWindow,
    wanted: PageWindow,
    planned: Vec<usize>,
    page_size: NonZeroUsize,
    telemetry: Arc<dyn TelemetrySink>,
}

impl FetchCycle {
    /// Returns the cycle's token.
    #[must_use]
    pub const fn token(&self) -> FetchToken {
        self.token
    }

    /// Returns the visible window the cycle serves.
    #[must_use]
    pub const fn window(&self) -> PageWindow {
        self.window
    }

    /// Returns the pages the cycle leaves resident.
    #[must_use]
    pub const fn wanted(&self) -> PageWindow {
        self.wanted
    }

    /// Returns the page indices the cycle will request.
    #[must_use]
    pub fn planned(&self) -> &[usize] {
        &self.planned
    }

    /// Requests every planned page concurrently on the current task.
    ///
    /// Failed requests are reported and recorded as [`PageFetch::Failed`];
    /// the remaining pages still complete.
    pub async fn fetch<S>(self, source: &S) -> FetchedBatch<S::Item>
    where
        S: PagedSource + ?Sized,
    {
        let Self {
            token,
            window,
            wanted,
            planned,
            page_size,
            telemetry,
        } = self;

        let requests = planned.into_iter().map(|page_index| async move {
            (page_index, source.page_items(page_index).await)
        });
        let results = join_all(requests)
            .await
            .into_iter()
            .map(|(page_index, response)| {
                let settled = settle_page(page_index, response, page_size, telemetry.as_ref());
                (page_index, settled)
            })
            .collect();

        FetchedBatch {
            token,
            window,
            wanted,
            results,
            telemetry,
        }
    }
}

impl fmt::Debug for FetchCycle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FetchCycle")
            .field("token", &self.token)
            .field("window", &self.window)
            .field("wanted", &self.wanted)
            .field("planned", &self.planned)
            .finish_non_exhaustive()
    }
}

/// Results of a fetch cycle awaiting [`FetchCoordinator::commit`].
pub struct FetchedBatch<T> {
    token: FetchToken,
    window: PageWindow,
    wanted: PageWindow,
    results: Vec<(usize, PageFetch<T>)>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl<T> FetchedBatch<T> {
    /// Returns the token of the cycle that produced the batch.
    #[must_use]
    pub const fn token(&self) -> FetchToken {
        self.token
    }

    /// Returns the per-page results in request order.
    #[must_use]
    pub fn results(&self) -> &[(usize, PageFetch<T>)] {
        &self.results
    }
}

impl<T: fmt::Debug> fmt::Debug for FetchedBatch<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FetchedBatch")
            .field("token", &self.token)
            .field("window", &self.window)
            .field("wanted", &self.wanted)
            .field("results", &self.results)
            .finish_non_exhaustive()
    }
}

/// Turns one `page_items` response into a cache merge instruction.
///
/// Oversized pages are truncated to `page_size` and reported; failures are
/// reported and become [`PageFetch::Failed`].
pub(crate) fn settle_page<T>(
    page_index: usize,
    response: Result<Vec<T>, SourceError>,
    page_size: NonZeroUsize,
    telemetry: &dyn TelemetrySink,
) -> PageFetch<T> {
    match response {
        Ok(items) if items.is_empty() => PageFetch::Empty,
        Ok(mut items) => {
            let reported_len = items.len();
            if reported_len > page_size.get() {
                tracing::warn!(
                    "page {page_index} returned {reported_len} items, more than the page size of {page_size}; truncating"
                );
                telemetry.record(TelemetryEvent::PageLengthExceeded {
                    page_index,
                    reported_len,
                    page_size: page_size.get(),
                });
                items.truncate(page_size.get());
            }
            PageFetch::Loaded(Page::new(page_index, items))
        }
        Err(error) => {
            tracing::warn!("failed to fetch page {page_index}: {error}");
            telemetry.record(TelemetryEvent::PageFetchFailed {
                page_index,
                message: error.to_string(),
            });
            PageFetch::Failed
        }
    }
}
