//! Scripted source for exercising races and failures in tests.
//!
//! Wraps a [`ListSource`] and lets a test delay or fail individual page
//! requests, or report oversized pages. Delays use `tokio::time`, so tests
//! running with paused time control completion order precisely.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::{ListSource, PagedSource, SourceError, Subscription};

#[derive(Debug, Default)]
struct Script {
    page_delays: HashMap<usize, Duration>,
    failing_pages: HashSet<usize>,
    oversized_pages: HashMap<usize, usize>,
    fail_total_count: bool,
    page_requests: Vec<usize>,
    total_count_requests: usize,
}

/// [`PagedSource`] whose page responses can be delayed, failed, or padded.
#[derive(Debug)]
pub struct ScriptedSource<T> {
    inner: ListSource<T>,
    script: Mutex<Script>,
}

impl<T> ScriptedSource<T> {
    /// Wraps an in-memory source.
    #[must_use]
    pub fn new(inner: ListSource<T>) -> Self {
        Self {
            inner,
            script: Mutex::new(Script::default()),
        }
    }

    /// Returns the wrapped source, e.g. to append items.
    #[must_use]
    pub const fn inner(&self) -> &ListSource<T> {
        &self.inner
    }

    /// Delays every response for `page_index` by `delay`.
    pub fn delay_page(&self, page_index: usize, delay: Duration) {
        self.with_script(|script| {
            script.page_delays.insert(page_index, delay);
        });
    }

    /// Makes requests for `page_index` fail until [`Self::heal_page`].
    pub fn fail_page(&self, page_index: usize) {
        self.with_script(|script| {
            script.failing_pages.insert(page_index);
        });
    }

    /// Lets requests for `page_index` succeed again.
    pub fn heal_page(&self, page_index: usize) {
        self.with_script(|script| {
            script.failing_pages.remove(&page_index);
        });
    }

    /// Pads responses for `page_index` with `extra` duplicated items.
    pub fn oversize_page(&self, page_index: usize, extra: usize) {
        self.with_script(|script| {
            script.oversized_pages.insert(page_index, extra);
        });
    }

    /// Controls whether `total_count` fails.
    pub fn fail_total_count(&self, fail: bool) {
        self.with_script(|script| script.fail_total_count = fail);
    }

    /// Returns every page index requested so far, in request order.
    #[must_use]
    pub fn page_requests(&self) -> Vec<usize> {
        self.with_script(|script| script.page_requests.clone())
    }

    /// Returns how many times `total_count` was called.
    #[must_use]
    pub fn total_count_requests(&self) -> usize {
        self.with_script(|script| script.total_count_requests)
    }

    fn with_script<R>(&self, action: impl FnOnce(&mut Script) -> R) -> R {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        action(&mut script)
    }
}

#[async_trait]
impl<T> PagedSource for ScriptedSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    async fn total_count(&self) -> Result<usize, SourceError> {
        let fail = self.with_script(|script| {
            script.total_count_requests += 1;
            script.fail_total_count
        });
        if fail {
            return Err(SourceError::Unavailable {
                message: "scripted total count failure".to_owned(),
            });
        }
        self.inner.total_count().await
    }

    fn page_size(&self) -> NonZeroUsize {
        self.inner.page_size()
    }

    async fn page_items(&self, page_index: usize) -> Result<Vec<T>, SourceError> {
        let delay = self.with_script(|script| {
            script.page_requests.push(page_index);
            script.page_delays.get(&page_index).copied()
        });
        if let Some(duration) = delay {
            tokio::time::sleep(duration).await;
        }

        let (fail, extra) = self.with_script(|script| {
            (
                script.failing_pages.contains(&page_index),
                script.oversized_pages.get(&page_index).copied(),
            )
        });
        if fail {
            return Err(SourceError::Unavailable {
                message: format!("scripted failure for page {page_index}"),
            });
        }

        let mut items = self.inner.page_items(page_index).await?;
        if let (Some(count), Some(first)) = (extra, items.first().cloned()) {
            items.extend(std::iter::repeat_n(first, count));
        }
        Ok(items)
    }

    fn subscribe(&self) -> Subscription {
        self.inner.subscribe()
    }
}
