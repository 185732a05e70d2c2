//! The scrollable viewport over a paged source.
//!
//! [`ViewportController`] wires the pieces together: it subscribes to the
//! source, discovers the total count, turns every scroll or resize into a
//! token-guarded fetch cycle, reacts to change notifications, and exposes
//! the current [`RenderModel`].
//!
//! All methods take `&mut self` and run on the caller's task. Hosts that
//! need to keep handling input while pages load can split a cycle with
//! [`ViewportController::begin_cycle`] and
//! [`ViewportController::commit_cycle`]; a cycle begun later always wins.

use std::num::{NonZeroU32, NonZeroU64};
use std::sync::Arc;

use serde::Serialize;

use crate::cache::{EvictionPolicy, PageCache};
use crate::fetch::{CommitOutcome, FetchCoordinator, FetchCycle, FetchedBatch};
use crate::geometry::{DEFAULT_MAX_ELEMENT_HEIGHT, GeometryProjector, Pixels};
use crate::source::{PagedSource, SourceEvent, Subscription};
use crate::telemetry::{TelemetryEvent, TelemetrySink};
use crate::window::{DEFAULT_LOOKAHEAD_PAGES, PageWindow, WindowRequest, required_pages};

mod render;

pub use render::{ContainerSize, PlacedItem, RenderModel, project_render_model};

/// Which pages the first cycle after count discovery loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialLoad {
    /// Every page covering the known count, plus the visible window.
    #[default]
    FullRange,
    /// Only the pages the viewport needs.
    VisibleWindow,
}

/// Tunables for a [`ViewportController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportOptions {
    item_height: NonZeroU32,
    lookahead_page_count: usize,
    max_element_height: NonZeroU64,
    eviction: EvictionPolicy,
    initial_load: InitialLoad,
}

impl ViewportOptions {
    /// Creates options for items of `item_height` pixels with defaults for
    /// everything else.
    #[must_use]
    pub const fn new(item_height: NonZeroU32) -> Self {
        Self {
            item_height,
            lookahead_page_count: DEFAULT_LOOKAHEAD_PAGES,
            max_element_height: DEFAULT_MAX_ELEMENT_HEIGHT,
            eviction: EvictionPolicy::WindowOnly,
            initial_load: InitialLoad::FullRange,
        }
    }

    /// Sets how many pages to keep on each side of the visible pages.
    #[must_use]
    pub const fn with_lookahead(mut self, lookahead_page_count: usize) -> Self {
        self.lookahead_page_count = lookahead_page_count;
        self
    }

    /// Sets the ceiling for a single filler block.
    #[must_use]
    pub const fn with_max_element_height(mut self, max_element_height: NonZeroU64) -> Self {
        self.max_element_height = max_element_height;
        self
    }

    /// Sets the eviction policy applied after every committed cycle.
    #[must_use]
    pub const fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    /// Sets which pages the initial load fetches.
    #[must_use]
    pub const fn with_initial_load(mut self, initial_load: InitialLoad) -> Self {
        self.initial_load = initial_load;
        self
    }

    /// Fixed item height.
    #[must_use]
    pub const fn item_height(&self) -> NonZeroU32 {
        self.item_height
    }

    /// Pages kept on each side of the visible pages.
    #[must_use]
    pub const fn lookahead_page_count(&self) -> usize {
        self.lookahead_page_count
    }

    /// Ceiling for a single filler block.
    #[must_use]
    pub const fn max_element_height(&self) -> NonZeroU64 {
        self.max_element_height
    }

    /// Eviction policy.
    #[must_use]
    pub const fn eviction(&self) -> EvictionPolicy {
        self.eviction
    }

    /// Initial load strategy.
    #[must_use]
    pub const fn initial_load(&self) -> InitialLoad {
        self.initial_load
    }
}

/// Scroll position and size of the visible area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Viewport {
    /// Offset of the top edge; negative while overscrolling.
    pub scroll_offset: i64,
    /// Visible height.
    pub height: u32,
    /// Visible width.
    pub width: u32,
}

impl Viewport {
    /// Creates a viewport scrolled to the top.
    #[must_use]
    pub const fn new(height: u32, width: u32) -> Self {
        Self {
            scroll_offset: 0,
            height,
            width,
        }
    }

    /// Returns a copy scrolled to `scroll_offset`.
    #[must_use]
    pub const fn scrolled_to(self, scroll_offset: i64) -> Self {
        Self {
            scroll_offset,
            ..self
        }
    }
}

/// Lifecycle of a [`ViewportController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerPhase {
    /// The total count has not been determined yet.
    Uninitialized,
    /// The count is known but no cycle has committed.
    CountKnown,
    /// At least one cycle has committed.
    Steady,
}

/// Drives a lazily-paged, virtualised list over one [`PagedSource`].
pub struct ViewportController<S: PagedSource> {
    source: Arc<S>,
    options: ViewportOptions,
    geometry: GeometryProjector,
    cache: PageCache<S::Item>,
    coordinator: FetchCoordinator,
    viewport: Viewport,
    visible_window: PageWindow,
    requested_window: PageWindow,
    phase: ControllerPhase,
    subscription: Option<Subscription>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl<S: PagedSource> ViewportController<S> {
    /// Creates a controller; nothing is fetched until
    /// [`Self::initialize`].
    #[must_use]
    pub fn new(source: Arc<S>, options: ViewportOptions, telemetry: Arc<dyn TelemetrySink>) -> Self {
        let page_size = source.page_size();
        Self {
            source,
            options,
            geometry: GeometryProjector::new(options.item_height, options.max_element_height),
            cache: PageCache::new(page_size),
            coordinator: FetchCoordinator::new(),
            viewport: Viewport::default(),
            visible_window: PageWindow::empty(),
            requested_window: PageWindow::empty(),
            phase: ControllerPhase::Uninitialized,
            subscription: None,
            telemetry,
        }
    }

    /// Sets the viewport the first cycle will use, without fetching.
    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Returns the data source.
    #[must_use]
    pub const fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Returns the options the controller was built with.
    #[must_use]
    pub const fn options(&self) -> &ViewportOptions {
        &self.options
    }

    /// Returns the layout projector.
    #[must_use]
    pub const fn geometry(&self) -> &GeometryProjector {
        &self.geometry
    }

    /// Returns the page cache.
    #[must_use]
    pub const fn cache(&self) -> &PageCache<S::Item> {
        &self.cache
    }

    /// Returns the current viewport.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Returns the window of the last committed cycle.
    #[must_use]
    pub const fn visible_window(&self) -> PageWindow {
        self.visible_window
    }

    /// Returns the window of the most recently begun cycle, committed or
    /// not.
    #[must_use]
    pub const fn requested_window(&self) -> PageWindow {
        self.requested_window
    }

    /// Returns the lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> ControllerPhase {
        self.phase
    }

    /// Returns the known total count.
    #[must_use]
    pub const fn known_total_count(&self) -> Option<usize> {
        self.cache.known_total_count()
    }

    /// Returns true while the controller holds a source subscription.
    #[must_use]
    pub const fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Subscribes to the source, discovers the total count, and runs the
    /// initial load.
    ///
    /// A failed count request leaves the controller
    /// [`ControllerPhase::Uninitialized`]; calling again retries.
    pub async fn initialize(&mut self) -> ControllerPhase {
        if self.subscription.is_none() {
            self.subscription = Some(self.source.subscribe());
        }

        let Some(count) = self.recount().await else {
            return self.phase;
        };

        let window = self.window_for(self.viewport);
        let wanted = match self.options.initial_load {
            InitialLoad::FullRange => {
                PageWindow::covering_items(count, self.cache.page_size()).hull(window)
            }
            InitialLoad::VisibleWindow => window,
        };
        tracing::debug!("initial load of pages {}..{}", wanted.start(), wanted.end());
        self.run_cycle(wanted).await;
        self.phase
    }

    /// Requests the total count again and merges it into the known count.
    ///
    /// Returns the known count afterwards, or `None` when the request
    /// failed and no count was ever observed.
    pub async fn recount(&mut self) -> Option<usize> {
        match self.source.total_count().await {
            Ok(count) => {
                self.observe_count(count);
            }
            Err(error) => {
                tracing::warn!("failed to fetch total count: {error}");
                self.telemetry.record(TelemetryEvent::TotalCountFetchFailed {
                    message: error.to_string(),
                });
            }
        }
        self.cache.known_total_count()
    }

    /// Moves or resizes the viewport and loads the pages it needs.
    pub async fn set_viewport(&mut self, viewport: Viewport) -> CommitOutcome {
        let cycle = self.begin_cycle(viewport);
        let batch = cycle.fetch(self.source.as_ref()).await;
        self.commit_cycle(batch)
    }

    /// Scrolls to `scroll_offset`, keeping the current size.
    pub async fn scroll_to(&mut self, scroll_offset: i64) -> CommitOutcome {
        self.set_viewport(self.viewport.scrolled_to(scroll_offset))
            .await
    }

    /// Resizes the viewport, keeping the scroll offset.
    pub async fn resize(&mut self, height: u32, width: u32) -> CommitOutcome {
        self.set_viewport(Viewport {
            height,
            width,
            ..self.viewport
        })
        .await
    }

    /// Records `viewport` and starts a cycle for its window without
    /// awaiting the source.
    ///
    /// Run the returned cycle with [`FetchCycle::fetch`] against
    /// [`Self::source`] and hand the batch to [`Self::commit_cycle`].
    /// Starting another cycle first makes this one stale.
    pub fn begin_cycle(&mut self, viewport: Viewport) -> FetchCycle {
        self.viewport = viewport;
        let window = self.window_for(viewport);
        self.start_cycle(window)
    }

    /// Merges a fetched batch unless a newer cycle has started.
    pub fn commit_cycle(&mut self, batch: FetchedBatch<S::Item>) -> CommitOutcome {
        let outcome = self
            .coordinator
            .commit(batch, &mut self.cache, self.options.eviction);
        if let CommitOutcome::Committed { window, .. } = outcome {
            self.visible_window = window;
            if self.cache.known_total_count().is_some() {
                self.phase = ControllerPhase::Steady;
            }
        }
        outcome
    }

    /// Applies one change notification.
    ///
    /// A changed page inside the committed or the requested window is
    /// refetched straight away and the resulting outcome returned. The
    /// refresh covers the requested window, so it also serves a scroll whose
    /// own cycle it supersedes. A changed page elsewhere is only marked stale
    /// and reloaded when it next enters the window.
    pub async fn handle_event(&mut self, event: SourceEvent) -> Option<CommitOutcome> {
        match event {
            SourceEvent::TotalCountChanged { new_total_count } => {
                self.observe_count(new_total_count);
                None
            }
            SourceEvent::PageChanged { page_index } => {
                if self.visible_window.contains(page_index)
                    || self.requested_window.contains(page_index)
                {
                    self.cache.mark_stale(page_index);
                    Some(self.run_cycle(self.requested_window).await)
                } else {
                    if self.cache.is_resident(page_index) {
                        self.cache.mark_stale(page_index);
                    }
                    None
                }
            }
        }
    }

    /// Applies every notification already queued and returns how many
    /// were handled.
    pub async fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self
            .subscription
            .as_mut()
            .and_then(Subscription::try_recv)
        {
            self.handle_event(event).await;
            handled += 1;
        }
        handled
    }

    /// Waits for the next notification without applying it.
    ///
    /// Returns `None` when not subscribed. Suited to a host `select!` loop
    /// that then calls [`Self::handle_event`].
    pub async fn next_event(&mut self) -> Option<SourceEvent> {
        match self.subscription.as_mut() {
            Some(subscription) => subscription.recv().await,
            None => None,
        }
    }

    /// Projects the cache into a render model for the current viewport.
    #[must_use]
    pub fn render_model(&self) -> RenderModel<S::Item> {
        let container = ContainerSize {
            height: Pixels::new(u64::from(self.viewport.height)),
            width: Pixels::new(u64::from(self.viewport.width)),
        };
        project_render_model(&self.cache, &self.geometry, container)
    }

    /// Releases the source subscription.
    pub fn shutdown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    fn observe_count(&mut self, count: usize) {
        self.cache.observe_count(count);
        if self.phase == ControllerPhase::Uninitialized {
            self.phase = ControllerPhase::CountKnown;
        }
    }

    fn window_for(&self, viewport: Viewport) -> PageWindow {
        required_pages(WindowRequest {
            scroll_offset: viewport.scroll_offset,
            viewport_height: viewport.height,
            item_height: self.options.item_height,
            page_size: self.cache.page_size(),
            lookahead: self.options.lookahead_page_count,
        })
    }

    fn start_cycle(&mut self, window: PageWindow) -> FetchCycle {
        self.requested_window = window;
        self.coordinator
            .begin(window, window, &self.cache, Arc::clone(&self.telemetry))
    }

    async fn run_cycle(&mut self, window: PageWindow) -> CommitOutcome {
        let cycle = self.start_cycle(window);
        let batch = cycle.fetch(self.source.as_ref()).await;
        self.commit_cycle(batch)
    }
}

impl<S: PagedSource> std::fmt::Debug for ViewportController<S> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ViewportController")
            .field("options", &self.options)
            .field("viewport", &self.viewport)
            .field("visible_window", &self.visible_window)
            .field("requested_window", &self.requested_window)
            .field("phase", &self.phase)
            .field("known_total_count", &self.cache.known_total_count())
            .field("resident_pages", &self.cache.len())
            .finish_non_exhaustive()
    }
}
