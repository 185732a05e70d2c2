//! Integration tests for overlapping fetch cycles driven through the
//! controller's two-phase API.

#![expect(clippy::expect_used, reason = "Test setup invariants")]

mod support;

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use rstest::rstest;
use smartlist::fetch::CommitOutcome;
use smartlist::source::SourceEvent;
use smartlist::source::test_support::ScriptedSource;
use smartlist::telemetry::{RecordingTelemetrySink, TelemetryEvent};
use smartlist::viewport::InitialLoad;
use smartlist::window::PageWindow;
use smartlist::{Viewport, ViewportController, ViewportOptions};
use support::titled_source;

const VIEWPORT: Viewport = Viewport::new(300, 600);

async fn initialised_controller(
    source: Arc<ScriptedSource<String>>,
    telemetry: Arc<RecordingTelemetrySink>,
) -> ViewportController<ScriptedSource<String>> {
    let options = ViewportOptions::new(NonZeroU32::new(24).expect("non-zero literal"))
        .with_initial_load(InitialLoad::VisibleWindow);
    let mut controller =
        ViewportController::new(source, options, telemetry).with_viewport(VIEWPORT);
    controller.initialize().await;
    controller
}

#[rstest]
#[case::newer_cycle_commits_first(true)]
#[case::stale_cycle_commits_first(false)]
#[tokio::test(start_paused = true)]
async fn slow_superseded_scroll_never_reaches_the_cache(#[case] newer_commits_first: bool) {
    let source = titled_source(90, 3);
    let telemetry = Arc::new(RecordingTelemetrySink::default());
    let mut controller = initialised_controller(Arc::clone(&source), Arc::clone(&telemetry)).await;
    assert_eq!(controller.visible_window(), PageWindow::new(0, 6));
    for page_index in 19..26 {
        source.delay_page(page_index, Duration::from_millis(50));
    }
    source.delay_page(6, Duration::from_millis(5));
    source.delay_page(7, Duration::from_millis(5));
    telemetry.take();

    let far = controller.begin_cycle(VIEWPORT.scrolled_to(1_500));
    let near = controller.begin_cycle(VIEWPORT.scrolled_to(200));
    assert_eq!(far.planned(), (19..26).collect::<Vec<_>>().as_slice());
    assert_eq!(near.planned(), &[6, 7]);

    let fetching = Arc::clone(controller.source());
    let (far_batch, near_batch) =
        tokio::join!(far.fetch(fetching.as_ref()), near.fetch(fetching.as_ref()));

    let (far_outcome, near_outcome) = if newer_commits_first {
        let near_outcome = controller.commit_cycle(near_batch);
        (controller.commit_cycle(far_batch), near_outcome)
    } else {
        let far_outcome = controller.commit_cycle(far_batch);
        (far_outcome, controller.commit_cycle(near_batch))
    };

    assert!(matches!(far_outcome, CommitOutcome::Discarded { .. }));
    assert!(near_outcome.is_committed());
    assert_eq!(controller.visible_window(), PageWindow::new(1, 8));
    assert_eq!(
        controller.cache().resident_indices().collect::<Vec<_>>(),
        (1..8).collect::<Vec<_>>()
    );
    assert!(
        controller
            .render_model()
            .items
            .iter()
            .all(|placed| placed.index < 24),
        "items from the superseded cycle must not be placed"
    );
    assert_eq!(
        telemetry
            .take()
            .iter()
            .filter(|event| matches!(event, TelemetryEvent::StaleCycleDiscarded { .. }))
            .count(),
        1
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn notification_during_a_slow_scroll_loads_the_scrolled_window() {
    let source = titled_source(90, 3);
    let telemetry = Arc::new(RecordingTelemetrySink::default());
    let mut controller = initialised_controller(Arc::clone(&source), Arc::clone(&telemetry)).await;
    for page_index in 19..26 {
        source.delay_page(page_index, Duration::from_millis(50));
    }
    telemetry.take();

    let scroll = controller.begin_cycle(VIEWPORT.scrolled_to(1_500));
    let scrolled_window = scroll.window();
    let fetching = Arc::clone(controller.source());
    let (scroll_batch, refresh) = tokio::join!(
        scroll.fetch(fetching.as_ref()),
        controller.handle_event(SourceEvent::PageChanged { page_index: 3 })
    );
    let scroll_outcome = controller.commit_cycle(scroll_batch);

    assert!(refresh.as_ref().is_some_and(CommitOutcome::is_committed));
    assert!(matches!(scroll_outcome, CommitOutcome::Discarded { .. }));
    assert_eq!(controller.viewport().scroll_offset, 1_500);
    assert_eq!(controller.visible_window(), scrolled_window);
    assert_eq!(
        controller.cache().resident_indices().collect::<Vec<_>>(),
        scrolled_window.iter().collect::<Vec<_>>()
    );
    assert!(
        controller
            .render_model()
            .items
            .iter()
            .all(|placed| placed.index >= 57),
        "only items of the scrolled window are placed"
    );
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn failed_page_is_retried_by_a_later_cycle() {
    let source = titled_source(21, 3);
    source.fail_page(1);
    let telemetry = Arc::new(RecordingTelemetrySink::default());
    let mut controller = initialised_controller(Arc::clone(&source), Arc::clone(&telemetry)).await;
    assert!(!controller.cache().is_resident(1));

    source.heal_page(1);
    let outcome = controller.scroll_to(24).await;

    assert!(outcome.is_committed());
    assert!(controller.cache().is_resident(1));
    assert!(telemetry.take().iter().any(|event| matches!(
        event,
        TelemetryEvent::PageFetchFailed { page_index: 1, .. }
    )));
}
