//! Scenario state for viewport scrolling BDD tests.

use std::sync::Arc;

use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use smartlist::ViewportController;
use smartlist::source::test_support::ScriptedSource;

use crate::support::runtime::SharedRuntime;

/// Controller type driven by the scenarios.
pub(crate) type Controller = ViewportController<ScriptedSource<String>>;

/// State shared across steps in a viewport scenario.
#[derive(ScenarioState, Default)]
pub(crate) struct ViewportState {
    /// Runtime driving the controller's futures.
    pub(crate) runtime: Slot<SharedRuntime>,
    /// The data source under test.
    pub(crate) source: Slot<Arc<ScriptedSource<String>>>,
    /// Viewport height in pixels.
    pub(crate) viewport_height: Slot<u32>,
    /// Item height in pixels.
    pub(crate) item_height: Slot<u32>,
    /// The controller, once initialised.
    pub(crate) controller: Slot<Controller>,
}
