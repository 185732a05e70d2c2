//! Support modules for viewport scrolling BDD tests.

pub(crate) mod state;

pub(crate) use state::ViewportState;
