//! Diagnostic telemetry events and sinks.
//!
//! The engine absorbs every data-source failure locally. Those failures,
//! contract violations by sources, and superseded fetch cycles are still
//! worth observing, so the engine reports them as structured events to a
//! caller-supplied sink.

use std::io;

use serde::{Deserialize, Serialize};

/// A structured telemetry event emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A page request failed; the page stays a hole or keeps its old copy.
    PageFetchFailed {
        /// Page whose request failed.
        page_index: usize,
        /// Error reported by the source.
        message: String,
    },
    /// A total count request failed; the previous count is retained.
    TotalCountFetchFailed {
        /// Error reported by the source.
        message: String,
    },
    /// A source returned more items than its page size; the page was
    /// truncated.
    PageLengthExceeded {
        /// Page that was too long.
        page_index: usize,
        /// Number of items the source returned.
        reported_len: usize,
        /// The source's declared page size.
        page_size: usize,
    },
    /// A fetch cycle finished after a newer one began; its results were
    /// dropped.
    StaleCycleDiscarded {
        /// Token of the discarded cycle.
        token: u64,
        /// Token of the cycle that superseded it.
        current: u64,
    },
    /// A fetch cycle's results were merged into the cache.
    CycleCommitted {
        /// Token of the committed cycle.
        token: u64,
        /// Number of pages resident after the merge.
        resident_pages: usize,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Records telemetry events to stderr as JSON lines (JSONL).
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        let _ignored = writeln_stderr(&serialised);
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}

/// Sink that keeps every event in memory, for assertions in tests.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct RecordingTelemetrySink {
    events: std::sync::Mutex<Vec<TelemetryEvent>>,
}

#[cfg(any(test, feature = "test-support"))]
impl RecordingTelemetrySink {
    /// Removes and returns every event recorded so far.
    #[must_use]
    pub fn take(&self) -> Vec<TelemetryEvent> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .drain(..)
            .collect()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl TelemetrySink for RecordingTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(event);
    }
}
