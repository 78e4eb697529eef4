//! Logging sinks observed by [`Deferred::tap_ok`](super::Deferred::tap_ok).

use std::fmt;

/// A sink that records labelled values produced by a pipeline.
pub trait LogSink: Send + Sync {
    /// Records `value` under `label`.
    fn record(&self, label: &str, value: &dyn fmt::Debug);
}

/// Sink that drops every value.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogSink;

impl LogSink for NoopLogSink {
    fn record(&self, _label: &str, _value: &dyn fmt::Debug) {}
}

/// Emits each value as a `tracing` event at `INFO` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn record(&self, label: &str, value: &dyn fmt::Debug) {
        tracing::info!(target: "tanuki::pipeline", label, value = ?value);
    }
}

/// Keeps every recorded entry in memory as `(label, debug rendering)`.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct RecordingLogSink {
    entries: std::sync::Mutex<Vec<(String, String)>>,
}

#[cfg(any(test, feature = "test-support"))]
impl RecordingLogSink {
    /// Returns a snapshot of the recorded entries.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Returns the labels recorded so far, in order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.entries().into_iter().map(|(label, _)| label).collect()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl LogSink for RecordingLogSink {
    fn record(&self, label: &str, value: &dyn fmt::Debug) {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((label.to_owned(), format!("{value:?}")));
    }
}
