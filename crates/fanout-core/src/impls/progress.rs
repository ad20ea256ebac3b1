//! Progress sinks.

use crate::ports::{ProgressEvent, ProgressSink};

/// Logs every event through `tracing` with structured fields.
///
/// Lifecycle, per-request and tick events go to INFO; failures go to WARN.
/// Filtering below INFO hides the per-request chatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn on_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::WorkerStarted {
                worker,
                name,
                url,
                repeat,
            } => {
                tracing::info!(%worker, %name, %url, repeat, "worker started");
            }
            ProgressEvent::Request {
                worker,
                name,
                iteration,
            } => {
                tracing::info!(%worker, %name, iteration, "sending request");
            }
            ProgressEvent::WorkerFinished {
                worker,
                name,
                calls,
                last_status,
            } => {
                tracing::info!(%worker, %name, calls, ?last_status, "worker finished");
            }
            ProgressEvent::WorkerFailed {
                worker,
                name,
                iteration,
                error,
            } => {
                tracing::warn!(%worker, %name, iteration, %error, "worker failed");
            }
            ProgressEvent::Tick { tick } => {
                tracing::info!(tick, "tick");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_event(&self, _event: &ProgressEvent) {}
}
