//! Progress port - observability decoupled from control flow.

use crate::domain::WorkerId;

/// Something worth reporting while a run is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    WorkerStarted {
        worker: WorkerId,
        name: String,
        url: String,
        repeat: u32,
    },

    /// Emitted right before request number `iteration` (0-based) is sent.
    Request {
        worker: WorkerId,
        name: String,
        iteration: u32,
    },

    WorkerFinished {
        worker: WorkerId,
        name: String,
        calls: u32,
        last_status: Option<u16>,
    },

    WorkerFailed {
        worker: WorkerId,
        name: String,
        iteration: u32,
        error: String,
    },

    /// One tick of the controlling flow's own wait loop.
    Tick { tick: u32 },
}

/// Receives progress events. Called from several workers concurrently.
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}
