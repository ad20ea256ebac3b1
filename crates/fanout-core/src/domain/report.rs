//! Report model: what each worker did, and what the whole run did.
//!
//! Reports are plain data. They are produced by the worker group once every
//! worker has been joined, and are serializable so the CLI can print them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{RunId, WorkerId};

/// Terminal state of a worker.
///
/// Serialized with an internal `state` tag: COMPLETED / FAILED / PANICKED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerOutcome {
    /// Every planned request was issued and succeeded.
    Completed,

    /// The request at `iteration` failed; no later request was issued.
    Failed { iteration: u32, error: String },

    /// The worker task panicked or was aborted before it could report.
    Panicked { message: String },
}

impl WorkerOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, WorkerOutcome::Completed)
    }
}

/// Result of one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
    pub worker: WorkerId,
    pub name: String,
    pub url: String,

    /// Number of requests the worker was configured to issue.
    pub planned: u32,

    /// Number of requests that returned a successful response.
    pub completed: u32,

    pub outcome: WorkerOutcome,

    /// Status of the most recent successful response, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<u16>,

    /// Body length of the most recent successful response, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_body_len: Option<usize>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl WorkerReport {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Result of a whole run: one report per worker, in launch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    pub workers: Vec<WorkerReport>,
}

impl RunReport {
    /// True when every worker completed its full count.
    pub fn is_success(&self) -> bool {
        self.workers.iter().all(|w| w.outcome.is_completed())
    }

    pub fn failures(&self) -> impl Iterator<Item = &WorkerReport> {
        self.workers.iter().filter(|w| !w.outcome.is_completed())
    }

    /// Successful requests across all workers.
    pub fn total_calls(&self) -> u64 {
        self.workers.iter().map(|w| u64::from(w.completed)).sum()
    }

    pub fn worker(&self, name: &str) -> Option<&WorkerReport> {
        self.workers.iter().find(|w| w.name == name)
    }
}
