//! Worker specification: what one worker fetches and how many times.

use serde::{Deserialize, Serialize};

/// Configuration of one worker.
///
/// The worker issues exactly `repeat` sequential GET requests to `url`.
/// `repeat = 0` is allowed and yields a worker that completes immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSpec {
    /// Human-readable label, unique within a run.
    pub name: String,
    pub url: String,
    pub repeat: u32,
}

impl WorkerSpec {
    pub fn new(name: impl Into<String>, url: impl Into<String>, repeat: u32) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            repeat,
        }
    }
}
