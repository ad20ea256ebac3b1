//! Ticker - fixed-count, fixed-interval wait loop.
//!
//! Runs on the controlling flow while workers are busy. It neither gates the
//! workers nor waits for them.

use std::time::Duration;

use crate::ports::{ProgressEvent, ProgressSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticker {
    ticks: u32,
    interval: Duration,
}

impl Ticker {
    pub fn new(ticks: u32, interval: Duration) -> Self {
        Self { ticks, interval }
    }

    /// A ticker that returns immediately without emitting anything.
    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn is_disabled(&self) -> bool {
        self.ticks == 0
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Sleep `interval`, emit tick `n`, repeat `ticks` times.
    pub async fn run(&self, progress: &dyn ProgressSink) {
        for tick in 0..self.ticks {
            tokio::time::sleep(self.interval).await;
            progress.on_event(&ProgressEvent::Tick { tick });
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::disabled()
    }
}
