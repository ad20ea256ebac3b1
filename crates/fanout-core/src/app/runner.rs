//! FanOutRunner - 1 回の run の表面
//!
//! # 流れ
//! spawn → tick → join → `RunReport`

use std::sync::Arc;

use tracing::Instrument;

use super::builder::RunnerBuilder;
use super::ticker::Ticker;
use super::worker::WorkerGroup;
use crate::config::FanoutConfig;
use crate::domain::{RunId, RunReport, WorkerSpec};
use crate::error::FanoutError;
use crate::impls::{HttpFetcher, TracingProgress};
use crate::ports::{Fetcher, ProgressSink};

/// Fan-out runner: spawn every worker, tick, then join on all of them.
///
/// `run()` only returns once every worker has finished its full count or
/// failed. Build one with [`RunnerBuilder`] or [`FanOutRunner::from_config`].
pub struct FanOutRunner {
    workers: Vec<WorkerSpec>,
    fetcher: Arc<dyn Fetcher>,
    progress: Arc<dyn ProgressSink>,
    ticker: Ticker,
}

impl FanOutRunner {
    pub(crate) fn new(
        workers: Vec<WorkerSpec>,
        fetcher: Arc<dyn Fetcher>,
        progress: Arc<dyn ProgressSink>,
        ticker: Ticker,
    ) -> Self {
        Self {
            workers,
            fetcher,
            progress,
            ticker,
        }
    }

    /// Runner wired to the real network, logging progress through `tracing`.
    pub fn from_config(config: &FanoutConfig) -> Result<Self, FanoutError> {
        let fetcher = HttpFetcher::new(config.request_timeout()).map_err(FanoutError::HttpClient)?;
        let runner = RunnerBuilder::new()
            .workers(config.workers.iter().cloned())
            .fetcher(Arc::new(fetcher))
            .progress(Arc::new(TracingProgress))
            .ticker(config.ticker())
            .build()?;
        Ok(runner)
    }

    pub fn workers(&self) -> &[WorkerSpec] {
        &self.workers
    }

    pub fn ticker(&self) -> Ticker {
        self.ticker
    }

    pub async fn run(&self) -> RunReport {
        let run_id = RunId::new();
        let span = tracing::info_span!("run", run = %run_id);

        async {
            tracing::info!(workers = self.workers.len(), "starting run");

            let group = WorkerGroup::spawn(
                run_id,
                &self.workers,
                Arc::clone(&self.fetcher),
                Arc::clone(&self.progress),
            );

            // Independent of the workers; they keep running while we tick.
            self.ticker.run(self.progress.as_ref()).await;

            let report = RunReport {
                run_id,
                workers: group.join().await,
            };

            if report.is_success() {
                tracing::info!(calls = report.total_calls(), "run finished");
            } else {
                tracing::warn!(
                    calls = report.total_calls(),
                    failed = report.failures().count(),
                    "run finished with failures"
                );
            }
            report
        }
        .instrument(span)
        .await
    }
}
