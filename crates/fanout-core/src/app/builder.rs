//! RunnerBuilder - assembling and validating a run.
//!
//! # Fail-fast 設計
//! - Everything that can be checked before spawning is checked in `build()`
//! - A misconfigured run fails before any request goes out
//!
//! # チェック内容
//! - at least one worker
//! - unique worker names
//! - absolute http/https URLs
//! - a fetcher is set (progress and ticker have defaults)

use std::collections::HashSet;
use std::sync::Arc;

use reqwest::Url;

use super::runner::FanOutRunner;
use super::ticker::Ticker;
use crate::domain::WorkerSpec;
use crate::impls::NoopProgress;
use crate::ports::{Fetcher, ProgressSink};

/// BuildError is returned by [`RunnerBuilder::build`].
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no workers configured")]
    NoWorkers,

    #[error("worker name '{0}' is used more than once")]
    DuplicateWorker(String),

    #[error("worker '{name}' has an invalid url '{url}': {reason}")]
    InvalidUrl {
        name: String,
        url: String,
        reason: String,
    },

    #[error("no fetcher configured")]
    MissingFetcher,
}

/// Builds a [`FanOutRunner`].
///
/// ```ignore
/// let runner = RunnerBuilder::new()
///     .worker(WorkerSpec::new("date", "http://date.jsontest.com", 50))
///     .worker(WorkerSpec::new("headers", "http://headers.jsontest.com", 30))
///     .fetcher(Arc::new(HttpFetcher::new(None)?))
///     .build()?;
/// ```
pub struct RunnerBuilder {
    workers: Vec<WorkerSpec>,
    fetcher: Option<Arc<dyn Fetcher>>,
    progress: Option<Arc<dyn ProgressSink>>,
    ticker: Ticker,
}

impl RunnerBuilder {
    pub fn new() -> Self {
        Self {
            workers: Vec::new(),
            fetcher: None,
            progress: None,
            ticker: Ticker::disabled(),
        }
    }

    pub fn worker(mut self, spec: WorkerSpec) -> Self {
        self.workers.push(spec);
        self
    }

    pub fn workers(mut self, specs: impl IntoIterator<Item = WorkerSpec>) -> Self {
        self.workers.extend(specs);
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Defaults to [`NoopProgress`] when not set.
    pub fn progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Defaults to [`Ticker::disabled`] when not set.
    pub fn ticker(mut self, ticker: Ticker) -> Self {
        self.ticker = ticker;
        self
    }

    pub fn build(self) -> Result<FanOutRunner, BuildError> {
        if self.workers.is_empty() {
            return Err(BuildError::NoWorkers);
        }

        let mut seen = HashSet::new();
        for spec in &self.workers {
            if !seen.insert(spec.name.as_str()) {
                return Err(BuildError::DuplicateWorker(spec.name.clone()));
            }
            validate_url(spec)?;
        }

        let fetcher = self.fetcher.ok_or(BuildError::MissingFetcher)?;
        let progress = self
            .progress
            .unwrap_or_else(|| Arc::new(NoopProgress) as Arc<dyn ProgressSink>);

        Ok(FanOutRunner::new(self.workers, fetcher, progress, self.ticker))
    }
}

impl Default for RunnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_url(spec: &WorkerSpec) -> Result<(), BuildError> {
    let invalid = |reason: String| BuildError::InvalidUrl {
        name: spec.name.clone(),
        url: spec.url.clone(),
        reason,
    };

    let url = Url::parse(&spec.url).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}
