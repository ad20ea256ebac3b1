//! fanout-core
//!
//! Building blocks for running a fixed set of HTTP workers concurrently and
//! joining on all of them.
//!
//! # Modules
//! - **domain**: ids, worker specs, per-worker and per-run reports
//! - **ports**: seams for the outside world (`Fetcher`, `ProgressSink`)
//! - **impls**: reqwest / tracing backed implementations of the ports
//! - **app**: worker group, ticker, runner builder and runner
//! - **config**: TOML configuration with defaults
//! - **error**: crate-level error type

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;

pub use app::{FanOutRunner, RunnerBuilder, Ticker, WorkerGroup};
pub use config::FanoutConfig;
pub use domain::{RunId, RunReport, WorkerId, WorkerOutcome, WorkerReport, WorkerSpec};
pub use error::FanoutError;
pub use ports::{FetchError, FetchResponse, Fetcher, ProgressEvent, ProgressSink};
