//! App - wiring the ports into a run.
//!
//! # Components
//! - **WorkerGroup**: spawn K workers, then barrier-join all of them
//! - **Ticker**: the controlling flow's own bounded wait loop
//! - **RunnerBuilder**: fail-fast validation of a run's configuration
//! - **FanOutRunner**: spawn, tick, join, report

pub mod builder;
pub mod runner;
pub mod ticker;
pub mod worker;

pub use self::builder::{BuildError, RunnerBuilder};
pub use self::runner::FanOutRunner;
pub use self::ticker::Ticker;
pub use self::worker::WorkerGroup;
