//! Domain model (ids, worker specs, reports).

pub mod ids;
pub mod report;
pub mod spec;

pub use ids::{RunId, WorkerId};
pub use report::{RunReport, WorkerOutcome, WorkerReport};
pub use spec::WorkerSpec;
