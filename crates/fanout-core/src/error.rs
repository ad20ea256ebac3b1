use thiserror::Error;

use crate::app::BuildError;
use crate::config::ConfigError;

/// Top-level error for setting up a run.
///
/// Failures *during* a run never surface here; they are recorded per worker
/// in [`crate::domain::WorkerOutcome`].
#[derive(Debug, Error)]
pub enum FanoutError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
