//! Fetcher port - one blocking-from-the-caller's-view HTTP GET.

use async_trait::async_trait;
use thiserror::Error;

/// The part of a response a worker keeps around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Parse the body as JSON (the test endpoints answer with JSON objects).
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Why a single GET failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// DNS, connect, timeout, or body read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("unexpected status {status}")]
    Status { status: u16 },
}

/// Issues one GET request and waits for the full response.
///
/// Implementations must be shareable across workers (`Send + Sync`); a worker
/// never has two calls in flight at once.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError>;
}
