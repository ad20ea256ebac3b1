//! Implementations of the ports.
//!
//! - `HttpFetcher`: reqwest-backed [`crate::ports::Fetcher`]
//! - `TracingProgress` / `NoopProgress`: [`crate::ports::ProgressSink`]s

pub mod http;
pub mod progress;

pub use self::http::HttpFetcher;
pub use self::progress::{NoopProgress, TracingProgress};
