//! Ports - seams to the outside world.
//!
//! Workers only talk to the network through [`Fetcher`] and only report
//! progress through [`ProgressSink`]. Both are trait objects so tests can swap
//! in scripted fakes.

pub mod fetcher;
pub mod progress;

pub use self::fetcher::{FetchError, FetchResponse, Fetcher};
pub use self::progress::{ProgressEvent, ProgressSink};
