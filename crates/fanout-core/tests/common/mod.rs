#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fanout_core::{FetchError, FetchResponse, Fetcher, ProgressEvent, ProgressSink};
use tokio::sync::Semaphore;

/// One entry in the shared journal: either a progress event or a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Progress(ProgressEvent),
    Call(String),
}

pub type Journal = Arc<Mutex<Vec<Entry>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub started: Instant,
    pub finished: Instant,
}

/// In-memory fetcher with per-URL scripting.
///
/// - `fail_on(url, n)`: the n-th call (1-based) to `url` returns HTTP 500
/// - `gated(url)`: every call to `url` blocks until `release(url, k)` hands out a permit
pub struct ScriptedFetcher {
    calls: Mutex<Vec<Call>>,
    fail_on: HashMap<String, u32>,
    gates: HashMap<String, Arc<Semaphore>>,
    in_flight: Mutex<HashMap<String, u32>>,
    overlapped: AtomicBool,
    latency: Duration,
    journal: Option<Journal>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: HashMap::new(),
            gates: HashMap::new(),
            in_flight: Mutex::new(HashMap::new()),
            overlapped: AtomicBool::new(false),
            latency: Duration::from_millis(1),
            journal: None,
        }
    }

    pub fn fail_on(mut self, url: &str, call: u32) -> Self {
        self.fail_on.insert(url.to_string(), call);
        self
    }

    pub fn gated(mut self, url: &str) -> Self {
        self.gates.insert(url.to_string(), Arc::new(Semaphore::new(0)));
        self
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn release(&self, url: &str, calls: usize) {
        self.gates[url].add_permits(calls);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.url == url).count()
    }

    /// True if two calls to the same URL were ever in flight together.
    pub fn overlapped(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let started = Instant::now();
        if let Some(journal) = &self.journal {
            journal.lock().unwrap().push(Entry::Call(url.to_string()));
        }
        {
            let mut in_flight = self.in_flight.lock().unwrap();
            let n = in_flight.entry(url.to_string()).or_insert(0);
            if *n > 0 {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            *n += 1;
        }

        if let Some(gate) = self.gates.get(url) {
            gate.acquire().await.unwrap().forget();
        }
        tokio::time::sleep(self.latency).await;

        *self.in_flight.lock().unwrap().get_mut(url).unwrap() -= 1;
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call {
                url: url.to_string(),
                started,
                finished: Instant::now(),
            });
            calls.iter().filter(|c| c.url == url).count() as u32
        };

        if self.fail_on.get(url) == Some(&call_number) {
            return Err(FetchError::Status { status: 500 });
        }
        Ok(FetchResponse::new(200, format!(r#"{{"call":{call_number}}}"#)))
    }
}

/// Progress sink that appends every event to a journal.
pub struct RecordingProgress {
    journal: Journal,
}

impl RecordingProgress {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

impl ProgressSink for RecordingProgress {
    fn on_event(&self, event: &ProgressEvent) {
        self.journal
            .lock()
            .unwrap()
            .push(Entry::Progress(event.clone()));
    }
}
