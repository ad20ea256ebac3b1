//! WorkerGroup - fan-out と join
//!
//! # フロー
//! 1. `spawn()` で spec ごとに tokio task を 1 本起動
//! 2. 各 worker は `repeat` 回、順番に GET を投げる（失敗したらそこで止まる）
//! 3. `join()` で全 worker の終了を待ち、`WorkerReport` を集める
//!
//! # 終了の扱い
//! - panic した worker も report になる（他の worker は巻き込まない）
//! - drop しても detach しない。途中で捨てるなら `abandon()` を明示的に呼ぶ

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use tokio::task::{JoinError, JoinHandle};
use tracing::Instrument;

use crate::domain::{RunId, WorkerId, WorkerOutcome, WorkerReport, WorkerSpec};
use crate::ports::{Fetcher, ProgressEvent, ProgressSink};

/// Worker group handle.
/// - `spawn` starts every worker right away on the runtime's thread pool
/// - `join()` waits for all of them and collects their reports
/// - `abandon()` aborts them instead; there is no implicit detach on drop
///
/// Workers share nothing mutable. Each one owns its spec and only touches the
/// shared `Fetcher` / `ProgressSink`, which are `Sync`.
pub struct WorkerGroup {
    workers: Vec<Spawned>,
}

struct Spawned {
    id: WorkerId,
    spec: WorkerSpec,
    started_at: DateTime<Utc>,
    /// Successful calls so far, shared with the task so a lost worker still reports them.
    succeeded: Arc<AtomicU32>,
    join: JoinHandle<WorkerReport>,
}

impl WorkerGroup {
    /// Spawn one worker per spec, in order.
    pub fn spawn(
        run_id: RunId,
        specs: &[WorkerSpec],
        fetcher: Arc<dyn Fetcher>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        let mut workers = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            let id = WorkerId::new(index);
            let f = Arc::clone(&fetcher);
            let p = Arc::clone(&progress);
            let succeeded = Arc::new(AtomicU32::new(0));
            let span = tracing::info_span!("worker", run = %run_id, worker = %id, name = %spec.name);

            let join = tokio::spawn(
                worker_loop(id, spec.clone(), f, p, Arc::clone(&succeeded)).instrument(span),
            );
            workers.push(Spawned {
                id,
                spec: spec.clone(),
                started_at: Utc::now(),
                succeeded,
                join,
            });
        }

        Self { workers }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Barrier: wait for every worker, in launch order.
    ///
    /// A worker that panicked does not take the others down; it shows up as
    /// `WorkerOutcome::Panicked` in its report, with the calls that succeeded
    /// before the panic still counted.
    pub async fn join(self) -> Vec<WorkerReport> {
        let mut reports = Vec::with_capacity(self.workers.len());
        for w in self.workers {
            let report = match w.join.await {
                Ok(report) => report,
                Err(err) => {
                    tracing::error!(worker = %w.id, name = %w.spec.name, error = %err, "worker did not finish");
                    let completed = w.succeeded.load(Ordering::SeqCst);
                    lost_report(w.id, w.spec, w.started_at, completed, &err)
                }
            };
            reports.push(report);
        }
        reports
    }

    /// Give up on every worker without waiting.
    ///
    /// In-flight requests are dropped at their next await point and no
    /// report is produced. Use this only when the results are no longer wanted.
    pub fn abandon(self) {
        for w in &self.workers {
            w.join.abort();
        }
        tracing::warn!(workers = self.workers.len(), "abandoned in-flight workers");
    }
}

async fn worker_loop(
    id: WorkerId,
    spec: WorkerSpec,
    fetcher: Arc<dyn Fetcher>,
    progress: Arc<dyn ProgressSink>,
    succeeded: Arc<AtomicU32>,
) -> WorkerReport {
    let started_at = Utc::now();
    progress.on_event(&ProgressEvent::WorkerStarted {
        worker: id,
        name: spec.name.clone(),
        url: spec.url.clone(),
        repeat: spec.repeat,
    });

    let mut completed = 0;
    let mut last = None;
    let mut outcome = WorkerOutcome::Completed;

    // Strictly sequential: the next request is only sent once this one resolved.
    // 1 worker につき in-flight は常に 1 本まで
    for iteration in 0..spec.repeat {
        progress.on_event(&ProgressEvent::Request {
            worker: id,
            name: spec.name.clone(),
            iteration,
        });

        match fetcher.get(&spec.url).await {
            Ok(response) => {
                completed += 1;
                succeeded.fetch_add(1, Ordering::SeqCst);
                last = Some(response);
            }
            Err(err) => {
                // retry はしない: この worker はここで終わり
                let error = err.to_string();
                progress.on_event(&ProgressEvent::WorkerFailed {
                    worker: id,
                    name: spec.name.clone(),
                    iteration,
                    error: error.clone(),
                });
                outcome = WorkerOutcome::Failed { iteration, error };
                break;
            }
        }
    }

    let last_status = last.as_ref().map(|r| r.status);
    if outcome.is_completed() {
        progress.on_event(&ProgressEvent::WorkerFinished {
            worker: id,
            name: spec.name.clone(),
            calls: completed,
            last_status,
        });
    }

    WorkerReport {
        worker: id,
        name: spec.name,
        url: spec.url,
        planned: spec.repeat,
        completed,
        outcome,
        last_status,
        last_body_len: last.map(|r| r.body.len()),
        started_at,
        finished_at: Utc::now(),
    }
}

fn lost_report(
    id: WorkerId,
    spec: WorkerSpec,
    started_at: DateTime<Utc>,
    completed: u32,
    err: &JoinError,
) -> WorkerReport {
    WorkerReport {
        worker: id,
        name: spec.name,
        url: spec.url,
        planned: spec.repeat,
        completed,
        outcome: WorkerOutcome::Panicked {
            message: err.to_string(),
        },
        last_status: None,
        last_body_len: None,
        started_at,
        finished_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::NoopProgress;
    use crate::ports::{FetchError, FetchResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Counts calls; panics on the URL "panic://" or on call number `panic_on`.
    #[derive(Default)]
    struct CountingFetcher {
        calls: AtomicU32,
        delay: Option<Duration>,
        panic_on: Option<u32>,
    }

    #[async_trait]
    impl Fetcher for CountingFetcher {
        async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
            if url == "panic://" {
                panic!("fetcher exploded");
            }
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.panic_on == Some(call) {
                panic!("fetcher exploded on call {call}");
            }
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(FetchResponse::new(200, "{}"))
        }
    }

    #[derive(Default)]
    struct EventLog {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressSink for EventLog {
        fn on_event(&self, event: &ProgressEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    #[tokio::test]
    async fn join_collects_reports_in_launch_order() {
        let fetcher = Arc::new(CountingFetcher::default());
        let specs = vec![
            WorkerSpec::new("a", "http://a.test/", 3),
            WorkerSpec::new("b", "http://b.test/", 2),
        ];

        let group = WorkerGroup::spawn(RunId::new(), &specs, fetcher.clone(), Arc::new(NoopProgress));
        assert_eq!(group.len(), 2);
        let reports = group.join().await;

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].name, "a");
        assert_eq!(reports[0].worker, WorkerId::new(0));
        assert_eq!(reports[0].completed, 3);
        assert_eq!(reports[1].name, "b");
        assert_eq!(reports[1].completed, 2);
        assert!(reports.iter().all(|r| r.outcome.is_completed()));
        assert_eq!(reports[0].last_status, Some(200));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn zero_repeat_worker_completes_without_calls() {
        let fetcher = Arc::new(CountingFetcher::default());
        let log = Arc::new(EventLog::default());
        let specs = vec![WorkerSpec::new("idle", "http://idle.test/", 0)];

        let reports = WorkerGroup::spawn(RunId::new(), &specs, fetcher.clone(), log.clone())
            .join()
            .await;

        assert_eq!(reports[0].outcome, WorkerOutcome::Completed);
        assert_eq!(reports[0].completed, 0);
        assert_eq!(reports[0].last_status, None);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);

        let events = log.events.lock().unwrap();
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, ProgressEvent::Request { .. }))
        );
    }

    #[tokio::test]
    async fn panicking_worker_is_isolated() {
        let fetcher = Arc::new(CountingFetcher::default());
        let specs = vec![
            WorkerSpec::new("bad", "panic://", 1),
            WorkerSpec::new("good", "http://good.test/", 4),
        ];

        let reports = WorkerGroup::spawn(RunId::new(), &specs, fetcher.clone(), Arc::new(NoopProgress))
            .join()
            .await;

        assert!(matches!(reports[0].outcome, WorkerOutcome::Panicked { .. }));
        assert_eq!(reports[1].outcome, WorkerOutcome::Completed);
        assert_eq!(reports[1].completed, 4);
    }

    #[tokio::test]
    async fn panicked_worker_keeps_calls_made_before_the_panic() {
        let fetcher = Arc::new(CountingFetcher {
            panic_on: Some(3),
            ..Default::default()
        });
        let specs = vec![WorkerSpec::new("shaky", "http://shaky.test/", 5)];

        let reports = WorkerGroup::spawn(RunId::new(), &specs, fetcher.clone(), Arc::new(NoopProgress))
            .join()
            .await;

        assert!(matches!(reports[0].outcome, WorkerOutcome::Panicked { .. }));
        assert_eq!(reports[0].completed, 2);
        assert_eq!(reports[0].planned, 5);
    }

    #[tokio::test]
    async fn abandon_stops_further_requests() {
        let fetcher = Arc::new(CountingFetcher {
            delay: Some(Duration::from_millis(10)),
            ..Default::default()
        });
        let specs = vec![WorkerSpec::new("long", "http://long.test/", 10_000)];

        let group = WorkerGroup::spawn(RunId::new(), &specs, fetcher.clone(), Arc::new(NoopProgress));
        tokio::time::sleep(Duration::from_millis(50)).await;
        group.abandon();

        // Let the abort land before sampling.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let after_abandon = fetcher.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), after_abandon);
        assert!(after_abandon < 10_000);
    }
}
