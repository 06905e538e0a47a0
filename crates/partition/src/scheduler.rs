//! Concurrent job scheduler: a bounded pool executing recursive split
//! jobs, with an explicit completion barrier instead of wall-clock idle
//! polling. Outstanding = submitted − completed; reaching zero and
//! staying there past a grace period signals long-idle.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify, Semaphore};
use tracing::{debug, error};

use crate::error::{Result, SplitError};
use crate::progress::SplitProgress;

/// Coarse pool state reported to an optional listener channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Running,
    Idle,
    LongIdle,
}

/// One unit of recursive splitting work. Jobs may submit further jobs
/// through the worker handle they are given.
#[async_trait]
pub trait SplitJob: Send + Sync + 'static {
    async fn run(&self, progress: SplitProgress, worker: &ParallelWorker) -> Result<()>;
}

/// Bounded worker pool driving recursive split jobs to completion.
#[derive(Clone)]
pub struct ParallelWorker {
    inner: Arc<Inner>,
}

struct Inner {
    id: String,
    semaphore: Arc<Semaphore>,
    outstanding: AtomicUsize,
    generation: AtomicU64,
    running: Arc<AtomicBool>,
    idle: Notify,
    failed_lineages: AtomicUsize,
    fatal: Mutex<Option<SplitError>>,
    handler: Arc<dyn SplitJob>,
    state_listener: Option<mpsc::Sender<WorkerState>>,
}

impl ParallelWorker {
    pub fn new(
        id: impl Into<String>,
        num_threads: usize,
        running: Arc<AtomicBool>,
        handler: Arc<dyn SplitJob>,
        state_listener: Option<mpsc::Sender<WorkerState>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: id.into(),
                semaphore: Arc::new(Semaphore::new(num_threads.max(1))),
                outstanding: AtomicUsize::new(0),
                generation: AtomicU64::new(0),
                running,
                idle: Notify::new(),
                failed_lineages: AtomicUsize::new(0),
                fatal: Mutex::new(None),
                handler,
                state_listener,
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Stops the run; in-flight jobs abandon further recursion at their
    /// next check and no new submissions are accepted.
    pub fn stop(&self) {
        self.inner.running.store(false, Ordering::SeqCst);
    }

    /// Submits a job; callable from inside running jobs for recursion.
    pub fn submit(&self, progress: SplitProgress) {
        if !self.is_running() {
            return;
        }
        if self.inner.outstanding.fetch_add(1, Ordering::SeqCst) == 0 {
            self.notify_state(WorkerState::Running);
        }
        self.inner.generation.fetch_add(1, Ordering::SeqCst);

        let worker = self.clone();
        tokio::spawn(async move {
            let permit = worker.inner.semaphore.clone().acquire_owned().await;
            if permit.is_ok() && worker.is_running() {
                debug!(worker = %worker.inner.id, "running split job");
                if let Err(err) = worker.inner.handler.run(progress, &worker).await {
                    worker.report_failure(err);
                }
            }
            worker.complete_one();
        });
    }

    fn complete_one(&self) {
        if self.inner.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify_state(WorkerState::Idle);
            // notify_one stores a permit, so the completion waiter cannot
            // miss an idle edge between its counter check and its await.
            self.inner.idle.notify_one();
        }
    }

    fn report_failure(&self, err: SplitError) {
        if err.is_fatal() {
            error!(worker = %self.inner.id, error = %err, "fatal error, stopping split run");
            let mut fatal = self.inner.fatal.lock().unwrap_or_else(|e| e.into_inner());
            fatal.get_or_insert(err);
            self.stop();
        } else {
            // One lineage lost; the rest of the run keeps going and the
            // defect stays visible through the failed-lineage count.
            error!(worker = %self.inner.id, error = %err, "split job failed, abandoning lineage");
            self.inner.failed_lineages.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Waits until no job is pending or running and nothing new was
    /// submitted for one grace period.
    pub async fn wait_until_long_idle(&self, grace: Duration) {
        loop {
            let notified = self.inner.idle.notified();
            if self.inner.outstanding.load(Ordering::SeqCst) > 0 {
                notified.await;
                continue;
            }
            let generation = self.inner.generation.load(Ordering::SeqCst);
            tokio::time::sleep(grace).await;
            if self.inner.outstanding.load(Ordering::SeqCst) == 0
                && self.inner.generation.load(Ordering::SeqCst) == generation
            {
                self.notify_state(WorkerState::LongIdle);
                return;
            }
        }
    }

    pub fn failed_lineages(&self) -> usize {
        self.inner.failed_lineages.load(Ordering::SeqCst)
    }

    /// Takes the fatal error that stopped the run, if any.
    pub fn take_fatal(&self) -> Option<SplitError> {
        self.inner.fatal.lock().unwrap_or_else(|e| e.into_inner()).take()
    }

    fn notify_state(&self, state: WorkerState) {
        if let Some(listener) = &self.inner.state_listener {
            // Transitions are advisory; a full listener drops them.
            let _ = listener.try_send(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingJob {
        executed: AtomicUsize,
        resubmit_until: usize,
    }

    #[async_trait]
    impl SplitJob for CountingJob {
        async fn run(&self, mut progress: SplitProgress, worker: &ParallelWorker) -> Result<()> {
            let n = self.executed.fetch_add(1, Ordering::SeqCst);
            if n < self.resubmit_until {
                progress.field_pos += 1;
                worker.submit(progress);
            }
            Ok(())
        }
    }

    fn root_progress() -> SplitProgress {
        SplitProgress {
            filter: tundra_common::PartitionFilter::new(),
            field_pos: 0,
            count: -1,
            collector: 0,
        }
    }

    #[tokio::test]
    async fn recursion_then_quiesce() {
        let job = Arc::new(CountingJob { executed: AtomicUsize::new(0), resubmit_until: 5 });
        let worker = ParallelWorker::new(
            "test",
            2,
            Arc::new(AtomicBool::new(true)),
            job.clone(),
            None,
        );
        worker.submit(root_progress());
        worker.wait_until_long_idle(Duration::from_millis(50)).await;
        assert_eq!(job.executed.load(Ordering::SeqCst), 6);
        assert_eq!(worker.failed_lineages(), 0);
    }

    struct FailingJob;

    #[async_trait]
    impl SplitJob for FailingJob {
        async fn run(&self, _progress: SplitProgress, _worker: &ParallelWorker) -> Result<()> {
            Err(SplitError::Collaborator("boom".into()))
        }
    }

    #[tokio::test]
    async fn lineage_failure_does_not_stop_the_pool() {
        let worker = ParallelWorker::new(
            "test",
            1,
            Arc::new(AtomicBool::new(true)),
            Arc::new(FailingJob),
            None,
        );
        worker.submit(root_progress());
        worker.submit(root_progress());
        worker.wait_until_long_idle(Duration::from_millis(50)).await;
        assert!(worker.is_running());
        assert_eq!(worker.failed_lineages(), 2);
    }

    struct FatalJob;

    #[async_trait]
    impl SplitJob for FatalJob {
        async fn run(&self, _progress: SplitProgress, _worker: &ParallelWorker) -> Result<()> {
            Err(SplitError::MissingTypeSplitter { type_key: "uuid".into() })
        }
    }

    #[tokio::test]
    async fn fatal_error_stops_the_run() {
        let worker = ParallelWorker::new(
            "test",
            1,
            Arc::new(AtomicBool::new(true)),
            Arc::new(FatalJob),
            None,
        );
        worker.submit(root_progress());
        worker.wait_until_long_idle(Duration::from_millis(50)).await;
        assert!(!worker.is_running());
        assert!(matches!(worker.take_fatal(), Some(SplitError::MissingTypeSplitter { .. })));
    }

    #[tokio::test]
    async fn state_listener_observes_idle_transitions() {
        let (tx, mut rx) = mpsc::channel(16);
        let worker = ParallelWorker::new(
            "test",
            1,
            Arc::new(AtomicBool::new(true)),
            Arc::new(CountingJob { executed: AtomicUsize::new(0), resubmit_until: 0 }),
            Some(tx),
        );
        worker.submit(root_progress());
        worker.wait_until_long_idle(Duration::from_millis(20)).await;
        let mut states = Vec::new();
        while let Ok(state) = rx.try_recv() {
            states.push(state);
        }
        assert_eq!(states.first(), Some(&WorkerState::Running));
        assert!(states.contains(&WorkerState::Idle));
        assert_eq!(states.last(), Some(&WorkerState::LongIdle));
    }
}
