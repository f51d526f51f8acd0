//! Fixed-size worker pool for entry extraction.
//!
//! All tasks are queued up front on one channel. Each worker pulls the next
//! task, decompresses the entry on the blocking pool, uploads it, and sends
//! the outcome back on a second channel. The caller drains outcomes until
//! every worker has dropped its sender, then joins the workers.
//!
//! A task that panics fails its own entry; the worker moves on to the next.

use futures::FutureExt;
use futures::future::join_all;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error};

use super::ExtractionOutcome;
use crate::archive::ArchiveHandle;
use crate::error::EntryExtractionError;
use crate::storage::{ObjectStore, TransferMetrics};

/// One entry to extract and where it goes
#[derive(Debug, Clone)]
pub struct ExtractionTask {
    /// Position in the archive's central directory
    pub index: usize,
    pub entry: String,
    pub destination_key: String,
    pub bucket: String,
    pub archive: ArchiveHandle,
}

/// Shared, read-only state for every worker in one run
struct WorkerContext {
    store: Arc<dyn ObjectStore>,
    max_entry_size: u64,
    metrics: Arc<TransferMetrics>,
}

type TaskQueue = Arc<Mutex<mpsc::Receiver<(usize, ExtractionTask)>>>;
type OutcomeSender = mpsc::UnboundedSender<(usize, ExtractionOutcome)>;

impl ExtractionTask {
    /// Extract and upload; failures become a `Fail` outcome
    async fn run(self, ctx: &WorkerContext) -> ExtractionOutcome {
        match self.extract(ctx).await {
            Ok(()) => ExtractionOutcome::Success { entry: self.entry },
            Err(error) => {
                error!(
                    error = %error,
                    "err: {}/{}",
                    self.bucket,
                    self.destination_key
                );
                ExtractionOutcome::Fail {
                    entry: self.entry,
                    error,
                }
            }
        }
    }

    async fn extract(&self, ctx: &WorkerContext) -> Result<(), EntryExtractionError> {
        let archive = self.archive.clone();
        let index = self.index;
        let limit = ctx.max_entry_size;

        let body = tokio::task::spawn_blocking(move || archive.read_entry(index, limit))
            .await
            .map_err(|_| EntryExtractionError::Worker {
                entry: self.entry.clone(),
            })??;

        let size = body.len() as u64;
        let started = Instant::now();
        ctx.store
            .upload(&self.bucket, &self.destination_key, body)
            .await
            .map_err(|source| EntryExtractionError::Upload {
                bucket: self.bucket.clone(),
                key: self.destination_key.clone(),
                source,
            })?;

        ctx.metrics.record_upload(size, started.elapsed());
        debug!(entry = %self.entry, key = %self.destination_key, size, "uploaded entry");
        Ok(())
    }
}

/// A pool of `worker_count` tokio tasks sharing one task queue
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    worker_count: usize,
}

impl WorkerPool {
    pub fn new(worker_count: usize) -> Self {
        WorkerPool {
            worker_count: worker_count.max(1),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Run every task to completion and return one outcome per task, in
    /// completion order. A task that panics, or whose outcome never arrives,
    /// is reported as a `Worker` failure.
    pub async fn run(
        &self,
        tasks: Vec<ExtractionTask>,
        store: Arc<dyn ObjectStore>,
        max_entry_size: u64,
        metrics: Arc<TransferMetrics>,
    ) -> Vec<ExtractionOutcome> {
        let entries: Vec<String> = tasks.iter().map(|t| t.entry.clone()).collect();

        // The queue holds every task, so queueing never waits on a worker
        let (task_tx, task_rx) = mpsc::channel(tasks.len().max(1));
        for (slot, task) in tasks.into_iter().enumerate() {
            if task_tx.try_send((slot, task)).is_err() {
                error!(entry = %entries[slot], "could not queue extraction task");
            }
        }
        drop(task_tx);

        let queue: TaskQueue = Arc::new(Mutex::new(task_rx));
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();
        let ctx = Arc::new(WorkerContext {
            store,
            max_entry_size,
            metrics,
        });

        let workers: Vec<_> = (0..self.worker_count)
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    worker_id,
                    Arc::clone(&queue),
                    outcome_tx.clone(),
                    Arc::clone(&ctx),
                ))
            })
            .collect();
        drop(outcome_tx);

        let mut completed = vec![false; entries.len()];
        let mut outcomes = Vec::with_capacity(entries.len());
        while let Some((slot, outcome)) = outcome_rx.recv().await {
            if let Some(done) = completed.get_mut(slot) {
                *done = true;
            }
            outcomes.push(outcome);
        }

        for (worker_id, joined) in join_all(workers).await.into_iter().enumerate() {
            if let Err(e) = joined {
                error!(worker_id, error = %e, "extraction worker did not finish");
            }
        }

        for (slot, done) in completed.into_iter().enumerate() {
            if !done {
                let entry = entries[slot].clone();
                error!(entry = %entry, "no outcome recorded for entry");
                outcomes.push(ExtractionOutcome::Fail {
                    entry: entry.clone(),
                    error: EntryExtractionError::Worker { entry },
                });
            }
        }

        outcomes
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: TaskQueue,
    outcomes: OutcomeSender,
    ctx: Arc<WorkerContext>,
) {
    let mut handled = 0usize;
    loop {
        let next = queue.lock().await.recv().await;
        let Some((slot, task)) = next else { break };

        let entry = task.entry.clone();
        let outcome = match AssertUnwindSafe(task.run(&ctx)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(_) => {
                error!(worker_id, entry = %entry, "extraction task panicked");
                ExtractionOutcome::Fail {
                    entry: entry.clone(),
                    error: EntryExtractionError::Worker { entry },
                }
            }
        };
        handled += 1;
        if outcomes.send((slot, outcome)).is_err() {
            break;
        }
    }
    debug!(worker_id, handled, "extraction worker finished");
}
