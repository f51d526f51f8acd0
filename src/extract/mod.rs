pub mod outcome;
pub mod pool;
pub mod summary;

pub use outcome::{ExtractionOutcome, ResultSet};
pub use pool::{ExtractionTask, WorkerPool};
pub use summary::SummaryReport;

use std::sync::Arc;
use tracing::info;

use crate::archive::ArchiveHandle;
use crate::config::HandlerConfig;
use crate::keys::ObjectPath;
use crate::storage::{ObjectStore, TransferMetrics};

/// Fans archive entries out over the worker pool and gathers the results
pub struct ExtractionDispatcher {
    store: Arc<dyn ObjectStore>,
    pool: WorkerPool,
    max_entry_size: u64,
}

impl ExtractionDispatcher {
    pub fn new(store: Arc<dyn ObjectStore>, config: &HandlerConfig) -> Self {
        ExtractionDispatcher {
            store,
            pool: WorkerPool::new(config.worker_count),
            max_entry_size: config.max_entry_size,
        }
    }

    /// One task per entry, in central directory order
    pub fn plan(
        archive: &ArchiveHandle,
        destination_dir: &ObjectPath,
        bucket: &str,
    ) -> Vec<ExtractionTask> {
        archive
            .entry_names()
            .iter()
            .enumerate()
            .map(|(index, entry)| ExtractionTask {
                index,
                entry: entry.clone(),
                destination_key: destination_dir.join(entry).to_key(),
                bucket: bucket.to_string(),
                archive: archive.clone(),
            })
            .collect()
    }

    /// Extract every entry of `archive` to `bucket/destination_dir/...` and
    /// wait for all of them. Entry failures are recorded, never returned.
    pub async fn dispatch(
        &self,
        archive: &ArchiveHandle,
        destination_dir: &ObjectPath,
        bucket: &str,
    ) -> ResultSet {
        let metrics = TransferMetrics::new();
        let tasks = Self::plan(archive, destination_dir, bucket);
        let outcomes = self
            .pool
            .run(
                tasks,
                Arc::clone(&self.store),
                self.max_entry_size,
                Arc::clone(&metrics),
            )
            .await;
        let results: ResultSet = outcomes.into_iter().collect();

        info!(
            succeeded = results.success.len(),
            failed = results.fail.len(),
            uploads = metrics.upload_count(),
            uploaded_bytes = metrics.uploaded_bytes(),
            upload_time_ms = metrics.upload_time().as_millis() as u64,
            elapsed_ms = metrics.elapsed().as_millis() as u64,
            workers = self.pool.worker_count(),
            "extraction finished"
        );

        results
    }
}
