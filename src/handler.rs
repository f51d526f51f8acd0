//! One invocation: fetch the archive, extract it, write the summary, delete
//! the source.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::archive::ArchiveFetcher;
use crate::config::HandlerConfig;
use crate::error::HandlerError;
use crate::event::{S3Event, TriggerEvent};
use crate::extract::{ExtractionDispatcher, ResultSet, SummaryReport};
use crate::keys::{self, ObjectPath};
use crate::storage::ObjectStore;

/// Runs invocations against a storage client created once at startup
#[derive(Clone)]
pub struct Handler {
    store: Arc<dyn ObjectStore>,
}

impl Handler {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Handler { store }
    }

    /// Lambda entry point: read the per-invocation config from the
    /// environment and process the first record of the event
    pub async fn handle_event(&self, event: S3Event) -> Result<ResultSet, HandlerError> {
        let trigger = TriggerEvent::from_event(&event)?;
        let config = HandlerConfig::from_env()?;
        self.invoke(&trigger, &config).await
    }

    /// Extract `trigger` into `config.target_bucket`.
    ///
    /// Entry failures show up in the returned `ResultSet`. Fetch, summary and
    /// delete failures abort the invocation. The source archive is deleted
    /// whenever extraction ran, however many entries failed.
    #[instrument(skip_all, fields(bucket = %trigger.bucket, key = %trigger.key))]
    pub async fn invoke(
        &self,
        trigger: &TriggerEvent,
        config: &HandlerConfig,
    ) -> Result<ResultSet, HandlerError> {
        let source_dir = ObjectPath::parse(&trigger.key).parent();
        info!(">>> file: {}", source_dir);

        let archive = ArchiveFetcher::new(Arc::clone(&self.store))
            .fetch(&trigger.bucket, &trigger.key)
            .await?;

        let destination_dir = keys::destination_dir(&config.target_path_prefix, &trigger.key);
        let results = ExtractionDispatcher::new(Arc::clone(&self.store), config)
            .dispatch(&archive, &destination_dir, &config.target_bucket)
            .await;
        drop(archive);

        let summary_key = keys::summary_key(&config.target_path_prefix, &trigger.key);
        let report = SummaryReport::from_results(&results);
        self.store
            .upload(&config.target_bucket, &summary_key, report.to_bytes())
            .await
            .map_err(|source| HandlerError::SummaryUpload {
                bucket: config.target_bucket.clone(),
                key: summary_key.clone(),
                source,
            })?;

        self.store
            .delete(&trigger.bucket, &trigger.key)
            .await
            .map_err(|source| HandlerError::SourceDeletion {
                bucket: trigger.bucket.clone(),
                key: trigger.key.clone(),
                source,
            })?;

        info!(
            summary = %summary_key,
            "<<< end: {} ({})",
            source_dir,
            results.len()
        );
        Ok(results)
    }
}
