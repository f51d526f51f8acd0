pub mod zip;

pub use self::zip::ArchiveHandle;

use anyhow::anyhow;
use std::sync::Arc;
use tracing::info;

use crate::error::HandlerError;
use crate::storage::ObjectStore;

/// Downloads the triggering archive and opens it for random access.
///
/// The whole object is held in memory: the ZIP central directory sits at the
/// end of the file, so entries cannot be streamed in order.
pub struct ArchiveFetcher {
    store: Arc<dyn ObjectStore>,
}

impl ArchiveFetcher {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        ArchiveFetcher { store }
    }

    /// Fetch `bucket/key` and parse its central directory
    pub async fn fetch(&self, bucket: &str, key: &str) -> Result<ArchiveHandle, HandlerError> {
        let fetch_error = |source: anyhow::Error| HandlerError::Fetch {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source,
        };

        let data = self.store.download(bucket, key).await.map_err(fetch_error)?;

        // Central directory parsing is synchronous
        let handle = tokio::task::spawn_blocking(move || ArchiveHandle::open(data))
            .await
            .map_err(|e| fetch_error(anyhow!("archive open task failed: {e}")))?
            .map_err(fetch_error)?;

        info!(
            bucket,
            key,
            entries = handle.len(),
            size = handle.archive_size(),
            "opened archive"
        );
        Ok(handle)
    }
}
