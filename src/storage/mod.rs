pub mod memory;
pub mod metrics;

pub use memory::MemoryStore;
pub use metrics::TransferMetrics;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// The object storage operations an invocation needs.
///
/// Implementations are built once at process start and shared (via `Arc`)
/// across invocations and workers.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object's full contents
    async fn download(&self, bucket: &str, key: &str) -> Result<Bytes>;

    /// Write an object, replacing any existing one
    async fn upload(&self, bucket: &str, key: &str, body: Bytes) -> Result<()>;

    /// Remove an object
    async fn delete(&self, bucket: &str, key: &str) -> Result<()>;
}
