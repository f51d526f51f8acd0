use anyhow::{Result, anyhow};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, RwLock};

use super::ObjectStore;

type ObjectKey = (String, String);

/// In-memory object store for tests and local dry runs.
///
/// Uploads to keys registered with [`MemoryStore::fail_uploads_for`] fail,
/// simulating a transient storage error.
#[derive(Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<BTreeMap<ObjectKey, Bytes>>>,
    failing_uploads: Arc<RwLock<HashSet<ObjectKey>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object directly, bypassing upload failure injection
    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        if let Ok(mut objects) = self.objects.write() {
            objects.insert((bucket.to_string(), key.to_string()), body.into());
        }
    }

    /// Make every upload to `bucket/key` fail
    pub fn fail_uploads_for(&self, bucket: &str, key: &str) {
        if let Ok(mut failing) = self.failing_uploads.write() {
            failing.insert((bucket.to_string(), key.to_string()));
        }
    }

    /// Get an object's contents
    pub fn get(&self, bucket: &str, key: &str) -> Option<Bytes> {
        let objects = self.objects.read().ok()?;
        objects.get(&(bucket.to_string(), key.to_string())).cloned()
    }

    /// Check if an object exists
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.get(bucket, key).is_some()
    }

    /// All keys in a bucket, sorted
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .read()
            .map(|objects| {
                objects
                    .keys()
                    .filter(|(b, _)| b == bucket)
                    .map(|(_, k)| k.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total number of objects across all buckets
    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        MemoryStore {
            objects: Arc::clone(&self.objects),
            failing_uploads: Arc::clone(&self.failing_uploads),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn download(&self, bucket: &str, key: &str) -> Result<Bytes> {
        self.get(bucket, key)
            .ok_or_else(|| anyhow!("NoSuchKey: s3://{bucket}/{key}"))
    }

    async fn upload(&self, bucket: &str, key: &str, body: Bytes) -> Result<()> {
        let id = (bucket.to_string(), key.to_string());

        let failing = self
            .failing_uploads
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))?
            .contains(&id);
        if failing {
            return Err(anyhow!("simulated upload failure for s3://{bucket}/{key}"));
        }

        self.objects
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?
            .insert(id, body);
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<()> {
        self.objects
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}
