use crate::error::HandlerError;

/// Number of concurrent extraction workers per invocation
pub const WORKER_COUNT: usize = 4;

/// Maximum decompressed size of a single entry (1GB) to guard against zip bombs
pub const DEFAULT_MAX_ENTRY_SIZE: u64 = 1024 * 1024 * 1024;

/// Environment variable holding the destination bucket
pub const TARGET_BUCKET_VAR: &str = "target_bucket";

/// Environment variable holding the destination key prefix
pub const TARGET_PATH_PREFIX_VAR: &str = "target_path_prefix";

/// Environment variable overriding the per-entry size limit
pub const MAX_ENTRY_SIZE_VAR: &str = "max_entry_size";

/// Per-invocation settings for where extracted entries go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Bucket receiving extracted entries and the summary
    pub target_bucket: String,
    /// Key prefix prepended to every uploaded object (no leading/trailing '/')
    pub target_path_prefix: String,
    /// Size of the extraction worker pool
    pub worker_count: usize,
    /// Entries declaring a larger decompressed size are recorded as failures
    pub max_entry_size: u64,
}

impl HandlerConfig {
    /// Create a config with the default pool size and entry limit
    pub fn new(target_bucket: impl Into<String>, target_path_prefix: impl Into<String>) -> Self {
        HandlerConfig {
            target_bucket: target_bucket.into(),
            target_path_prefix: target_path_prefix.into().trim_matches('/').to_string(),
            worker_count: WORKER_COUNT,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
        }
    }

    /// Read the config from the process environment
    pub fn from_env() -> Result<Self, HandlerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HandlerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let target_bucket = lookup(TARGET_BUCKET_VAR)
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .ok_or_else(|| HandlerError::Config(format!("{TARGET_BUCKET_VAR} is not set")))?;

        let target_path_prefix = lookup(TARGET_PATH_PREFIX_VAR).unwrap_or_default();

        let max_entry_size = match lookup(MAX_ENTRY_SIZE_VAR) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                HandlerError::Config(format!("{MAX_ENTRY_SIZE_VAR}={raw:?} is not a byte count: {e}"))
            })?,
            None => DEFAULT_MAX_ENTRY_SIZE,
        };

        Ok(HandlerConfig {
            max_entry_size,
            ..Self::new(target_bucket, target_path_prefix)
        })
    }

    /// Override the worker pool size (values below 1 are raised to 1)
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count.max(1);
        self
    }

    /// Override the per-entry size limit
    pub fn with_max_entry_size(mut self, max_entry_size: u64) -> Self {
        self.max_entry_size = max_entry_size;
        self
    }
}

/// Configuration for creating the S3 client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageConfig {
    /// Optional custom endpoint URL (LocalStack, MinIO, ...)
    pub endpoint_url: Option<String>,
    /// Whether to use path-style addressing (required for some S3-compatible services)
    pub force_path_style: bool,
    /// Optional region override
    pub region: Option<String>,
}

impl StorageConfig {
    /// Read the storage settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the storage settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        StorageConfig {
            endpoint_url: non_empty("AWS_ENDPOINT_URL"),
            force_path_style: non_empty("S3_FORCE_PATH_STYLE")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            region: non_empty("AWS_REGION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_handler_config_defaults() {
        let config = HandlerConfig::from_lookup(lookup_from(&[("target_bucket", "dst")])).unwrap();
        assert_eq!(config.target_bucket, "dst");
        assert_eq!(config.target_path_prefix, "");
        assert_eq!(config.worker_count, WORKER_COUNT);
        assert_eq!(config.max_entry_size, DEFAULT_MAX_ENTRY_SIZE);
    }

    #[test]
    fn test_handler_config_trims_prefix_slashes() {
        let config = HandlerConfig::from_lookup(lookup_from(&[
            ("target_bucket", "dst"),
            ("target_path_prefix", "/out/extracted/"),
        ]))
        .unwrap();
        assert_eq!(config.target_path_prefix, "out/extracted");
    }

    #[test]
    fn test_handler_config_requires_bucket() {
        let err = HandlerConfig::from_lookup(lookup_from(&[("target_path_prefix", "out")])).unwrap_err();
        assert!(matches!(err, HandlerError::Config(_)));

        let err = HandlerConfig::from_lookup(lookup_from(&[("target_bucket", "  ")])).unwrap_err();
        assert!(err.to_string().contains("target_bucket"));
    }

    #[test]
    fn test_handler_config_max_entry_size() {
        let config = HandlerConfig::from_lookup(lookup_from(&[
            ("target_bucket", "dst"),
            ("max_entry_size", "4096"),
        ]))
        .unwrap();
        assert_eq!(config.max_entry_size, 4096);

        let err = HandlerConfig::from_lookup(lookup_from(&[
            ("target_bucket", "dst"),
            ("max_entry_size", "lots"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("max_entry_size"));
    }

    #[test]
    fn test_worker_count_never_zero() {
        let config = HandlerConfig::new("dst", "out").with_worker_count(0);
        assert_eq!(config.worker_count, 1);
    }

    #[test]
    fn test_storage_config_from_lookup() {
        let config = StorageConfig::from_lookup(lookup_from(&[
            ("AWS_ENDPOINT_URL", "http://localhost:4566"),
            ("S3_FORCE_PATH_STYLE", "true"),
            ("AWS_REGION", "us-east-1"),
        ]));
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert!(config.force_path_style);
        assert_eq!(config.region.as_deref(), Some("us-east-1"));

        assert_eq!(StorageConfig::from_lookup(lookup_from(&[])), StorageConfig::default());
    }
}
