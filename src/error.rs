use thiserror::Error;

/// Errors that end an invocation.
///
/// Nothing here is retried; the Lambda runtime reports the error and
/// redelivery (if configured) is up to the event source.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("invalid trigger event: {0}")]
    InvalidEvent(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to fetch archive s3://{bucket}/{key}")]
    Fetch {
        bucket: String,
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to upload summary to s3://{bucket}/{key}")]
    SummaryUpload {
        bucket: String,
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to delete source archive s3://{bucket}/{key}")]
    SourceDeletion {
        bucket: String,
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Failure of a single archive entry. Recorded as a `fail` outcome, never
/// propagated past the dispatcher.
#[derive(Debug, Error)]
pub enum EntryExtractionError {
    #[error("cannot locate entry {entry} in archive")]
    Open {
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("cannot decompress entry {entry}")]
    Read {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    #[error("entry {entry} is {size} bytes, over the {limit} byte limit")]
    TooLarge { entry: String, size: u64, limit: u64 },

    #[error("upload to s3://{bucket}/{key} failed")]
    Upload {
        bucket: String,
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("worker stopped before finishing entry {entry}")]
    Worker { entry: String },
}
