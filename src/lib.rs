//! Extract ZIP archives that land in an S3 bucket.
//!
//! One invocation downloads the triggering archive, uploads every entry to a
//! destination bucket/prefix through a fixed pool of workers, writes a summary
//! object and deletes the source archive.

pub mod archive;
pub mod config;
pub mod error;
pub mod event;
pub mod extract;
pub mod handler;
pub mod keys;
pub mod s3;
pub mod storage;

pub use config::{HandlerConfig, StorageConfig};
pub use error::{EntryExtractionError, HandlerError};
pub use event::{S3Event, TriggerEvent};
pub use extract::{ExtractionOutcome, ResultSet, SummaryReport};
pub use handler::Handler;
pub use storage::{MemoryStore, ObjectStore};
