//! Upload totals for one extraction run, shared by every worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct TransferMetrics {
    started: Instant,
    uploaded_bytes: AtomicU64,
    upload_count: AtomicUsize,
    upload_nanos: AtomicU64,
}

impl TransferMetrics {
    /// Start the run clock and return a collector to hand to workers
    pub fn new() -> Arc<Self> {
        Arc::new(TransferMetrics {
            started: Instant::now(),
            uploaded_bytes: AtomicU64::new(0),
            upload_count: AtomicUsize::new(0),
            upload_nanos: AtomicU64::new(0),
        })
    }

    pub fn record_upload(&self, bytes: u64, duration: Duration) {
        self.uploaded_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.upload_count.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.upload_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    pub fn uploaded_bytes(&self) -> u64 {
        self.uploaded_bytes.load(Ordering::Relaxed)
    }

    pub fn upload_count(&self) -> usize {
        self.upload_count.load(Ordering::Relaxed)
    }

    /// Summed across workers, so it exceeds `elapsed` when uploads overlap
    pub fn upload_time(&self) -> Duration {
        Duration::from_nanos(self.upload_nanos.load(Ordering::Relaxed))
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_collector_is_empty() {
        let metrics = TransferMetrics::new();
        assert_eq!(metrics.uploaded_bytes(), 0);
        assert_eq!(metrics.upload_count(), 0);
        assert_eq!(metrics.upload_time(), Duration::ZERO);
    }

    #[test]
    fn test_concurrent_workers_sum_their_uploads() {
        let metrics = TransferMetrics::new();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        metrics.record_upload(512, Duration::from_millis(2));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.upload_count(), 100);
        assert_eq!(metrics.uploaded_bytes(), 100 * 512);
        assert_eq!(metrics.upload_time(), Duration::from_millis(200));
    }

    #[test]
    fn test_elapsed_runs_from_creation() {
        let metrics = TransferMetrics::new();
        std::thread::sleep(Duration::from_millis(5));
        let first = metrics.elapsed();
        assert!(first >= Duration::from_millis(5));
        assert!(metrics.elapsed() >= first);
    }
}
