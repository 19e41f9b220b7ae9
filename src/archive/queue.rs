//! Bounded background archival.
//!
//! A single worker drains a bounded channel and runs each save on the blocking
//! pool. Submission never waits: when the queue is full or the worker is gone
//! the record is dropped with a warning.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::archive::{ArchiveRecord, FeedArchiver};
use crate::observability::metrics;

#[derive(Debug, Clone)]
pub struct ArchiveQueue {
    tx: mpsc::Sender<ArchiveRecord>,
}

impl ArchiveQueue {
    /// Start the worker on the current tokio runtime.
    ///
    /// The worker exits once every `ArchiveQueue` clone is dropped and the
    /// queue has drained.
    pub fn spawn(archiver: FeedArchiver, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<ArchiveRecord>(capacity.max(1));
        let worker = tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                let archiver = archiver.clone();
                if let Err(e) =
                    tokio::task::spawn_blocking(move || archiver.save_record(&record)).await
                {
                    tracing::warn!(error = %e, "Archive task aborted");
                }
            }
            tracing::debug!("Archive queue drained");
        });
        (Self { tx }, worker)
    }

    /// Queue a record. Returns `false` if it was dropped.
    pub fn submit(&self, record: ArchiveRecord) -> bool {
        match self.tx.try_send(record) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(record)) => {
                tracing::warn!(feed = %record.feed_name, "Archive queue full, dropping feed copy");
                metrics::record_archive_write("dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(record)) => {
                tracing::warn!(feed = %record.feed_name, "Archive queue closed, dropping feed copy");
                metrics::record_archive_write("dropped");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn queued_records_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let archiver = FeedArchiver::new(Some(dir.path().to_path_buf()));
        let (queue, worker) = ArchiveQueue::spawn(archiver, 8);

        assert!(queue.submit(ArchiveRecord::saved("docids", "<a/>")));
        assert!(queue.submit(ArchiveRecord::failed("docids", "<b/>")));
        drop(queue);
        worker.await.unwrap();

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("FAILED-docids-"));
        assert!(names[1].starts_with("docids-"));
    }

    #[tokio::test]
    async fn full_queue_drops_instead_of_waiting() {
        let (tx, _rx) = mpsc::channel(1);
        let queue = ArchiveQueue { tx };
        assert!(queue.submit(ArchiveRecord::saved("a", "1")));
        assert!(!queue.submit(ArchiveRecord::saved("b", "2")));
    }

    #[tokio::test]
    async fn closed_queue_drops() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let queue = ArchiveQueue { tx };
        assert!(!queue.submit(ArchiveRecord::saved("a", "1")));
    }
}
