//! Ordered batch commits off the receive loop.
//!
//! Batches go through an unbounded channel to one worker task, which commits
//! them one at a time on the blocking pool. Submission never waits, and a
//! later batch is never committed before an earlier one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::{Batch, CommitReport, IngestStats, TradeRecord};
use crate::error::{Error, Result};
use crate::infrastructure::config::ingest::IngestConfig;
use crate::port::TradeSink;

/// Bounded retry for failed commits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitRetry {
    /// Extra attempts after the first failure.
    pub retries: u32,
    pub delay: Duration,
}

impl From<&IngestConfig> for CommitRetry {
    fn from(config: &IngestConfig) -> Self {
        Self {
            retries: config.commit_retries,
            delay: config.commit_retry_delay(),
        }
    }
}

/// Sending side of the flush queue.
#[derive(Clone)]
pub struct FlushHandle {
    tx: mpsc::UnboundedSender<Batch>,
    stats: Arc<IngestStats>,
}

impl FlushHandle {
    /// Queue a batch for commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker has stopped; the batch is dropped.
    pub fn submit(&self, batch: Batch) -> Result<()> {
        let queue_depth = self.stats.record_queued();
        info!(
            generation = batch.generation,
            size = batch.len(),
            queue_depth,
            "Flushing batch"
        );
        self.stats.record_flush();
        self.tx.send(batch).map_err(|err| {
            let lost = err.0;
            self.stats.record_dequeued();
            self.stats.record_failed_batch(lost.len());
            Error::Task(format!(
                "flush worker stopped; batch {} with {} records dropped",
                lost.generation,
                lost.len()
            ))
        })
    }
}

/// Start the flush worker.
///
/// The worker exits once every [`FlushHandle`] is dropped and the queue is
/// drained, so awaiting the returned handle waits for all submitted batches.
pub fn spawn_flush_worker(
    sink: Arc<dyn TradeSink>,
    stats: Arc<IngestStats>,
    retry: CommitRetry,
) -> (FlushHandle, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Batch>();
    let handle = FlushHandle {
        tx,
        stats: Arc::clone(&stats),
    };

    let task = tokio::spawn(async move {
        while let Some(batch) = rx.recv().await {
            stats.record_dequeued();
            commit_batch(&sink, &stats, retry, batch).await;
        }
        debug!("Flush worker stopped");
    });

    (handle, task)
}

async fn commit_batch(
    sink: &Arc<dyn TradeSink>,
    stats: &IngestStats,
    retry: CommitRetry,
    batch: Batch,
) {
    let size = batch.len();
    let latest_trade_time = batch.max_trade_time();
    let Batch {
        generation,
        mut records,
    } = batch;
    let mut attempt: u32 = 0;

    loop {
        let (returned, result) = match commit_blocking(Arc::clone(sink), records).await {
            Ok(pair) => pair,
            Err(e) => {
                error!(generation, size, error = %e, "Commit task failed, batch dropped");
                stats.record_failed_batch(size);
                return;
            }
        };
        records = returned;

        match result {
            Ok(report) => {
                debug!(
                    generation,
                    inserted = report.inserted,
                    skipped = report.skipped,
                    latest_trade_time,
                    "Batch committed"
                );
                if report.skipped > 0 {
                    info!(generation, skipped = report.skipped, "Skipped duplicate trade ids");
                }
                stats.record_commit(report);
                return;
            }
            Err(e) if attempt < retry.retries => {
                attempt += 1;
                warn!(
                    generation,
                    attempt,
                    max_retries = retry.retries,
                    error = %e,
                    "Batch commit failed, retrying"
                );
                tokio::time::sleep(retry.delay).await;
            }
            Err(e) => {
                error!(generation, size, error = %e, "Batch commit failed, records dropped");
                stats.record_failed_batch(size);
                return;
            }
        }
    }
}

async fn commit_blocking(
    sink: Arc<dyn TradeSink>,
    records: Vec<TradeRecord>,
) -> Result<(Vec<TradeRecord>, Result<CommitReport>)> {
    tokio::task::spawn_blocking(move || {
        let result = sink.commit(&records);
        (records, result)
    })
    .await
    .map_err(|e| Error::Task(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit;
    use crate::testkit::store::RecordingStore;

    fn batch(generation: u64, first_id: u64, count: u64) -> Batch {
        Batch {
            generation,
            records: testkit::domain::trades(first_id, count),
        }
    }

    #[tokio::test]
    async fn batches_commit_in_submission_order() {
        let store = Arc::new(RecordingStore::new().with_commit_delay(Duration::from_millis(5)));
        let stats = Arc::new(IngestStats::default());
        let (handle, task) =
            spawn_flush_worker(store.clone(), stats.clone(), CommitRetry::default());

        for generation in 0..5 {
            handle.submit(batch(generation, generation * 3 + 1, 3)).unwrap();
        }
        drop(handle);
        task.await.unwrap();

        let firsts: Vec<u64> = store
            .committed_batches()
            .iter()
            .map(|b| b[0].id)
            .collect();
        assert_eq!(firsts, vec![1, 4, 7, 10, 13]);
        let snap = stats.snapshot();
        assert_eq!(snap.batches_flushed, 5);
        assert_eq!(snap.batches_committed, 5);
        assert_eq!(snap.rows_inserted, 15);
    }

    #[tokio::test]
    async fn failed_commit_drops_batch_and_continues() {
        let store = Arc::new(RecordingStore::new());
        store.fail_next(&["disk full"]);
        let stats = Arc::new(IngestStats::default());
        let (handle, task) =
            spawn_flush_worker(store.clone(), stats.clone(), CommitRetry::default());

        handle.submit(batch(0, 1, 4)).unwrap();
        handle.submit(batch(1, 5, 2)).unwrap();
        drop(handle);
        task.await.unwrap();

        assert_eq!(store.stored_ids(), vec![5, 6]);
        let snap = stats.snapshot();
        assert_eq!(snap.batches_failed, 1);
        assert_eq!(snap.records_lost, 4);
        assert_eq!(snap.batches_committed, 1);
    }

    #[tokio::test]
    async fn retry_recovers_transient_failure() {
        let store = Arc::new(RecordingStore::new());
        store.fail_next(&["database is locked"]);
        let stats = Arc::new(IngestStats::default());
        let retry = CommitRetry {
            retries: 2,
            delay: Duration::from_millis(1),
        };
        let (handle, task) = spawn_flush_worker(store.clone(), stats.clone(), retry);

        handle.submit(batch(0, 1, 3)).unwrap();
        drop(handle);
        task.await.unwrap();

        assert_eq!(store.attempt_count(), 2);
        assert_eq!(store.stored_ids(), vec![1, 2, 3]);
        assert_eq!(stats.snapshot().records_lost, 0);
    }

    #[tokio::test]
    async fn retries_are_bounded() {
        let store = Arc::new(RecordingStore::new());
        store.fail_next(&["a", "b", "c", "d"]);
        let stats = Arc::new(IngestStats::default());
        let retry = CommitRetry {
            retries: 2,
            delay: Duration::ZERO,
        };
        let (handle, task) = spawn_flush_worker(store.clone(), stats.clone(), retry);

        handle.submit(batch(0, 1, 2)).unwrap();
        drop(handle);
        task.await.unwrap();

        assert_eq!(store.attempt_count(), 3);
        assert!(store.stored_ids().is_empty());
        assert_eq!(stats.snapshot().records_lost, 2);
    }

    #[tokio::test]
    async fn duplicates_across_batches_are_counted_as_skipped() {
        let store = Arc::new(RecordingStore::new());
        let stats = Arc::new(IngestStats::default());
        let (handle, task) =
            spawn_flush_worker(store.clone(), stats.clone(), CommitRetry::default());

        handle.submit(batch(0, 1, 3)).unwrap();
        handle.submit(batch(1, 3, 2)).unwrap();
        drop(handle);
        task.await.unwrap();

        assert_eq!(store.stored_ids(), vec![1, 2, 3, 4]);
        let snap = stats.snapshot();
        assert_eq!(snap.rows_inserted, 4);
        assert_eq!(snap.rows_skipped, 1);
    }

    #[tokio::test]
    async fn queue_depth_tracks_backlog_behind_slow_commit() {
        let store = Arc::new(RecordingStore::new().with_commit_delay(Duration::from_millis(50)));
        let stats = Arc::new(IngestStats::default());
        let (handle, task) =
            spawn_flush_worker(store.clone(), stats.clone(), CommitRetry::default());

        for generation in 0..3 {
            handle.submit(batch(generation, generation * 2 + 1, 2)).unwrap();
        }
        // At most the first batch has been picked up; the rest wait behind it.
        assert!(stats.snapshot().batches_queued >= 2);

        drop(handle);
        task.await.unwrap();
        assert_eq!(stats.snapshot().batches_queued, 0);
        assert_eq!(store.committed_batch_sizes(), vec![2, 2, 2]);
    }

    #[test]
    fn retry_policy_from_config() {
        let config = IngestConfig {
            commit_retries: 3,
            commit_retry_delay_ms: 250,
            ..IngestConfig::default()
        };
        let retry = CommitRetry::from(&config);
        assert_eq!(retry.retries, 3);
        assert_eq!(retry.delay, Duration::from_millis(250));
    }
}
