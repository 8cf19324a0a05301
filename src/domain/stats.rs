//! Ingest statistics.
//!
//! Counters are shared between the receive loop and the flush worker, so they
//! are lock-free atomics. [`IngestSnapshot`] is the plain copy used for logging
//! and the run summary.

use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome of one successful batch commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Rows that became visible.
    pub inserted: usize,
    /// Rows skipped because their id was already stored.
    pub skipped: usize,
}

/// Live ingest counters.
#[derive(Debug, Default)]
pub struct IngestStats {
    frames_received: AtomicU64,
    trades_decoded: AtomicU64,
    frames_dropped: AtomicU64,
    reconnects: AtomicU64,
    batches_flushed: AtomicU64,
    batches_committed: AtomicU64,
    batches_failed: AtomicU64,
    rows_inserted: AtomicU64,
    rows_skipped: AtomicU64,
    records_lost: AtomicU64,
    /// Batches handed to the flush worker and not yet picked up.
    batches_queued: AtomicU64,
}

impl IngestStats {
    pub fn record_frame(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_trade(&self) {
        self.trades_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_flush(&self) {
        self.batches_flushed.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a batch entering the flush queue. Returns the new depth.
    pub fn record_queued(&self) -> u64 {
        self.batches_queued.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_dequeued(&self) {
        // Floors at zero.
        let _ = self
            .batches_queued
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub fn record_commit(&self, report: CommitReport) {
        self.batches_committed.fetch_add(1, Ordering::Relaxed);
        self.rows_inserted
            .fetch_add(report.inserted as u64, Ordering::Relaxed);
        self.rows_skipped
            .fetch_add(report.skipped as u64, Ordering::Relaxed);
    }

    pub fn record_failed_batch(&self, records: usize) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
        self.records_lost
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> IngestSnapshot {
        IngestSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            trades_decoded: self.trades_decoded.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
            batches_flushed: self.batches_flushed.load(Ordering::Relaxed),
            batches_committed: self.batches_committed.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            rows_inserted: self.rows_inserted.load(Ordering::Relaxed),
            rows_skipped: self.rows_skipped.load(Ordering::Relaxed),
            records_lost: self.records_lost.load(Ordering::Relaxed),
            batches_queued: self.batches_queued.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`IngestStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSnapshot {
    pub frames_received: u64,
    pub trades_decoded: u64,
    pub frames_dropped: u64,
    pub reconnects: u64,
    pub batches_flushed: u64,
    pub batches_committed: u64,
    pub batches_failed: u64,
    pub rows_inserted: u64,
    pub rows_skipped: u64,
    pub records_lost: u64,
    pub batches_queued: u64,
}
