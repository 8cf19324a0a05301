//! In-memory trade store for pipeline tests.
//!
//! Mirrors the SQLite writer's contract: rows are keyed by id, duplicates are
//! skipped, and a failed commit leaves nothing behind.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::{CommitReport, TradeRecord};
use crate::error::{Result, StorageError};
use crate::port::{TradeReader, TradeSink};

#[derive(Default)]
struct StoreState {
    rows: BTreeMap<u64, TradeRecord>,
    /// Every commit attempt in call order, successful or not.
    attempts: Vec<Vec<TradeRecord>>,
    /// Records of the commits that succeeded, in call order.
    committed: Vec<Vec<TradeRecord>>,
    failures: VecDeque<String>,
    read_failures: VecDeque<String>,
}

/// A [`TradeSink`] + [`TradeReader`] backed by a map.
#[derive(Default)]
pub struct RecordingStore {
    state: Mutex<StoreState>,
    commit_delay: Option<Duration>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block each commit for `delay`, simulating slow storage.
    pub fn with_commit_delay(mut self, delay: Duration) -> Self {
        self.commit_delay = Some(delay);
        self
    }

    /// Make the next commit calls fail, one per reason.
    pub fn fail_next(&self, reasons: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state
            .failures
            .extend(reasons.iter().map(|r| (*r).to_string()));
    }

    pub fn stored_ids(&self) -> Vec<u64> {
        self.state.lock().unwrap().rows.keys().copied().collect()
    }

    /// Sizes of the successfully committed batches, in commit order.
    /// Make the next `latest_trade` calls fail, one per reason.
    pub fn fail_next_reads(&self, reasons: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state
            .read_failures
            .extend(reasons.iter().map(|r| (*r).to_string()));
    }

    pub fn committed_batch_sizes(&self) -> Vec<usize> {
        self.state
            .lock()
            .unwrap()
            .committed
            .iter()
            .map(Vec::len)
            .collect()
    }

    pub fn committed_batches(&self) -> Vec<Vec<TradeRecord>> {
        self.state.lock().unwrap().committed.clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.state.lock().unwrap().attempts.len()
    }
}

impl TradeSink for RecordingStore {
    fn commit(&self, records: &[TradeRecord]) -> Result<CommitReport> {
        if let Some(delay) = self.commit_delay {
            std::thread::sleep(delay);
        }
        if records.is_empty() {
            return Ok(CommitReport::default());
        }

        let mut state = self.state.lock().unwrap();
        state.attempts.push(records.to_vec());
        if let Some(reason) = state.failures.pop_front() {
            return Err(StorageError::Commit(reason).into());
        }

        let mut report = CommitReport::default();
        for record in records {
            if state.rows.contains_key(&record.id) {
                report.skipped += 1;
            } else {
                state.rows.insert(record.id, *record);
                report.inserted += 1;
            }
        }
        state.committed.push(records.to_vec());
        Ok(report)
    }
}

impl TradeReader for RecordingStore {
    fn latest_trade(&self) -> Result<Option<TradeRecord>> {
        let mut state = self.state.lock().unwrap();
        if let Some(reason) = state.read_failures.pop_front() {
            return Err(StorageError::Query(reason).into());
        }
        Ok(state
            .rows
            .values()
            .max_by_key(|r| (r.trade_time, r.id))
            .copied())
    }

    fn trade_count(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().rows.len() as u64)
    }
}
