//! In-memory accumulation of decoded trades.

use std::num::NonZeroUsize;

use crate::domain::{Batch, TradeRecord};
use crate::error::Result;

use super::flusher::FlushHandle;

/// Pending records plus the count-based flush policy.
///
/// Each drain swaps the pending vector for a fresh one and bumps the
/// generation, so a record belongs to exactly one batch.
#[derive(Debug)]
pub struct IngestBuffer {
    threshold: NonZeroUsize,
    pending: Vec<TradeRecord>,
    generation: u64,
}

impl IngestBuffer {
    #[must_use]
    pub fn new(threshold: NonZeroUsize) -> Self {
        Self {
            threshold,
            pending: Self::fresh(threshold),
            generation: 0,
        }
    }

    fn fresh(threshold: NonZeroUsize) -> Vec<TradeRecord> {
        Vec::with_capacity(threshold.get().saturating_add(1))
    }

    pub fn offer(&mut self, record: TradeRecord) {
        self.pending.push(record);
    }

    /// True once the pending count exceeds the threshold.
    #[must_use]
    pub fn should_flush(&self) -> bool {
        self.pending.len() > self.threshold.get()
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn threshold(&self) -> NonZeroUsize {
        self.threshold
    }

    /// Generation the next drained batch will carry.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Swap out the pending records. Returns `None` when nothing is pending.
    pub fn drain(&mut self) -> Option<Batch> {
        if self.pending.is_empty() {
            return None;
        }
        let records = std::mem::replace(&mut self.pending, Self::fresh(self.threshold));
        let batch = Batch {
            generation: self.generation,
            records,
        };
        self.generation += 1;
        Some(batch)
    }

    /// Drain and queue the batch for commit. Returns the number of records
    /// handed off.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush worker has stopped.
    pub fn drain_and_flush(&mut self, flusher: &FlushHandle) -> Result<usize> {
        match self.drain() {
            Some(batch) => {
                let len = batch.len();
                flusher.submit(batch)?;
                Ok(len)
            }
            None => Ok(0),
        }
    }
}
