//! Atomic batch writer for the trades table.

use diesel::prelude::*;
use tracing::{debug, warn};

use super::database::model::TradeRow;
use super::database::schema::trades;
use super::database::DbPool;
use crate::domain::{CommitReport, TradeRecord};
use crate::error::{Result, StorageError};
use crate::port::TradeSink;

/// Commits each batch in one immediate transaction.
///
/// Rows whose id already exists are skipped; the rest of the batch still
/// commits.
#[derive(Clone, Debug)]
pub struct SqliteTradeWriter {
    pool: DbPool,
}

impl SqliteTradeWriter {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl TradeSink for SqliteTradeWriter {
    fn commit(&self, records: &[TradeRecord]) -> Result<CommitReport> {
        if records.is_empty() {
            return Ok(CommitReport::default());
        }

        let rows = records
            .iter()
            .map(TradeRow::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut conn = self
            .pool
            .get()
            .map_err(|e| StorageError::Pool(e.to_string()))?;

        let inserted = conn
            .immediate_transaction(|conn| {
                let mut inserted = 0;
                for row in &rows {
                    inserted += diesel::insert_or_ignore_into(trades::table)
                        .values(row)
                        .execute(conn)?;
                }
                Ok::<_, diesel::result::Error>(inserted)
            })
            .map_err(|e| {
                warn!(error = %e, rows = rows.len(), "Batch transaction rolled back");
                StorageError::Commit(e.to_string())
            })?;

        let report = CommitReport {
            inserted,
            skipped: rows.len() - inserted,
        };
        debug!(
            inserted = report.inserted,
            skipped = report.skipped,
            "Batch committed"
        );
        Ok(report)
    }
}
