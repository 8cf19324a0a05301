//! Read side of the trades table.

use diesel::prelude::*;

use super::database::model::TradeRow;
use super::database::schema::trades;
use super::database::DbPool;
use crate::domain::TradeRecord;
use crate::error::{Result, StorageError};
use crate::port::TradeReader;

/// Queries committed trades.
///
/// Under WAL each query sees the last committed snapshot, so a batch in
/// flight is either entirely visible or not at all.
#[derive(Clone, Debug)]
pub struct SqliteTradeReader {
    pool: DbPool,
}

impl SqliteTradeReader {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl TradeReader for SqliteTradeReader {
    fn latest_trade(&self) -> Result<Option<TradeRecord>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| StorageError::Pool(e.to_string()))?;

        let row = trades::table
            .order((trades::trade_time.desc(), trades::id.desc()))
            .select(TradeRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| StorageError::Query(e.to_string()))?;

        Ok(row.map(TradeRecord::try_from).transpose()?)
    }

    fn trade_count(&self) -> Result<u64> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| StorageError::Pool(e.to_string()))?;

        let count: i64 = trades::table
            .count()
            .get_result(&mut conn)
            .map_err(|e| StorageError::Query(e.to_string()))?;

        u64::try_from(count).map_err(|_| {
            StorageError::OutOfRange {
                field: "count",
                value: count.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::{create_pool, initialize_schema};
    use crate::adapter::outbound::sqlite::writer::SqliteTradeWriter;
    use crate::port::TradeSink;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SqliteTradeWriter, SqliteTradeReader) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.db");
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        initialize_schema(&pool).unwrap();
        (
            dir,
            SqliteTradeWriter::new(pool.clone()),
            SqliteTradeReader::new(pool),
        )
    }

    #[test]
    fn empty_table_has_no_latest() {
        let (_dir, _writer, reader) = setup();
        assert!(reader.latest_trade().unwrap().is_none());
        assert_eq!(reader.trade_count().unwrap(), 0);
    }

    #[test]
    fn latest_is_by_trade_time_not_insertion_order() {
        let (_dir, writer, reader) = setup();
        writer
            .commit(&[
                TradeRecord::new(1, 100, 10.0, 1.0),
                TradeRecord::new(2, 200, 20.0, 1.0),
                TradeRecord::new(3, 150, 15.0, 1.0),
            ])
            .unwrap();

        let latest = reader.latest_trade().unwrap().unwrap();
        assert_eq!(latest.trade_time, 200);
        assert_eq!(latest.price, 20.0);
    }

    #[test]
    fn tie_on_trade_time_resolves_to_highest_id() {
        let (_dir, writer, reader) = setup();
        writer
            .commit(&[
                TradeRecord::new(5, 100, 10.0, 1.0),
                TradeRecord::new(9, 100, 11.0, 1.0),
            ])
            .unwrap();
        assert_eq!(reader.latest_trade().unwrap().unwrap().id, 9);
    }

    #[test]
    fn read_sees_later_batches() {
        let (_dir, writer, reader) = setup();
        writer.commit(&[TradeRecord::new(1, 100, 10.0, 1.0)]).unwrap();
        assert_eq!(reader.latest_trade().unwrap().unwrap().price, 10.0);

        writer.commit(&[TradeRecord::new(2, 300, 30.0, 1.0)]).unwrap();
        let latest = reader.latest_trade().unwrap().unwrap();
        assert_eq!(latest.price_point().trade_time, 300);
        assert_eq!(reader.trade_count().unwrap(), 2);
    }
}
