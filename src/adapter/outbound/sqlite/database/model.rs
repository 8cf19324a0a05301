//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::trades;
use crate::domain::TradeRecord;
use crate::error::StorageError;

/// Database row for an aggregate trade.
///
/// SQLite integers are signed, so ids and timestamps are range-checked on the
/// way in and on the way out.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, Copy, PartialEq)]
#[diesel(table_name = trades)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TradeRow {
    pub id: i64,
    pub trade_time: i64,
    pub price: f64,
    pub quantity: f64,
}

fn to_column(field: &'static str, value: u64) -> Result<i64, StorageError> {
    i64::try_from(value).map_err(|_| StorageError::OutOfRange {
        field,
        value: value.to_string(),
    })
}

fn from_column(field: &'static str, value: i64) -> Result<u64, StorageError> {
    u64::try_from(value).map_err(|_| StorageError::OutOfRange {
        field,
        value: value.to_string(),
    })
}

impl TryFrom<&TradeRecord> for TradeRow {
    type Error = StorageError;

    fn try_from(record: &TradeRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: to_column("id", record.id)?,
            trade_time: to_column("trade_time", record.trade_time)?,
            price: record.price,
            quantity: record.quantity,
        })
    }
}

impl TryFrom<TradeRow> for TradeRecord {
    type Error = StorageError;

    fn try_from(row: TradeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: from_column("id", row.id)?,
            trade_time: from_column("trade_time", row.trade_time)?,
            price: row.price,
            quantity: row.quantity,
        })
    }
}
