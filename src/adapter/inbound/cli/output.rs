//! Terminal output helpers.
//!
//! Human-readable lines go to stdout with colors only when stdout supports
//! them; errors go to stderr.

use std::fmt::Display;

use owo_colors::{OwoColorize, Stream};

use crate::domain::{IngestSnapshot, TradeRecord};

/// Print a section header.
pub fn section(title: &str) {
    println!();
    println!("{}", title.if_supports_color(Stream::Stdout, |t| t.bold()));
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    println!(
        "  {:<16} {}",
        label.if_supports_color(Stream::Stdout, |t| t.dimmed()),
        value
    );
}

/// Print a success line.
pub fn success(message: &str) {
    println!(
        "  {} {}",
        "✓".if_supports_color(Stream::Stdout, |t| t.green()),
        message
    );
}

/// Print an error line.
pub fn error(message: &str) {
    eprintln!(
        "  {} {}",
        "×".if_supports_color(Stream::Stderr, |t| t.red()),
        message
    );
}

/// One-line rendering of a trade for `latest`.
#[must_use]
pub fn trade_line(trade: &TradeRecord) -> String {
    let time = trade.traded_at().map_or_else(
        || format!("{} ms", trade.trade_time),
        |t| t.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string(),
    );
    format!("{time}  {}", trade.price)
}

/// JSON rendering of a trade for `latest --json`: `{"trade_time":..,"price":..}`,
/// or `null` when the table is empty.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn trade_json(trade: Option<&TradeRecord>) -> serde_json::Result<String> {
    serde_json::to_string(&trade.map(TradeRecord::price_point))
}

/// Print the end-of-run counters.
pub fn run_summary(snapshot: &IngestSnapshot) {
    section("Ingest Summary");
    field("Trades decoded", snapshot.trades_decoded);
    field("Malformed", snapshot.frames_dropped);
    field("Reconnects", snapshot.reconnects);
    field("Batches", snapshot.batches_committed);
    field("Rows inserted", snapshot.rows_inserted);
    field("Duplicates", snapshot.rows_skipped);
    if snapshot.records_lost > 0 {
        field("Records lost", snapshot.records_lost);
    }
}
