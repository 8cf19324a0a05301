//! Handler for the `latest` command: a read-only polling client.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::adapter::inbound::cli::command::LatestArgs;
use crate::adapter::inbound::cli::output;
use crate::domain::TradeRecord;
use crate::error::{Error, Result};
use crate::infrastructure::bootstrap::open_reader;
use crate::infrastructure::config::settings::Config;
use crate::port::TradeReader;

/// Execute the latest command.
pub async fn execute(args: &LatestArgs) -> Result<()> {
    let database = resolve_database(args)?;
    let reader = Arc::new(open_reader(&database)?);

    if !args.follow {
        let latest = query(&reader).await?;
        print(latest.as_ref(), args.json)?;
        return Ok(());
    }

    let mut poll = tokio::time::interval(Duration::from_millis(args.interval_ms));
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last: Option<TradeRecord> = None;

    loop {
        tokio::select! {
            _ = poll.tick() => {
                if let Some(latest) = poll_once(&reader, &mut last).await {
                    print(Some(&latest), args.json)?;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

fn resolve_database(args: &LatestArgs) -> Result<String> {
    if let Some(database) = &args.database {
        return Ok(database.to_string_lossy().into_owned());
    }
    Ok(Config::load_or_default(&args.config)?.database)
}

async fn query<R: TradeReader + 'static>(reader: &Arc<R>) -> Result<Option<TradeRecord>> {
    let reader = Arc::clone(reader);
    tokio::task::spawn_blocking(move || reader.latest_trade())
        .await
        .map_err(|e| Error::Task(e.to_string()))?
}

/// One follow-mode poll. Yields the latest trade when it differs from `last`.
/// A failed query is reported and the poll counts as unchanged.
async fn poll_once<R: TradeReader + 'static>(
    reader: &Arc<R>,
    last: &mut Option<TradeRecord>,
) -> Option<TradeRecord> {
    match query(reader).await {
        Ok(Some(latest)) if last.as_ref() != Some(&latest) => {
            *last = Some(latest);
            Some(latest)
        }
        Ok(_) => None,
        Err(e) => {
            output::error(&format!("Query failed, still polling: {e}"));
            None
        }
    }
}

fn print(trade: Option<&TradeRecord>, json: bool) -> Result<()> {
    if json {
        println!("{}", output::trade_json(trade)?);
    } else {
        match trade {
            Some(trade) => println!("{}", output::trade_line(trade)),
            None => println!("no trades recorded yet"),
        }
    }
    Ok(())
}
