#![allow(dead_code)]

pub mod temp_db;
pub mod ws_server;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tradetape::application::ingest::IngestPipeline;
use tradetape::domain::{IngestSnapshot, IngestStats};
use tradetape::infrastructure::config::ingest::IngestConfig;
use tradetape::port::{TradeFeed, TradeSink};

/// Run a pipeline until the scripted feed is exhausted, then shut it down and
/// return the final counters.
pub async fn run_until_exhausted<F>(
    feed: F,
    exhausted: Arc<Notify>,
    sink: Arc<dyn TradeSink>,
    config: &IngestConfig,
) -> IngestSnapshot
where
    F: TradeFeed + 'static,
{
    let pipeline = IngestPipeline::new(feed, sink, config, Arc::new(IngestStats::default()))
        .expect("build pipeline");
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(pipeline.run(rx));

    tokio::time::timeout(Duration::from_secs(5), exhausted.notified())
        .await
        .expect("feed exhausted in time");
    tx.send(true).expect("send shutdown");

    task.await.expect("pipeline task").expect("pipeline run")
}

/// Poll `check` until it returns true or `limit` elapses.
pub async fn wait_for(limit: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    loop {
        if check() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
