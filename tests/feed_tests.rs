//! Binance stream client against a local scripted WebSocket server.

mod support;

use std::time::Duration;

use support::ws_server::{MockFeedServer, Step};
use support::wait_for;
use tokio::time::timeout;
use tradetape::adapter::outbound::binance::BinanceAggTradeStream;
use tradetape::domain::TradeRecord;
use tradetape::error::DecodeError;
use tradetape::infrastructure::exchange::ReconnectingFeed;
use tradetape::port::{FeedEvent, TradeFeed};
use tradetape::testkit;

const LIMIT: Duration = Duration::from_secs(5);

fn frame(id: u64, trade_time: u64) -> Step {
    Step::Text(testkit::domain::agg_trade_frame(&TradeRecord::new(
        id, trade_time, 37_000.0, 0.01,
    )))
}

async fn next(feed: &mut impl TradeFeed) -> FeedEvent {
    timeout(LIMIT, feed.next_event())
        .await
        .expect("event in time")
        .expect("feed connected")
}

#[tokio::test]
async fn decodes_frames_in_arrival_order() {
    let server = MockFeedServer::start(vec![vec![
        frame(1, 100),
        frame(2, 101),
        Step::Text(testkit::domain::frame_without_price(3, 102)),
        frame(4, 103),
    ]])
    .await;

    let mut stream = BinanceAggTradeStream::new(server.endpoint());
    stream.connect().await.unwrap();
    assert!(stream.is_connected());

    assert!(matches!(next(&mut stream).await, FeedEvent::Trade(t) if t.id == 1));
    assert!(matches!(next(&mut stream).await, FeedEvent::Trade(t) if t.id == 2));
    match next(&mut stream).await {
        FeedEvent::Malformed {
            error: DecodeError::Json(e),
            ..
        } => assert!(e.to_string().contains("missing field `p`")),
        other => panic!("expected malformed frame, got {other:?}"),
    }
    assert!(matches!(next(&mut stream).await, FeedEvent::Trade(t) if t.id == 4));
}

#[tokio::test]
async fn server_close_is_a_disconnect() {
    let server = MockFeedServer::start(vec![vec![frame(1, 100), Step::Close]]).await;

    let mut stream = BinanceAggTradeStream::new(server.endpoint());
    stream.connect().await.unwrap();

    assert!(matches!(next(&mut stream).await, FeedEvent::Trade(_)));
    assert!(matches!(
        next(&mut stream).await,
        FeedEvent::Disconnected { .. }
    ));
    assert!(!stream.is_connected());
    assert!(stream.next_event().await.is_none());
}

#[tokio::test]
async fn abrupt_drop_is_a_disconnect() {
    let server = MockFeedServer::start(vec![vec![Step::Drop]]).await;

    let mut stream = BinanceAggTradeStream::new(server.endpoint());
    stream.connect().await.unwrap();

    assert!(matches!(
        next(&mut stream).await,
        FeedEvent::Disconnected { .. }
    ));
    assert!(!stream.is_connected());
}

#[tokio::test]
async fn silence_beyond_idle_timeout_is_a_disconnect() {
    let server = MockFeedServer::start(vec![vec![frame(1, 100)]]).await;

    let mut stream = BinanceAggTradeStream::new(server.endpoint())
        .with_idle_timeout(Some(Duration::from_millis(100)));
    stream.connect().await.unwrap();

    assert!(matches!(next(&mut stream).await, FeedEvent::Trade(_)));
    match next(&mut stream).await {
        FeedEvent::Disconnected { reason } => assert_eq!(reason, "idle timeout"),
        other => panic!("expected idle disconnect, got {other:?}"),
    }
}

#[tokio::test]
async fn pings_are_answered_without_surfacing() {
    let server = MockFeedServer::start(vec![vec![Step::Ping, frame(1, 100)]]).await;

    let mut stream = BinanceAggTradeStream::new(server.endpoint());
    stream.connect().await.unwrap();

    assert!(matches!(next(&mut stream).await, FeedEvent::Trade(t) if t.id == 1));
    assert!(wait_for(LIMIT, || server.pongs() >= 1).await);
}

#[tokio::test]
async fn reconnecting_feed_resumes_after_server_close() {
    let server = MockFeedServer::start(vec![
        vec![frame(1, 100), Step::Close],
        vec![frame(2, 200)],
    ])
    .await;

    let stream = BinanceAggTradeStream::new(server.endpoint());
    let mut feed = ReconnectingFeed::new(stream, testkit::config::reconnection());
    feed.connect().await.unwrap();

    assert!(matches!(next(&mut feed).await, FeedEvent::Trade(t) if t.id == 1));
    assert!(matches!(next(&mut feed).await, FeedEvent::Trade(t) if t.id == 2));
    assert_eq!(server.connections(), 2);
}

#[tokio::test]
async fn quiet_connection_stays_pending() {
    let server = MockFeedServer::start(vec![vec![]]).await;

    let mut stream = BinanceAggTradeStream::new(server.endpoint());
    stream.connect().await.unwrap();

    let mut read = tokio_test::task::spawn(stream.next_event());
    tokio_test::assert_pending!(read.poll());
}
