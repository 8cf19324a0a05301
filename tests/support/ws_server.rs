//! Scripted local WebSocket server standing in for the exchange.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

/// One server action within a connection.
#[derive(Debug, Clone)]
pub enum Step {
    Text(String),
    Ping,
    /// Send a close frame and end the session.
    Close,
    /// Drop the TCP connection without a close frame.
    Drop,
}

/// Each accepted connection runs the next script. Once its steps are done
/// (or when no scripts are left) the connection is held open silently.
pub struct MockFeedServer {
    pub base_url: String,
    connections: Arc<AtomicUsize>,
    pongs: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl MockFeedServer {
    pub async fn start(scripts: Vec<Vec<Step>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let scripts = Arc::new(Mutex::new(VecDeque::from(scripts)));
        let connections = Arc::new(AtomicUsize::new(0));
        let pongs = Arc::new(AtomicUsize::new(0));

        let task = {
            let connections = connections.clone();
            let pongs = pongs.clone();
            tokio::spawn(async move {
                while let Ok((tcp, _)) = listener.accept().await {
                    let script = scripts.lock().unwrap().pop_front().unwrap_or_default();
                    connections.fetch_add(1, Ordering::SeqCst);
                    let pongs = pongs.clone();
                    tokio::spawn(async move {
                        let Ok(mut ws) = tokio_tungstenite::accept_async(tcp).await else {
                            return;
                        };
                        for step in script {
                            match step {
                                Step::Text(text) => {
                                    if ws.send(Message::Text(text)).await.is_err() {
                                        return;
                                    }
                                }
                                Step::Ping => {
                                    if ws.send(Message::Ping(vec![7, 7])).await.is_err() {
                                        return;
                                    }
                                }
                                Step::Close => {
                                    let _ = ws.close(None).await;
                                    while let Some(Ok(_)) = ws.next().await {}
                                    return;
                                }
                                Step::Drop => return,
                            }
                        }
                        while let Some(Ok(message)) = ws.next().await {
                            if matches!(message, Message::Pong(_)) {
                                pongs.fetch_add(1, Ordering::SeqCst);
                            }
                        }
                    });
                }
            })
        };

        Self {
            base_url: format!("ws://{addr}"),
            connections,
            pongs,
            task,
        }
    }

    /// Endpoint for the raw `<symbol>@aggTrade` stream.
    pub fn endpoint(&self) -> String {
        format!("{}/btcusdt@aggTrade", self.base_url)
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn pongs(&self) -> usize {
        self.pongs.load(Ordering::SeqCst)
    }
}

impl Drop for MockFeedServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
