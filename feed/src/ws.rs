//! Websocket session against the trade-execution stream.
//!
//! The connector owns exactly one session: connect, subscribe (the stream
//! path doubles as the subscription), hand every text frame to the pipeline
//! before reading the next, and surface the closure reason to the caller.
//! Reconnecting is the supervisor's job, never the connector's.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite, tungstenite::Message};

use crate::pipeline::TradePipeline;
use crate::supervisor::TradeFeed;

pub const DEFAULT_WS_URL: &str = "wss://stream.binance.com:9443/ws";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closed,
}

/// Why a session ended. Every variant leads to the same place (supervisor
/// delay + fresh connector), but the operator wants to know which it was.
#[derive(Debug)]
pub enum ClosedReason {
    ConnectFailed(tungstenite::Error),
    ReadError(tungstenite::Error),
    RemoteClose,
}

impl std::fmt::Display for ClosedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectFailed(e) => write!(f, "connect failed: {e}"),
            Self::ReadError(e) => write!(f, "read error: {e}"),
            Self::RemoteClose => write!(f, "closed by remote"),
        }
    }
}

pub struct FeedConnector {
    ws_url: String,
    symbol: String,
    state: ConnectionState,
}

impl FeedConnector {
    /// `symbol` is lower-cased; the exchange routes stream subscriptions by
    /// lower-case instrument id.
    pub fn new(ws_url: impl Into<String>, symbol: &str) -> Self {
        Self {
            ws_url: ws_url.into(),
            symbol: symbol.to_lowercase(),
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    fn stream_url(&self) -> String {
        format!("{}/{}@trade", self.ws_url.trim_end_matches('/'), self.symbol)
    }
}

#[async_trait]
impl TradeFeed for FeedConnector {
    /// Run one session to completion. Frames are processed synchronously in
    /// arrival order; the read call itself is the backpressure point.
    async fn run(&mut self, pipeline: &mut TradePipeline) -> ClosedReason {
        self.state = ConnectionState::Connecting;
        tracing::info!(url = %self.stream_url(), "connecting to trade stream");

        let (ws, _) = match connect_async(self.stream_url()).await {
            Ok(ok) => ok,
            Err(e) => {
                self.state = ConnectionState::Closed;
                return ClosedReason::ConnectFailed(e);
            }
        };

        self.state = ConnectionState::Connected;
        println!("✅ connected: streaming {}@trade", self.symbol);
        if !pipeline.is_warmed_up() {
            println!("⏳ waiting for the trade stream to fill the window...");
        }

        let (mut write, mut read) = ws.split();

        let reason = loop {
            let msg = match read.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => break ClosedReason::ReadError(e),
                None => break ClosedReason::RemoteClose,
            };

            match msg {
                Message::Text(text) => pipeline.on_frame(text.as_str()).await,
                Message::Ping(payload) => {
                    if let Err(e) = write.send(Message::Pong(payload)).await {
                        break ClosedReason::ReadError(e);
                    }
                }
                Message::Close(frame) => {
                    tracing::info!(frame = ?frame, "remote sent close frame");
                    break ClosedReason::RemoteClose;
                }
                // binary / pong frames are not part of the trade stream
                _ => {}
            }
        };

        self.state = ConnectionState::Closed;
        reason
    }
}
