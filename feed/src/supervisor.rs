//! Reconnect supervision.
//!
//! The supervisor owns the pipeline (so window history survives reconnects)
//! and drives sessions in an iterative loop: build a fresh feed, run it
//! until it closes, wait a fixed delay, repeat. Deliberately a loop and not
//! a recursive restart, and deliberately no backoff: the feed is assumed
//! highly available and the process is a daemon with no retry cap.

use std::time::Duration;

use async_trait::async_trait;

use common::logger::TraceId;

use crate::metrics::Counters;
use crate::pipeline::TradePipeline;
use crate::ws::ClosedReason;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// One runnable feed session. `FeedConnector` is the real implementation;
/// tests script their own.
#[async_trait]
pub trait TradeFeed: Send {
    async fn run(&mut self, pipeline: &mut TradePipeline) -> ClosedReason;
}

pub struct Supervisor<F, C>
where
    F: FnMut() -> C + Send,
    C: TradeFeed,
{
    make_feed: F,
    pipeline: TradePipeline,
    reconnect_delay: Duration,
    counters: Counters,
}

impl<F, C> Supervisor<F, C>
where
    F: FnMut() -> C + Send,
    C: TradeFeed,
{
    pub fn new(
        make_feed: F,
        pipeline: TradePipeline,
        reconnect_delay: Duration,
        counters: Counters,
    ) -> Self {
        Self {
            make_feed,
            pipeline,
            reconnect_delay,
            counters,
        }
    }

    /// Run forever. A first failed connection attempt is handled the same
    /// way as a dropped session: log, wait, rebuild.
    pub async fn run(mut self) {
        loop {
            let session = TraceId::default();
            tracing::info!(session = %session.to_short(), "starting feed session");

            let mut feed = (self.make_feed)();
            let reason = feed.run(&mut self.pipeline).await;

            Counters::bump(&self.counters.reconnects);
            tracing::warn!(
                session = %session.to_short(),
                reason = %reason,
                trades_seen = Counters::get(&self.counters.trades_seen),
                parse_failures = Counters::get(&self.counters.parse_failures),
                whales_flagged = Counters::get(&self.counters.whales_flagged),
                reconnects = Counters::get(&self.counters.reconnects),
                delay_secs = self.reconnect_delay.as_secs(),
                "feed session closed; reconnecting after delay"
            );

            tokio::time::sleep(self.reconnect_delay).await;
        }
    }
}
