//! Per-frame processing path.
//!
//! Frames travel strictly in arrival order: decode, push the notional into
//! the rolling window, judge the trade, then dispatch an alert or a
//! heartbeat. The connector hands frames over one at a time and does not
//! read ahead, so the window is mutated by a single consumer and needs no
//! locking.

use alerts::{Alert, AlertDispatcher};
use detector::{WindowStatistics, is_whale};

use crate::metrics::Counters;
use crate::trade::TradeParser;

pub struct TradePipeline {
    parser: TradeParser,
    window: WindowStatistics,
    threshold_multiplier: f64,
    dispatcher: AlertDispatcher,
    counters: Counters,
    /// Mean as of the previous push. A trade is judged against the average
    /// of the trades that preceded it, not against an average it is already
    /// part of; its own notional enters the window in the same step.
    last_average: Option<f64>,
}

impl TradePipeline {
    pub fn new(
        parser: TradeParser,
        window: WindowStatistics,
        threshold_multiplier: f64,
        dispatcher: AlertDispatcher,
        counters: Counters,
    ) -> Self {
        Self {
            parser,
            window,
            threshold_multiplier,
            dispatcher,
            counters,
            last_average: None,
        }
    }

    /// True once the window has filled. Survives reconnects because the
    /// supervisor keeps the pipeline alive across connector rebuilds.
    pub fn is_warmed_up(&self) -> bool {
        self.window.is_full()
    }

    /// Handle one raw feed frame.
    ///
    /// Never returns an error: a frame that fails to decode is logged,
    /// counted and skipped, and must leave the window untouched so the
    /// surrounding valid trades are unaffected.
    pub async fn on_frame(&mut self, raw: &str) {
        let trade = match self.parser.parse(raw) {
            Ok(trade) => trade,
            Err(e) => {
                Counters::bump(&self.counters.parse_failures);
                tracing::warn!(error = %e, "skipping undecodable feed frame");
                return;
            }
        };

        Counters::bump(&self.counters.trades_seen);

        let average = self.window.push(trade.notional_value);

        if let Some(avg) = self.last_average {
            if is_whale(trade.notional_value, avg, self.threshold_multiplier) {
                Counters::bump(&self.counters.whales_flagged);
                tracing::info!(
                    symbol = %trade.symbol,
                    notional = trade.notional_value,
                    average = avg,
                    "whale trade flagged"
                );

                let alert = Alert {
                    symbol: trade.symbol,
                    price: trade.price,
                    notional_value: trade.notional_value,
                    average_notional: avg,
                    event_time_ms: trade.event_time_ms,
                };
                self.dispatcher.dispatch(&alert).await;
            } else {
                self.dispatcher.heartbeat();
            }
        }

        self.last_average = average;
    }
}
