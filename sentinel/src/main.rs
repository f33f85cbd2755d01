mod config;

use std::sync::Arc;

use alerts::{AlertDispatcher, ConsoleSink, StoreSink, SupabaseClient};
use common::logger::init_logger;
use detector::WindowStatistics;
use feed::{Counters, FeedConnector, Supervisor, TradeParser, TradePipeline};

use crate::config::SentinelConfig;

/// Pending store writes allowed before records are shed.
const STORE_QUEUE_CAPACITY: usize = 64;

/// Exit code for unusable startup configuration.
const EXIT_CONFIG: i32 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger("sentinel");

    // Missing store credentials must be reported before any connection
    // attempt; every other failure mode keeps the daemon alive.
    let cfg = match SentinelConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "configuration error; refusing to start");
            std::process::exit(EXIT_CONFIG);
        }
    };

    tracing::info!(
        symbol = %cfg.symbol,
        window_size = cfg.window_size,
        threshold_multiplier = cfg.threshold_multiplier,
        reconnect_delay_secs = cfg.reconnect_delay.as_secs(),
        "starting market sentinel"
    );

    let store = SupabaseClient::new(cfg.supabase_url.clone(), cfg.supabase_key.clone())?;

    let mut dispatcher = AlertDispatcher::new();
    dispatcher.push_sink(Arc::new(ConsoleSink::new()));
    dispatcher.push_sink(Arc::new(StoreSink::spawn(store, STORE_QUEUE_CAPACITY)));

    let counters = Counters::default();

    let pipeline = TradePipeline::new(
        TradeParser::new(cfg.symbol.clone()),
        WindowStatistics::new(cfg.window_size),
        cfg.threshold_multiplier,
        dispatcher,
        counters.clone(),
    );

    let ws_url = cfg.ws_url.clone();
    let symbol = cfg.symbol.clone();
    let supervisor = Supervisor::new(
        move || FeedConnector::new(ws_url.clone(), &symbol),
        pipeline,
        cfg.reconnect_delay,
        counters,
    );

    tokio::select! {
        _ = supervisor.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}
