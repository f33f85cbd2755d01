use std::time::Duration;

use thiserror::Error;

use detector::classifier::DEFAULT_THRESHOLD_MULTIPLIER;
use detector::window::DEFAULT_WINDOW_SIZE;
use feed::supervisor::DEFAULT_RECONNECT_DELAY;
use feed::ws::DEFAULT_WS_URL;

/// Startup configuration, read once from the environment.
///
/// Feed settings all have documented defaults; only the store credentials
/// are required, and their absence is fatal before any connection attempt.
#[derive(Clone, Debug)]
pub struct SentinelConfig {
    /// Instrument to subscribe, lower-cased. Default `btcusdt`.
    pub symbol: String,

    /// Websocket base URL of the trade feed.
    pub ws_url: String,

    /// A trade this many times the rolling average is a whale. Default 10.
    pub threshold_multiplier: f64,

    /// Number of recent notionals in the rolling window. Default 100.
    pub window_size: usize,

    /// Fixed wait between reconnect attempts. Default 5s.
    pub reconnect_delay: Duration,

    /// Supabase project URL. Required.
    pub supabase_url: String,

    /// Supabase service key. Required.
    pub supabase_key: String,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable `{0}`")]
    MissingVar(&'static str),

    #[error("invalid value for `{var}`: `{value}`")]
    InvalidVar { var: &'static str, value: String },
}

impl SentinelConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let supabase_url =
            std::env::var("SUPABASE_URL").map_err(|_| ConfigError::MissingVar("SUPABASE_URL"))?;
        let supabase_key =
            std::env::var("SUPABASE_KEY").map_err(|_| ConfigError::MissingVar("SUPABASE_KEY"))?;

        let symbol = std::env::var("SYMBOL")
            .unwrap_or_else(|_| "btcusdt".to_string())
            .to_lowercase();

        let ws_url = std::env::var("FEED_WS_URL").unwrap_or_else(|_| DEFAULT_WS_URL.to_string());

        let threshold_multiplier =
            parse_var("THRESHOLD_MULTIPLIER", DEFAULT_THRESHOLD_MULTIPLIER)?;
        let window_size: usize = parse_var("WINDOW_SIZE", DEFAULT_WINDOW_SIZE)?;
        let reconnect_delay_secs: u64 =
            parse_var("RECONNECT_DELAY_SECS", DEFAULT_RECONNECT_DELAY.as_secs())?;

        if window_size == 0 {
            return Err(ConfigError::InvalidVar {
                var: "WINDOW_SIZE",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            symbol,
            ws_url,
            threshold_multiplier,
            window_size,
            reconnect_delay: Duration::from_secs(reconnect_delay_secs),
            supabase_url,
            supabase_key,
        })
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidVar { var, value: raw }),
        Err(_) => Ok(default),
    }
}
