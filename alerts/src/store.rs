//! Durable alert storage via the Supabase REST API.
//!
//! One row is inserted per whale alert, best effort: a failed insert is
//! logged and dropped, never retried and never allowed to stall ingestion.
//! Writes run on their own task behind a bounded queue so feed processing
//! never waits on store latency; the writer drains the queue one record at a
//! time, which keeps per-alert writes whole and in dispatch order.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::alert::Alert;
use crate::sink::AlertSink;

pub const WHALE_ALERTS_TABLE: &str = "whale_alerts";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Row shape of the `whale_alerts` table. `created_at` is assigned by the
/// store, not by us.
#[derive(Clone, Debug, Serialize)]
pub struct WhaleAlertRecord {
    pub symbol: String,
    pub price: f64,
    pub volume: f64,
    pub average_volume: f64,
    pub is_whale: bool,
}

impl From<&Alert> for WhaleAlertRecord {
    fn from(alert: &Alert) -> Self {
        Self {
            symbol: alert.symbol.clone(),
            price: alert.price,
            volume: alert.notional_value,
            average_volume: alert.average_notional,
            is_whale: true,
        }
    }
}

#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(url: String, api_key: String) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url: url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Single insert attempt; the caller decides what a failure means.
    pub async fn insert_alert(&self, record: &WhaleAlertRecord) -> Result<(), StoreError> {
        let endpoint = format!("{}/rest/v1/{}", self.url, WHALE_ALERTS_TABLE);

        self.http
            .post(&endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?
            .error_for_status()?;

        tracing::debug!(symbol = %record.symbol, volume = record.volume, "whale alert stored");
        Ok(())
    }
}

/// Store-backed alert sink.
///
/// `present` only enqueues; the spawned writer owns the HTTP client and
/// performs at most one outstanding insert. If the queue is full the record
/// is shed (at-most-once delivery, the feed must not back up on the store).
pub struct StoreSink {
    tx: mpsc::Sender<WhaleAlertRecord>,
}

impl StoreSink {
    pub fn spawn(client: SupabaseClient, queue_capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<WhaleAlertRecord>(queue_capacity);

        tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                if let Err(e) = client.insert_alert(&record).await {
                    tracing::warn!(symbol = %record.symbol, error = %e, "store write failed; alert dropped");
                }
            }
            tracing::debug!("store writer stopped");
        });

        Self { tx }
    }
}

#[async_trait]
impl AlertSink for StoreSink {
    fn name(&self) -> &'static str {
        "store"
    }

    async fn present(&self, alert: &Alert) -> anyhow::Result<()> {
        self.tx
            .try_send(WhaleAlertRecord::from(alert))
            .map_err(|e| anyhow::anyhow!("store queue unavailable: {e}"))
    }
}
