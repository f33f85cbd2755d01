use std::sync::Arc;

use async_trait::async_trait;

use crate::alert::Alert;

/// A downstream consumer of whale alerts.
///
/// Sinks are untrusted from the pipeline's point of view: whatever a sink
/// returns or does, ingestion of the next trade must not be affected. The
/// dispatcher enforces that; implementations just report failures as `Err`.
#[async_trait]
pub trait AlertSink: Send + Sync {
    fn name(&self) -> &'static str;

    /// Deliver one alert. A returned error is logged by the dispatcher and
    /// goes no further.
    async fn present(&self, alert: &Alert) -> anyhow::Result<()>;

    /// Liveness mark for a non-whale trade once the window is warm. Only
    /// presentation sinks care; the default is a no-op.
    fn heartbeat(&self) {}
}

/// Ordered fan-out of alerts to all registered sinks.
///
/// Each sink call is isolated: a failing sink is logged once per occurrence
/// and never prevents the remaining sinks from running, nor does any failure
/// propagate back to the ingestion path.
#[derive(Default)]
pub struct AlertDispatcher {
    sinks: Vec<Arc<dyn AlertSink>>,
}

impl AlertDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_sink(&mut self, sink: Arc<dyn AlertSink>) {
        self.sinks.push(sink);
    }

    pub async fn dispatch(&self, alert: &Alert) {
        for sink in &self.sinks {
            if let Err(e) = sink.present(alert).await {
                tracing::warn!(
                    sink = sink.name(),
                    symbol = %alert.symbol,
                    error = %e,
                    "alert sink failed; continuing"
                );
            }
        }
    }

    pub fn heartbeat(&self) {
        for sink in &self.sinks {
            sink.heartbeat();
        }
    }
}
