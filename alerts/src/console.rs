use std::io::Write;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::alert::Alert;
use crate::sink::AlertSink;

/// Operator-facing presenter: a visually distinct block per alert and a
/// single flushed dot per quiet trade so the operator can tell a healthy
/// stream from a stalled one.
#[derive(Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }

    fn format_time(event_time_ms: i64) -> String {
        match Utc.timestamp_millis_opt(event_time_ms).single() {
            Some(ts) => ts.format("%H:%M:%S").to_string(),
            None => format!("t={event_time_ms}ms"),
        }
    }

    /// `1234567.891` -> `"1,234,567.89"`
    fn format_usd(value: f64) -> String {
        let raw = format!("{value:.2}");
        let (whole, cents) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));
        let (sign, digits) = match whole.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", whole),
        };

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        format!("{sign}{grouped}.{cents}")
    }
}

#[async_trait]
impl AlertSink for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn present(&self, alert: &Alert) -> anyhow::Result<()> {
        println!("\n{}", "=".repeat(50));
        println!(
            "🚨 WHALE DETECTED AT {} [{}]",
            Self::format_time(alert.event_time_ms),
            alert.symbol.to_uppercase()
        );
        println!("💰 Trade Value: ${}", Self::format_usd(alert.notional_value));
        println!("📊 Average was: ${}", Self::format_usd(alert.average_notional));
        println!("📈 Price: ${}", Self::format_usd(alert.price));
        println!("{}\n", "=".repeat(50));
        Ok(())
    }

    fn heartbeat(&self) {
        print!(".");
        let _ = std::io::stdout().flush();
    }
}
