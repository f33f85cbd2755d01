//! Manual fixture: writes one clearly-synthetic whale alert straight into
//! the store, bypassing the feed entirely. Useful for verifying the store
//! table and any downstream notification wiring.
//!
//! Usage: SUPABASE_URL=... SUPABASE_KEY=... cargo run --bin inject_alert

use alerts::{SupabaseClient, WhaleAlertRecord};
use common::logger::init_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger("inject_alert");

    let url = std::env::var("SUPABASE_URL")
        .map_err(|_| anyhow::anyhow!("SUPABASE_URL must be set"))?;
    let key = std::env::var("SUPABASE_KEY")
        .map_err(|_| anyhow::anyhow!("SUPABASE_KEY must be set"))?;

    let client = SupabaseClient::new(url, key)?;

    let record = WhaleAlertRecord {
        // distinct symbol so the row is obviously a test
        symbol: "TEST-COIN".to_string(),
        price: 99_999.99,
        volume: 5_000_000.0,
        average_volume: 10_000.0,
        is_whale: true,
    };

    println!("🧪 injecting synthetic whale alert...");
    client.insert_alert(&record).await?;
    println!("✅ synthetic whale stored; check the whale_alerts table");

    Ok(())
}
