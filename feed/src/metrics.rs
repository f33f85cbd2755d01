use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility. Cloning shares the
/// underlying atomics, so the pipeline and the supervisor see one set of
/// numbers.
#[derive(Clone, Default)]
pub struct Counters {
    pub trades_seen: Arc<AtomicU64>,
    pub parse_failures: Arc<AtomicU64>,
    pub whales_flagged: Arc<AtomicU64>,
    pub reconnects: Arc<AtomicU64>,
}

impl Counters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}
