//! Whale classification rule.
//!
//! A trade is a whale when its notional value exceeds the rolling average of
//! recent trades by more than the configured multiplier. The comparison is a
//! strict inequality: a trade landing exactly on the threshold is not
//! flagged.
//!
//! Determinism: this is a pure function of its three inputs. Window state,
//! I/O and alert delivery all live outside this module. The average is
//! produced from a full window of positive notionals, so it is itself
//! positive and the multiplication needs no divide-by-zero guard.

pub const DEFAULT_THRESHOLD_MULTIPLIER: f64 = 10.0;

/// Whale iff `notional_value > average_notional * threshold_multiplier`.
pub fn is_whale(notional_value: f64, average_notional: f64, threshold_multiplier: f64) -> bool {
    notional_value > average_notional * threshold_multiplier
}
