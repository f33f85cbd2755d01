/// One classified whale event.
///
/// Built once per flagged trade and handed to the dispatcher by value; sinks
/// only ever see this immutable snapshot, never a reference into the live
/// window.
#[derive(Clone, Debug, PartialEq)]
pub struct Alert {
    pub symbol: String,
    pub price: f64,
    /// price * quantity of the flagged trade
    pub notional_value: f64,
    /// rolling average the trade was judged against
    pub average_notional: f64,
    /// exchange event time, epoch milliseconds
    pub event_time_ms: i64,
}
