pub mod metrics;
pub mod pipeline;
pub mod supervisor;
pub mod trade;
pub mod ws;

pub use metrics::Counters;
pub use pipeline::TradePipeline;
pub use supervisor::{Supervisor, TradeFeed};
pub use trade::{ParseError, Trade, TradeParser};
pub use ws::{ClosedReason, ConnectionState, FeedConnector};
