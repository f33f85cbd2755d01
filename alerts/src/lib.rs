pub mod alert;
pub mod console;
pub mod sink;
pub mod store;

pub use alert::Alert;
pub use console::ConsoleSink;
pub use sink::{AlertDispatcher, AlertSink};
pub use store::{StoreSink, SupabaseClient, WhaleAlertRecord};
