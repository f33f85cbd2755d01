use uuid::Uuid;

/// Correlation ID that follows one feed session from connect to close.
///
/// The supervisor mints a fresh one per connection attempt so that all logs
/// belonging to the same websocket session can be grepped together across
/// reconnects.
#[derive(Clone, Debug)]
pub struct TraceId(Uuid);

impl TraceId {
    pub fn to_short(&self) -> String {
        // first uuid group is enough to disambiguate sessions in logs
        self.0.as_hyphenated().to_string()[..8].to_string()
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}
