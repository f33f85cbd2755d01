use serde_json::Value;
use thiserror::Error;

/// One executed trade, decoded and validated from a raw feed frame.
///
/// Immutable once constructed; built per inbound message and discarded after
/// it has passed through the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct Trade {
    pub symbol: String,
    pub price: f64,
    pub quantity: f64,
    /// price * quantity, the monetary size of the trade
    pub notional_value: f64,
    /// exchange event time, epoch milliseconds
    pub event_time_ms: i64,
}

impl Trade {
    pub fn new(symbol: String, price: f64, quantity: f64, event_time_ms: i64) -> Self {
        Self {
            symbol,
            price,
            quantity,
            notional_value: price * quantity,
            event_time_ms,
        }
    }
}

/// Why a feed frame could not become a `Trade`. All variants are non-fatal:
/// the frame is logged, counted and skipped.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("invalid value for `{field}`: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// Validating decoder for Binance `@trade` execution frames.
///
/// Expected fields: `p` (price, numeric text), `q` (quantity, numeric text),
/// `T` (event time, epoch millis). `s` overrides the subscribed symbol when
/// present; everything else is ignored.
pub struct TradeParser {
    symbol: String,
}

impl TradeParser {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    pub fn parse(&self, raw: &str) -> Result<Trade, ParseError> {
        let json: Value = serde_json::from_str(raw)?;

        let price = Self::positive_number(&json, "p")?;
        let quantity = Self::positive_number(&json, "q")?;

        let event_time_ms = json
            .get("T")
            .ok_or(ParseError::MissingField("T"))?
            .as_i64()
            .ok_or(ParseError::MissingField("T"))?;

        let symbol = json
            .get("s")
            .and_then(Value::as_str)
            .map(str::to_lowercase)
            .unwrap_or_else(|| self.symbol.clone());

        Ok(Trade::new(symbol, price, quantity, event_time_ms))
    }

    /// Prices and quantities arrive as numeric text; anything that does not
    /// parse to a strictly positive number is rejected.
    fn positive_number(json: &Value, field: &'static str) -> Result<f64, ParseError> {
        let value = json.get(field).ok_or(ParseError::MissingField(field))?;

        let parsed = match value {
            Value::String(s) => s.parse::<f64>().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        };

        match parsed {
            Some(v) if v > 0.0 && v.is_finite() => Ok(v),
            _ => Err(ParseError::InvalidValue {
                field,
                value: value.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> TradeParser {
        TradeParser::new("btcusdt")
    }

    #[test]
    fn parses_a_binance_trade_frame() {
        let raw = r#"{"e":"trade","E":1700000000100,"s":"BTCUSDT","t":12345,
                      "p":"42000.50","q":"0.25","T":1700000000000,"m":true,"M":true}"#;

        let trade = parser().parse(raw).unwrap();
        assert_eq!(trade.symbol, "btcusdt");
        assert_eq!(trade.price, 42000.50);
        assert_eq!(trade.quantity, 0.25);
        assert_eq!(trade.notional_value, 42000.50 * 0.25);
        assert_eq!(trade.event_time_ms, 1_700_000_000_000);
    }

    #[test]
    fn falls_back_to_subscribed_symbol() {
        let raw = r#"{"p":"10","q":"2","T":1}"#;
        let trade = parser().parse(raw).unwrap();
        assert_eq!(trade.symbol, "btcusdt");
        assert_eq!(trade.notional_value, 20.0);
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(
            parser().parse("not json at all"),
            Err(ParseError::MalformedPayload(_))
        ));
    }

    #[test]
    fn rejects_missing_price() {
        let raw = r#"{"q":"2","T":1}"#;
        assert!(matches!(
            parser().parse(raw),
            Err(ParseError::MissingField("p"))
        ));
    }

    #[test]
    fn rejects_missing_event_time() {
        let raw = r#"{"p":"10","q":"2"}"#;
        assert!(matches!(
            parser().parse(raw),
            Err(ParseError::MissingField("T"))
        ));
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let raw = r#"{"p":"10","q":"0","T":1}"#;
        assert!(matches!(
            parser().parse(raw),
            Err(ParseError::InvalidValue { field: "q", .. })
        ));
    }

    #[test]
    fn rejects_unparseable_price_text() {
        let raw = r#"{"p":"abc","q":"2","T":1}"#;
        assert!(matches!(
            parser().parse(raw),
            Err(ParseError::InvalidValue { field: "p", .. })
        ));
    }
}
