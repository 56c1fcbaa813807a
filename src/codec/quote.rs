//! Quote delta extraction

use serde_json::Value;

/// Method tag carried by quote delta messages
pub const QUOTE_DELTA_METHOD: &str = "qsd";

/// Methods the upstream uses to report session-level failures
const ERROR_METHODS: [&str; 2] = ["protocol_error", "critical_error"];

/// Last-price update for one instrument
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteDelta {
    /// Instrument name as reported by the feed, when present
    pub symbol: Option<String>,
    /// Last traded price
    pub price: f64,
}

/// Extract a quote delta from a decoded JSON payload.
///
/// Only `{"m": "qsd", "p": [<session>, {"n": .., "v": {"lp": <price>}}]}` is
/// recognised. Every other shape yields `None`, as do prices that are not
/// finite and positive.
pub fn extract_quote(value: &Value) -> Option<QuoteDelta> {
    let method = value.get("m")?.as_str()?;
    if method != QUOTE_DELTA_METHOD {
        if ERROR_METHODS.contains(&method) {
            tracing::warn!(payload = %value, "Upstream reported a protocol error");
        }
        return None;
    }

    let body = value.get("p")?.as_array()?.get(1)?;
    let last_price = body.get("v")?.get("lp")?;

    let price = match last_price {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !price.is_finite() || price <= 0.0 {
        tracing::debug!(price, "Ignoring non-positive quote price");
        return None;
    }

    Some(QuoteDelta {
        symbol: body.get("n").and_then(Value::as_str).map(str::to_string),
        price,
    })
}
