/// Payment rate data: upstream replies, value coercion and the normalized
/// payload handed back to the browser.
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Rate used whenever no usable upstream rate exists.
pub const DEFAULT_RATE: f64 = 50.0;
/// Minimum purchase used unless the backend supplies a positive one.
pub const DEFAULT_MINIMUM: f64 = 3000.0;

/// One upstream response: whether the status was 2xx, and its JSON body.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub ok: bool,
    pub body: Value,
}

impl UpstreamReply {
    /// Parses `raw` as JSON. Anything unparsable becomes an empty object.
    pub fn parse(ok: bool, raw: &str) -> Self {
        let body = serde_json::from_str(raw).unwrap_or_else(|e| {
            tracing::debug!("upstream body is not JSON, treating as empty: {}", e);
            Value::Object(Map::new())
        });
        Self { ok, body }
    }

    /// A reply with an empty object body.
    pub fn empty(ok: bool) -> Self {
        Self {
            ok,
            body: Value::Object(Map::new()),
        }
    }

    /// True when the status was 2xx and the body's `success` is truthy.
    pub fn succeeded(&self) -> bool {
        self.ok && self.body.get("success").is_some_and(is_truthy)
    }
}

/// Lenient numeric value of a JSON field.
///
/// Strings are trimmed, then read as decimal (`"45"`, `"1e3"`, `".5"`,
/// `"-Infinity"`) or as unsigned `0x`/`0o`/`0b` integers. A blank string,
/// `null` and `false` count as 0, `true` as 1. Arrays, objects and anything
/// else give `None`.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric(s.trim()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn parse_numeric(s: &str) -> Option<f64> {
    if s.is_empty() {
        return Some(0.0);
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() {
            return None;
        }
        return digits.chars().try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        });
    }

    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    if unsigned == "Infinity" {
        return Some(if s.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY });
    }
    // `str::parse` also takes "inf", "nan" and friends; only exponents are
    // letters here.
    if unsigned.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Loose truthiness: `null`, `false`, `0` and `""` are false, the rest true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A finite, strictly positive number from a present, non-null field.
fn positive(value: Option<&Value>) -> Option<f64> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => to_number(v).filter(|n| n.is_finite() && *n > 0.0),
    }
}

/// Values built up while interpreting the two upstream replies.
///
/// Starts at the defaults; each step only overrides on valid data, so a
/// failure part way through still has sensible values to report.
#[derive(Debug, Clone)]
pub struct RateAccumulator {
    pub rate: Option<f64>,
    pub minimum_purchase: f64,
    pub transactions_enabled: bool,
}

impl Default for RateAccumulator {
    fn default() -> Self {
        Self {
            rate: None,
            minimum_purchase: DEFAULT_MINIMUM,
            transactions_enabled: true,
        }
    }
}

impl RateAccumulator {
    /// Rate from the token price list: one over the SEND price.
    pub fn apply_token_prices(&mut self, reply: &UpstreamReply) {
        if !reply.succeeded() {
            return;
        }
        let send = positive(reply.body.get("pricesNGN").and_then(|p| p.get("SEND")));
        if let Some(price) = send {
            let rate = 1.0 / price;
            if rate.is_finite() {
                self.rate = Some(rate);
            }
        }
    }

    /// Transaction policy, minimum purchase and fallback rate.
    pub fn apply_rate(&mut self, reply: &UpstreamReply) {
        if !reply.succeeded() {
            return;
        }
        if let Some(enabled) = reply.body.get("transactionsEnabled") {
            self.transactions_enabled = *enabled != Value::Bool(false);
        }
        if let Some(minimum) = positive(reply.body.get("minimumPurchase")) {
            self.minimum_purchase = minimum;
        }
        if self.rate.is_none() {
            self.rate = positive(reply.body.get("rate"));
        }
    }

    pub fn finish(self) -> PaymentRate {
        PaymentRate {
            success: true,
            rate: self.rate.unwrap_or(DEFAULT_RATE),
            minimum_purchase: self.minimum_purchase,
            transactions_enabled: self.transactions_enabled,
            rate_from_api: self.rate.is_some(),
            error: None,
        }
    }

    /// Failure payload keeping whatever minimum and policy were gathered.
    pub fn fail(self, error: impl ToString) -> PaymentRate {
        PaymentRate {
            success: false,
            rate: DEFAULT_RATE,
            minimum_purchase: self.minimum_purchase,
            transactions_enabled: self.transactions_enabled,
            rate_from_api: false,
            error: Some(error.to_string()),
        }
    }
}

/// Response body of `GET /api/payment-rate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRate {
    pub success: bool,
    #[serde(serialize_with = "serialize_number")]
    pub rate: f64,
    #[serde(serialize_with = "serialize_number")]
    pub minimum_purchase: f64,
    pub transactions_enabled: bool,
    pub rate_from_api: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PaymentRate {
    /// Payload for a request that could not reach the backend at all.
    pub fn unavailable(error: impl ToString) -> Self {
        RateAccumulator::default().fail(error)
    }
}

// Whole numbers go out as integers (`50`, not `50.0`).
fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
