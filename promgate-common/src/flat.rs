//! Flat push bodies: one JSON object whose fields are classified by value.
//!
//! Numbers become metrics named after their key, strings become labels, and
//! anything else is dropped. Labels cannot stand alone in the exposition
//! format, so they travel on the [`SENTINEL_METRIC_NAME`] metric.

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::TranslateError;
use crate::push::{Label, Metric, PushRequest};

/// Name of the placeholder metric carrying string fields.
pub const SENTINEL_METRIC_NAME: &str = "foobar";

/// Value of the placeholder metric.
pub const SENTINEL_METRIC_VALUE: f64 = -1.0;

/// Classification of a flat field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatValue {
    Number(f64),
    Text(String),
    /// Booleans, nulls, arrays and objects.
    Other,
}

impl From<Value> for FlatValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map_or(FlatValue::Other, FlatValue::Number),
            Value::String(s) => FlatValue::Text(s),
            _ => FlatValue::Other,
        }
    }
}

/// The placeholder metric carrying label-only fields.
pub fn sentinel_metric() -> Metric {
    Metric::new(SENTINEL_METRIC_NAME, SENTINEL_METRIC_VALUE)
}

/// Decode a flat push body into at most two push requests.
///
/// The first holds every numeric field as an unlabelled metric; the second
/// holds the sentinel metric labelled with every string field. Either is
/// omitted when it would be empty, and a body yielding neither is rejected
/// with [`TranslateError::EmptyPayload`]. Fields keep their document order.
pub fn parse_flat(body: &[u8]) -> Result<Vec<PushRequest>, TranslateError> {
    let fields = serde_json::from_slice::<Option<Map<String, Value>>>(body)
        .map_err(|e| TranslateError::malformed(body, e))?
        .unwrap_or_default();

    let mut metrics = Vec::new();
    let mut labels = Vec::new();

    for (key, value) in fields {
        match FlatValue::from(value) {
            FlatValue::Number(value) => metrics.push(Metric::new(key, value)),
            FlatValue::Text(value) => labels.push(Label::new(key, value)),
            FlatValue::Other => trace!(field = %key, "Ignoring non-scalar flat field"),
        }
    }

    let mut requests = Vec::with_capacity(2);
    if !metrics.is_empty() {
        requests.push(PushRequest::new(metrics, Vec::new()));
    }
    if !labels.is_empty() {
        requests.push(PushRequest::new(vec![sentinel_metric()], labels));
    }

    if requests.is_empty() {
        return Err(TranslateError::EmptyPayload);
    }

    Ok(requests)
}
