//! Structured push bodies: explicit `metrics` and `labels` arrays.
//!
//! ```json
//! {
//!   "metrics": [{"metric_name": "some_metric", "metric_value": 3.14, "metric_type": "gauge"}],
//!   "labels": [{"key": "tenant_id", "value": "my_tenant_id"}]
//! }
//! ```

use crate::error::TranslateError;
use crate::push::PushRequest;

/// Decode a structured push body.
///
/// Missing or `null` arrays decode as empty, and so do missing fields inside
/// each entry. A `null` document yields an empty request.
pub fn parse_structured(body: &[u8]) -> Result<PushRequest, TranslateError> {
    serde_json::from_slice::<Option<PushRequest>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| TranslateError::malformed(body, e))
}
