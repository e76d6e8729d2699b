//! Rendering of push requests to the Prometheus text exposition format.

use std::fmt::Write;

use crate::push::{Label, PushRequest};

/// Render a push request as exposition text.
///
/// Every metric gets one sample line carrying the full label set, preceded
/// by a `# TYPE` line when the metric declares a type. Metric and label order
/// follow the request. Label values are written as-is, without escaping.
/// A request without metrics renders to the empty string.
pub fn render(request: &PushRequest) -> String {
    let label_text = format_labels(&request.labels);
    let mut output = String::with_capacity(request.metrics.len() * 64);

    for metric in &request.metrics {
        if !metric.metric_type.is_empty() {
            writeln!(output, "# TYPE {} {}", metric.name, metric.metric_type).ok();
        }

        if label_text.is_empty() {
            writeln!(output, "{} {}", metric.name, format_value(metric.value)).ok();
        } else {
            writeln!(
                output,
                "{}{{{}}} {}",
                metric.name,
                label_text,
                format_value(metric.value)
            )
            .ok();
        }
    }

    output
}

/// Render several push requests back to back, in order.
pub fn render_all(requests: &[PushRequest]) -> String {
    requests.iter().map(render).collect()
}

/// Join labels as `key="value"` pairs separated by commas.
pub fn format_labels(labels: &[Label]) -> String {
    let parts: Vec<String> = labels
        .iter()
        .map(|label| format!("{}=\"{}\"", label.key, label.value))
        .collect();

    parts.join(",")
}

/// Format a sample value with the shortest decimal digits that round-trip.
///
/// Exponent notation (`1e+06`, `1.5e-07`) is used once the decimal exponent
/// drops below -4 or reaches 6, plain notation otherwise.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }

    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => return scientific,
    };

    if (-4..6).contains(&exponent) {
        format!("{}", value)
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}
