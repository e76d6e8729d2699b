//! Integration tests for promgate-common library.

use promgate_common::{
    Label, Metric, PushRequest, SENTINEL_METRIC_NAME, TranslateError, parse_flat,
    parse_structured, render, render_all,
};

#[test]
fn test_structured_body_to_exposition() {
    let body = br#"{
        "metrics": [
            {"metric_name": "http_requests_total", "metric_value": 1027, "metric_type": "counter"},
            {"metric_name": "queue_depth", "metric_value": 3.5}
        ],
        "labels": [
            {"key": "tenant_id", "value": "acme"},
            {"key": "region", "value": "eu-west"}
        ]
    }"#;

    let mut request = parse_structured(body).expect("structured parse failed");
    request.push_label("job", "batch");

    assert_eq!(
        render(&request),
        "# TYPE http_requests_total counter\n\
         http_requests_total{tenant_id=\"acme\",region=\"eu-west\",job=\"batch\"} 1027\n\
         queue_depth{tenant_id=\"acme\",region=\"eu-west\",job=\"batch\"} 3.5\n"
    );
}

#[test]
fn test_structured_scenario_without_labels() {
    let request =
        parse_structured(br#"{"metrics":[{"metric_name":"some_metric","metric_value":3.14}]}"#)
            .unwrap();
    assert_eq!(render(&request), "some_metric 3.14\n");
}

#[test]
fn test_flat_body_to_exposition() {
    let mut requests = parse_flat(
        br#"{"cpu_load": 0.75, "uptime": 86400, "firmware": "2.1.0", "healthy": true}"#,
    )
    .expect("flat parse failed");

    for request in &mut requests {
        request.push_label("identify", "bts-042");
    }

    assert_eq!(
        render_all(&requests),
        "cpu_load{identify=\"bts-042\"} 0.75\n\
         uptime{identify=\"bts-042\"} 86400\n\
         foobar{firmware=\"2.1.0\",identify=\"bts-042\"} -1\n"
    );
}

#[test]
fn test_flat_sentinel_constant() {
    let requests = parse_flat(br#"{"site": "north"}"#).unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].metrics[0].name, SENTINEL_METRIC_NAME);
    assert_eq!(requests[0].metrics[0].value, -1.0);
}

#[test]
fn test_flat_empty_payload() {
    let err = parse_flat(b"{}").unwrap_err();
    assert!(matches!(err, TranslateError::EmptyPayload));
    assert_eq!(err.to_string(), "empty labels not allowed");
}

#[test]
fn test_render_line_count_matches_metrics() {
    let metrics: Vec<Metric> = (0..10)
        .map(|i| {
            let metric = Metric::new(format!("m{}", i), i as f64);
            if i % 3 == 0 {
                metric.with_type("gauge")
            } else {
                metric
            }
        })
        .collect();
    let typed = metrics.iter().filter(|m| !m.metric_type.is_empty()).count();
    let request = PushRequest::new(metrics, vec![Label::new("job", "j")]);

    let output = render(&request);
    assert_eq!(output.lines().count(), 10 + typed);
    assert!(output.ends_with('\n'));
}

#[test]
fn test_injected_label_is_last() {
    let mut request = parse_structured(
        br#"{"metrics":[{"metric_name":"m","metric_value":1}],"labels":[{"key":"job","value":"inner"}]}"#,
    )
    .unwrap();
    request.push_label("job", "outer");

    assert_eq!(render(&request), "m{job=\"inner\",job=\"outer\"} 1\n");
}
