//! Router-level tests: drive the full axum stack (instrumentation
//! middleware included) with `tower::ServiceExt::oneshot` and assert on
//! both the HTTP responses and the metric state they leave behind.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use rust_prom_target::chance::Chance;
use rust_prom_target::metrics::Registry;
use rust_prom_target::{server, AppState};

/// Rigged randomness: pins the failure branch and the delay so the
/// synthetic endpoints become deterministic.
struct Rigged {
    fail: bool,
    delay_units: u64,
}

impl Chance for Rigged {
    fn one_in(&self, _n: u32) -> bool {
        self.fail
    }

    fn pick(&self, _range: RangeInclusive<u64>) -> u64 {
        self.delay_units
    }
}

/// One delay unit is shrunk to a millisecond so the success branch of
/// `/slow` finishes quickly.
fn test_state(fail: bool) -> Arc<AppState> {
    Arc::new(
        AppState::new(
            Arc::new(Rigged {
                fail,
                delay_units: 3,
            }),
            Duration::from_millis(1),
        )
        .expect("fresh registry accepts all metrics"),
    )
}

async fn get(state: &Arc<AppState>, path: &str) -> (StatusCode, String) {
    let app = server::create_router(state.clone());
    let response = app
        .oneshot(Request::get(path).body(Body::empty()).expect("request"))
        .await
        .expect("infallible service");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collect")
        .to_bytes();
    (status, String::from_utf8(bytes.to_vec()).expect("utf-8 body"))
}

#[tokio::test]
async fn root_succeeds_and_counts_one_total_no_error() {
    let state = test_state(false);
    let (status, body) = get(&state, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Welcome to the Observability App");

    let ok = [("method", "GET"), ("route", "/"), ("code", "200")];
    assert_eq!(state.http.total.value(&ok), 1.0);
    assert_eq!(state.http.total_gauge.value(&ok), 1.0);
    assert_eq!(state.http.duration.series(&ok).expect("timed").count, 1);

    let err = [("method", "GET"), ("route", "/"), ("code", "500")];
    assert_eq!(state.http.errors.value(&err), 0.0);
}

#[tokio::test]
async fn error_route_counts_error_and_total_exactly_once() {
    let state = test_state(false);
    let (status, body) = get(&state, "/error").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value =
        serde_json::from_str(&body).expect("JSON error body");
    assert_eq!(json["error"], "Internal Error");
    assert_eq!(json["status"], 500);

    let labels = [("method", "GET"), ("route", "/error"), ("code", "500")];
    assert_eq!(state.http.errors.value(&labels), 1.0);
    assert_eq!(state.http.errors_gauge.value(&labels), 1.0);
    assert_eq!(state.http.total.value(&labels), 1.0);
    assert_eq!(state.http.duration.series(&labels).expect("timed").count, 1);
}

#[tokio::test]
async fn slow_failure_branch_is_immediate_500() {
    let state = test_state(true);

    let t0 = Instant::now();
    let (status, _body) = get(&state, "/slow").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    // No delay on the failure branch — generous bound for CI jitter.
    assert!(t0.elapsed() < Duration::from_secs(1));

    let labels = [("method", "GET"), ("route", "/slow"), ("code", "500")];
    assert_eq!(state.http.errors.value(&labels), 1.0);
    assert_eq!(state.http.total.value(&labels), 1.0);
}

#[tokio::test]
async fn slow_success_branch_delays_then_succeeds() {
    let state = test_state(false);

    let t0 = Instant::now();
    let (status, body) = get(&state, "/slow").await;
    // Rigged to 3 delay units of 1 ms each; sleep never wakes early.
    assert!(t0.elapsed() >= Duration::from_millis(3));

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Slow url accessed !!");

    let ok = [("method", "GET"), ("route", "/slow"), ("code", "200")];
    assert_eq!(state.http.total.value(&ok), 1.0);

    let err = [("method", "GET"), ("route", "/slow"), ("code", "500")];
    assert_eq!(state.http.errors.value(&err), 0.0);
}

#[tokio::test]
async fn metrics_endpoint_exposes_observed_series() {
    let state = test_state(false);

    // Generate one success and one failure first.
    let _ = get(&state, "/").await;
    let _ = get(&state, "/error").await;

    let app = server::create_router(state.clone());
    let response = app
        .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
        .await
        .expect("infallible service");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .expect("content type"),
        Registry::CONTENT_TYPE
    );

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collect")
        .to_bytes();
    let text = String::from_utf8(bytes.to_vec()).expect("utf-8 body");

    assert!(text.contains("# TYPE http_requests_total counter"));
    assert!(text.contains(
        "http_requests_total{method=\"GET\",route=\"/\",code=\"200\"} 1\n"
    ));
    assert!(text.contains(
        "http_requests_error{method=\"GET\",route=\"/error\",code=\"500\"} 1\n"
    ));
    assert!(text.contains(
        "http_request_duration_seconds_bucket{method=\"GET\",route=\"/\",code=\"200\",le=\"+Inf\"} 1\n"
    ));
    assert!(text.contains("process_start_time_seconds "));

    // The scrape itself is instrumented, but its own increment lands
    // after the snapshot — the /metrics series shows up next scrape.
    assert!(!text.contains("route=\"/metrics\""));
    let labels = [("method", "GET"), ("route", "/metrics"), ("code", "200")];
    assert_eq!(state.http.total.value(&labels), 1.0);
}

#[tokio::test]
async fn unmatched_path_counts_with_raw_path_and_404() {
    let state = test_state(false);
    let (status, _body) = get(&state, "/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let labels = [("method", "GET"), ("route", "/nope"), ("code", "404")];
    assert_eq!(state.http.total.value(&labels), 1.0);
}
