use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use crate::AppState;

/// Per-request instrumentation wrapper.
///
/// Every request follows the same lifecycle: start a latency timer,
/// dispatch to the handler, then finalize with the labels
/// `{method, route, code}` — exactly one timer stop and one
/// total-counter increment per request. Failing handlers have already
/// bumped the error series themselves before the 500 reaches us.
///
/// The route label is the declared route pattern, not the raw path, so
/// label cardinality stays bounded; only unmatched 404s fall back to
/// the raw path.
pub async fn instrument(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let mut timer = state.http.duration.start_timer();
    let response = next.run(req).await;

    let code = response.status().as_u16().to_string();
    let labels = [
        ("method", method.as_str()),
        ("route", route.as_str()),
        ("code", code.as_str()),
    ];
    // First stop of a fresh timer cannot fail.
    let elapsed = timer.stop(&labels).unwrap_or(0.0);
    state.http.record_request(&method, &route, &code);

    // ── Console log ─────────────────────────────────────────────
    let status = response.status().as_u16();
    let colour = match status {
        200..=299 => "\x1b[32m", // green
        400..=499 => "\x1b[33m", // yellow
        _ => "\x1b[31m",         // red
    };
    // Skip the periodic scrape noise
    if route != "/metrics" {
        println!(
            "  {colour}{status}\x1b[0m  {method:<5} {route:<12} {:>9.1}ms",
            elapsed * 1000.0
        );
    }

    response
}
