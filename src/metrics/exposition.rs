use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use std::fmt::Write;
use std::sync::Arc;

use crate::metrics::Registry;
use crate::AppState;

// ─── GET /metrics ────────────────────────────────────────────────
/// Serves the registry snapshot in the Prometheus text format.
///
/// The route runs under the same instrumentation wrapper as everything
/// else, so the scrape observes its own latency — its total-counter
/// increment lands after the snapshot is taken, on the next scrape.
pub async fn serve_metrics(
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, Registry::CONTENT_TYPE)],
        state.registry.snapshot(),
    )
}

// ─── Text-format helpers ─────────────────────────────────────────

/// Writes one sample line:
///
///   name{label1="v1",label2="v2"} value
///
/// `le` appends the histogram bucket bound after the schema labels.
/// Metrics with an empty schema (and no `le`) render bare: `name value`.
pub(crate) fn write_sample(
    out: &mut String,
    name: &str,
    schema: &[String],
    values: &[String],
    le: Option<&str>,
    value: f64,
) {
    out.push_str(name);

    if !schema.is_empty() || le.is_some() {
        out.push('{');
        let mut first = true;
        for (key, val) in schema.iter().zip(values) {
            if !first {
                out.push(',');
            }
            first = false;
            let _ = write!(out, "{key}=\"{}\"", escape_label(val));
        }
        if let Some(bound) = le {
            if !first {
                out.push(',');
            }
            let _ = write!(out, "le=\"{bound}\"");
        }
        out.push('}');
    }

    let _ = writeln!(out, " {}", fmt_value(value));
}

/// Formats a sample value or bucket bound the way the text format
/// expects: `f64` Display already prints `5` for 5.0 and `0.1` for 0.1.
pub(crate) fn fmt_value(value: f64) -> String {
    format!("{value}")
}

/// Escapes a label value per the exposition format: backslash, double
/// quote, and newline.
fn escape_label(value: &str) -> String {
    if !value.contains(['\\', '"', '\n']) {
        return value.to_owned();
    }
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
