pub mod counter;
pub mod exposition;
pub mod gauge;
pub mod histogram;
pub mod registry;

use std::sync::Arc;

pub use counter::Counter;
pub use gauge::Gauge;
pub use histogram::{Histogram, Timer};
pub use registry::Registry;

// ─── Errors ──────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MetricError {
    /// A metric with this name is already registered. Fatal at startup.
    #[error("metric `{0}` is already registered")]
    DuplicateName(String),

    /// Caller misused a metric (e.g. negative counter increment).
    #[error("{0}")]
    InvalidOperation(String),

    /// A timer handle was stopped twice.
    #[error("timer has already been stopped")]
    TimerAlreadyStopped,
}

// ─── Metric trait ────────────────────────────────────────────────

/// A named, typed time series the registry can serialize.
///
/// `encode` writes only the sample lines; the registry emits the
/// `# HELP` / `# TYPE` header from `name`/`help`/`type_name`.
pub trait Metric: Send + Sync + 'static {
    fn name(&self) -> &str;
    fn help(&self) -> &str;
    fn type_name(&self) -> &'static str;
    fn encode(&self, out: &mut String);
}

// ─── Label resolution ────────────────────────────────────────────

/// Reorders an observation's `(key, value)` pairs into the metric's
/// declared schema order.
///
/// A mismatched label set — missing, extra, or unknown key — is a
/// programming error at the call site, not a recoverable runtime
/// condition, so this panics rather than returning an error.
pub(crate) fn resolve_labels(
    metric: &str,
    schema: &[String],
    labels: &[(&str, &str)],
) -> Vec<String> {
    assert_eq!(
        labels.len(),
        schema.len(),
        "metric `{metric}`: got {} labels, {} declared",
        labels.len(),
        schema.len(),
    );

    schema
        .iter()
        .map(|key| {
            labels
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| (*v).to_owned())
                .unwrap_or_else(|| {
                    panic!("metric `{metric}`: missing label `{key}`")
                })
        })
        .collect()
}

// ─── HTTP metric bundle ──────────────────────────────────────────

/// Label schema shared by every HTTP-level metric. The route label holds
/// the declared route pattern, never the raw path, to bound cardinality.
pub const HTTP_LABELS: &[&str] = &["method", "route", "code"];

/// Latency buckets in seconds, sized for the 3–9 s synthetic delay.
pub const LATENCY_BUCKETS: &[f64] =
    &[0.1, 0.3, 0.5, 0.7, 1.0, 3.0, 5.0, 7.0, 10.0];

/// The five request-level metrics, created once at startup and shared
/// between the instrumentation middleware and the failing handlers.
#[derive(Debug)]
pub struct HttpMetrics {
    /// Request latency histogram; the middleware times every request into it.
    pub duration: Arc<Histogram>,

    pub total: Arc<Counter>,
    pub errors: Arc<Counter>,

    // Gauge twins of the two counters, kept because collectors that only
    // understand gauges scrape this target too.
    pub total_gauge: Arc<Gauge>,
    pub errors_gauge: Arc<Gauge>,
}

impl HttpMetrics {
    /// Creates the metric set and registers every member into `registry`.
    pub fn register(registry: &mut Registry) -> Result<Self, MetricError> {
        let duration = Arc::new(Histogram::new(
            "http_request_duration_seconds",
            "Duration of HTTP requests in seconds",
            HTTP_LABELS,
            LATENCY_BUCKETS,
        ));
        let total = Arc::new(Counter::new(
            "http_requests_total",
            "Total number of HTTP requests",
            HTTP_LABELS,
        ));
        let errors = Arc::new(Counter::new(
            "http_requests_error",
            "Total number of error HTTP requests",
            HTTP_LABELS,
        ));
        let total_gauge = Arc::new(Gauge::new(
            "http_requests_total_gauge",
            "Total number of HTTP requests",
            HTTP_LABELS,
        ));
        let errors_gauge = Arc::new(Gauge::new(
            "http_requests_error_gauge",
            "Total number of error HTTP requests",
            HTTP_LABELS,
        ));

        registry.register(duration.clone())?;
        registry.register(total.clone())?;
        registry.register(errors.clone())?;
        registry.register(total_gauge.clone())?;
        registry.register(errors_gauge.clone())?;

        Ok(Self {
            duration,
            total,
            errors,
            total_gauge,
            errors_gauge,
        })
    }

    /// One completed request: bumps the total counter and its gauge twin.
    pub fn record_request(&self, method: &str, route: &str, code: &str) {
        let labels = [("method", method), ("route", route), ("code", code)];
        self.total.inc(&labels);
        self.total_gauge.inc(&labels);
    }

    /// One failed request. Handlers call this *before* signalling failure
    /// so the error series is updated even if finalization is skipped.
    pub fn record_error(&self, method: &str, route: &str) {
        let labels = [("method", method), ("route", route), ("code", "500")];
        self.errors.inc(&labels);
        self.errors_gauge.inc(&labels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_registers_all_five_metrics() {
        let mut registry = Registry::new();
        let http = HttpMetrics::register(&mut registry)
            .expect("fresh registry accepts the bundle");

        http.record_request("GET", "/", "200");
        http.record_error("GET", "/error");

        let labels = [("method", "GET"), ("route", "/"), ("code", "200")];
        assert_eq!(http.total.value(&labels), 1.0);
        assert_eq!(http.total_gauge.value(&labels), 1.0);

        let err_labels =
            [("method", "GET"), ("route", "/error"), ("code", "500")];
        assert_eq!(http.errors.value(&err_labels), 1.0);
        assert_eq!(http.errors_gauge.value(&err_labels), 1.0);

        let text = registry.snapshot();
        assert!(text.contains("# TYPE http_request_duration_seconds histogram"));
        assert!(text.contains("# TYPE http_requests_total counter"));
        assert!(text.contains("# TYPE http_requests_error_gauge gauge"));
    }

    #[test]
    fn bundle_cannot_register_twice() {
        let mut registry = Registry::new();
        HttpMetrics::register(&mut registry).expect("first bundle");
        let err = HttpMetrics::register(&mut registry).unwrap_err();
        assert_eq!(
            err,
            MetricError::DuplicateName("http_request_duration_seconds".into())
        );
    }
}
