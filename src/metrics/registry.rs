use std::fmt::Write;
use std::sync::Arc;

use super::{Metric, MetricError};

/// Process-wide set of metrics.
///
/// Built once at startup (registration takes `&mut self`), then shared
/// read-only behind an `Arc`; the metrics themselves carry their own
/// interior mutability, so a snapshot never blocks observations on
/// unrelated metrics.
#[derive(Default)]
pub struct Registry {
    metrics: Vec<Arc<dyn Metric>>,
}

impl Registry {
    /// Content type of the text exposition format served on `/metrics`.
    pub const CONTENT_TYPE: &'static str =
        "text/plain; version=0.0.4; charset=utf-8";

    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a metric. Names are unique for the life of the process;
    /// a duplicate leaves the registry unchanged and is fatal at startup.
    pub fn register(&mut self, metric: Arc<dyn Metric>) -> Result<(), MetricError> {
        if self.metrics.iter().any(|m| m.name() == metric.name()) {
            return Err(MetricError::DuplicateName(metric.name().to_owned()));
        }
        self.metrics.push(metric);
        Ok(())
    }

    /// Serializes every registered metric in registration order.
    ///
    /// Concurrent observations may land while this runs; each metric
    /// snapshots its own series under its own lock, so a single counter's
    /// increments are never lost, while cross-metric consistency is only
    /// eventual.
    pub fn snapshot(&self) -> String {
        let mut out = String::with_capacity(4096);
        for metric in &self.metrics {
            let _ = writeln!(out, "# HELP {} {}", metric.name(), metric.help());
            let _ = writeln!(out, "# TYPE {} {}", metric.name(), metric.type_name());
            metric.encode(&mut out);
        }
        out
    }
}
