use std::sync::Arc;

use crate::metrics::{Gauge, MetricError, Registry};

/// Registers the process-level default metrics into the shared registry.
///
/// These stand in for a full default-metrics collector: they are set once
/// at startup and only read thereafter, exercising the same registration
/// path as the request metrics.
pub fn register_defaults(registry: &mut Registry) -> Result<(), MetricError> {
    let start_time = Arc::new(Gauge::new(
        "process_start_time_seconds",
        "Start time of the process since unix epoch in seconds.",
        &[],
    ));
    start_time.set(&[], chrono::Utc::now().timestamp() as f64);
    registry.register(start_time)?;

    let info = Arc::new(Gauge::new(
        "app_info",
        "Static build information for this scrape target.",
        &["version"],
    ));
    info.set(&[("version", env!("CARGO_PKG_VERSION"))], 1.0);
    registry.register(info)?;

    Ok(())
}
