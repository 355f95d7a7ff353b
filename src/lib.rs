use std::sync::Arc;
use std::time::Duration;

pub mod chance;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod process;
pub mod server;

use chance::Chance;
use metrics::{HttpMetrics, MetricError, Registry};

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// All registered metrics; the `/metrics` handler reads snapshots from it.
    pub registry: Arc<Registry>,

    /// The HTTP request metrics — middleware and handlers push observations.
    pub http: Arc<HttpMetrics>,

    /// Randomness source for the synthetic endpoints; seedable so tests can
    /// pin the failure branch and the delay.
    pub chance: Arc<dyn Chance>,

    /// One "unit" of delay for the `/slow` endpoint. 1 s in production,
    /// shrunk to milliseconds in tests.
    pub slow_delay_unit: Duration,
}

impl AppState {
    /// Builds the registry, registers every metric, and assembles the state.
    /// A registration failure here is fatal — the caller aborts startup.
    pub fn new(
        chance: Arc<dyn Chance>,
        slow_delay_unit: Duration,
    ) -> Result<Self, MetricError> {
        let mut registry = Registry::new();
        process::register_defaults(&mut registry)?;
        let http = Arc::new(HttpMetrics::register(&mut registry)?);

        Ok(Self {
            registry: Arc::new(registry),
            http,
            chance,
            slow_delay_unit,
        })
    }
}
