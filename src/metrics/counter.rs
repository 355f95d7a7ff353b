use std::collections::HashMap;

use parking_lot::RwLock;

use super::exposition::write_sample;
use super::{resolve_labels, Metric, MetricError};

/// Monotonically non-decreasing metric, one sub-series per label combination.
///
/// Series are created lazily at 0 on first observation. The whole series map
/// sits behind one per-metric lock, which makes increments to a single label
/// combination linearizable without serializing unrelated metrics.
#[derive(Debug)]
pub struct Counter {
    name: String,
    help: String,
    schema: Vec<String>,
    series: RwLock<HashMap<Vec<String>, f64>>,
}

impl Counter {
    pub fn new(name: &str, help: &str, labels: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            help: help.to_owned(),
            schema: labels.iter().map(|l| (*l).to_owned()).collect(),
            series: RwLock::new(HashMap::new()),
        }
    }

    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.apply(labels, 1.0);
    }

    /// Increment by an arbitrary non-negative amount. A negative amount is
    /// a caller bug and fails loudly instead of being clamped.
    pub fn inc_by(
        &self,
        labels: &[(&str, &str)],
        amount: f64,
    ) -> Result<(), MetricError> {
        if amount < 0.0 {
            return Err(MetricError::InvalidOperation(format!(
                "counter `{}` cannot be incremented by negative amount {amount}",
                self.name
            )));
        }
        self.apply(labels, amount);
        Ok(())
    }

    /// Current value for one label combination; 0 if never observed.
    pub fn value(&self, labels: &[(&str, &str)]) -> f64 {
        let values = resolve_labels(&self.name, &self.schema, labels);
        self.series.read().get(&values).copied().unwrap_or(0.0)
    }

    fn apply(&self, labels: &[(&str, &str)], amount: f64) {
        let values = resolve_labels(&self.name, &self.schema, labels);
        let mut series = self.series.write();
        *series.entry(values).or_insert(0.0) += amount;
    }
}

impl Metric for Counter {
    fn name(&self) -> &str {
        &self.name
    }

    fn help(&self) -> &str {
        &self.help
    }

    fn type_name(&self) -> &'static str {
        "counter"
    }

    fn encode(&self, out: &mut String) {
        let series = self.series.read();
        let mut rows: Vec<_> = series.iter().collect();
        rows.sort_by(|a, b| a.0.cmp(b.0));
        for (values, value) in rows {
            write_sample(out, &self.name, &self.schema, values, None, *value);
        }
    }
}
