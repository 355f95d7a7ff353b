use std::collections::HashMap;

use parking_lot::RwLock;

use super::exposition::write_sample;
use super::{resolve_labels, Metric};

/// Arbitrary-direction metric, one sub-series per label combination.
/// Same locking discipline as [`super::Counter`].
#[derive(Debug)]
pub struct Gauge {
    name: String,
    help: String,
    schema: Vec<String>,
    series: RwLock<HashMap<Vec<String>, f64>>,
}

impl Gauge {
    pub fn new(name: &str, help: &str, labels: &[&str]) -> Self {
        Self {
            name: name.to_owned(),
            help: help.to_owned(),
            schema: labels.iter().map(|l| (*l).to_owned()).collect(),
            series: RwLock::new(HashMap::new()),
        }
    }

    /// Move the gauge by a signed amount.
    pub fn add(&self, labels: &[(&str, &str)], amount: f64) {
        let values = resolve_labels(&self.name, &self.schema, labels);
        let mut series = self.series.write();
        *series.entry(values).or_insert(0.0) += amount;
    }

    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1.0);
    }

    pub fn dec(&self, labels: &[(&str, &str)]) {
        self.add(labels, -1.0);
    }

    /// Overwrite the current value.
    pub fn set(&self, labels: &[(&str, &str)], value: f64) {
        let values = resolve_labels(&self.name, &self.schema, labels);
        self.series.write().insert(values, value);
    }

    /// Current value for one label combination; 0 if never observed.
    pub fn value(&self, labels: &[(&str, &str)]) -> f64 {
        let values = resolve_labels(&self.name, &self.schema, labels);
        self.series.read().get(&values).copied().unwrap_or(0.0)
    }
}

impl Metric for Gauge {
    fn name(&self) -> &str {
        &self.name
    }

    fn help(&self) -> &str {
        &self.help
    }

    fn type_name(&self) -> &'static str {
        "gauge"
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
