use std::collections::HashMap;
use std::time::Instant;

use parking_lot::RwLock;

use super::exposition::{fmt_value, write_sample};
use super::{resolve_labels, Metric, MetricError};

/// Distribution metric with a fixed ascending set of bucket upper bounds.
///
/// Bucket counts are cumulative: an observation increments every bucket
/// whose bound is ≥ the value, plus the implicit `+Inf` bucket (the total
/// observation count). Bounds are immutable after construction.
#[derive(Debug)]
pub struct Histogram {
    name: String,
    help: String,
    schema: Vec<String>,
    bounds: Vec<f64>,
    series: RwLock<HashMap<Vec<String>, Series>>,
}

#[derive(Debug)]
struct Series {
    buckets: Vec<u64>,
    sum: f64,
    count: u64,
}

/// Read-only copy of one labeled sub-series, for tests and verification.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSeries {
    pub buckets: Vec<u64>,
    pub sum: f64,
    pub count: u64,
}

impl Histogram {
    /// `bounds` must be non-empty and strictly ascending; anything else is
    /// a construction-time bug.
    pub fn new(name: &str, help: &str, labels: &[&str], bounds: &[f64]) -> Self {
        assert!(!bounds.is_empty(), "histogram `{name}`: no buckets declared");
        assert!(
            bounds.windows(2).all(|w| w[0] < w[1]),
            "histogram `{name}`: bucket bounds must be strictly ascending"
        );

        Self {
            name: name.to_owned(),
            help: help.to_owned(),
            schema: labels.iter().map(|l| (*l).to_owned()).collect(),
            bounds: bounds.to_vec(),
            series: RwLock::new(HashMap::new()),
        }
    }

    /// Record one value into the labeled sub-series, creating it on first use.
    pub fn observe(&self, labels: &[(&str, &str)], value: f64) {
        let values = resolve_labels(&self.name, &self.schema, labels);
        let mut series = self.series.write();
        let entry = series.entry(values).or_insert_with(|| Series {
            buckets: vec![0; self.bounds.len()],
            sum: 0.0,
            count: 0,
        });

        for (i, bound) in self.bounds.iter().enumerate() {
            if value <= *bound {
                entry.buckets[i] += 1;
            }
        }
        entry.sum += value;
        entry.count += 1;
    }

    /// Starts a latency timer anchored to monotonic time. No label set is
    /// touched until the timer is stopped.
    pub fn start_timer(&self) -> Timer<'_> {
        Timer {
            histogram: self,
            start: Instant::now(),
            stopped: false,
        }
    }

    /// Read-only copy of one sub-series, or `None` if never observed.
    pub fn series(&self, labels: &[(&str, &str)]) -> Option<HistogramSeries> {
        let values = resolve_labels(&self.name, &self.schema, labels);
        self.series.read().get(&values).map(|s| HistogramSeries {
            buckets: s.buckets.clone(),
            sum: s.sum,
            count: s.count,
        })
    }
}

impl Metric for Histogram {
    fn name(&self) -> &str {
        &self.name
    }

    fn help(&self) -> &str {
        &self.help
    }

    fn type_name(&self) -> &'static str {
        "histogram"
    }

    fn encode(&self, out: &mut String) {
        let series = self.series.read();
        let mut rows: Vec<_> = series.iter().collect();
        rows.sort_by(|a, b| a.0.cmp(b.0));

        let bucket_name = format!("{}_bucket", self.name);
        for (values, s) in rows {
            for (i, bound) in self.bounds.iter().enumerate() {
                write_sample(
                    out,
                    &bucket_name,
                    &self.schema,
                    values,
                    Some(&fmt_value(*bound)),
                    s.buckets[i] as f64,
                );
            }
            write_sample(
                out,
                &bucket_name,
                &self.schema,
                values,
                Some("+Inf"),
                s.count as f64,
            );
            write_sample(
                out,
                &format!("{}_sum", self.name),
                &self.schema,
                values,
                None,
                s.sum,
            );
            write_sample(
                out,
                &format!("{}_count", self.name),
                &self.schema,
                values,
                None,
                s.count as f64,
            );
        }
    }
}

// ─── Timer ───────────────────────────────────────────────────────

/// Ephemeral handle tying a start timestamp to the histogram it will
/// record into. Stopping computes elapsed seconds and performs exactly
/// one observation; a never-stopped timer simply loses the observation.
pub struct Timer<'h> {
    histogram: &'h Histogram,
    start: Instant,
    stopped: bool,
}

impl Timer<'_> {
    /// Stops the timer, recording elapsed seconds under `labels`.
    /// Returns the elapsed time; a second stop is a caller bug.
    pub fn stop(&mut self, labels: &[(&str, &str)]) -> Result<f64, MetricError> {
        if self.stopped {
            return Err(MetricError::TimerAlreadyStopped);
        }
        self.stopped = true;

        let elapsed = self.start.elapsed().as_secs_f64();
        self.histogram.observe(labels, elapsed);
        Ok(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::LATENCY_BUCKETS;

    fn latency_hist() -> Histogram {
        Histogram::new("lat_seconds", "Latency", &[], LATENCY_BUCKETS)
    }

    #[test]
    fn observation_fills_every_bucket_at_or_above_value() {
        let hist = latency_hist();
        hist.observe(&[], 0.4);

        let s = hist.series(&[]).expect("series exists");
        // Bounds: 0.1, 0.3, 0.5, 0.7, 1, 3, 5, 7, 10
        assert_eq!(s.buckets, vec![0, 0, 1, 1, 1, 1, 1, 1, 1]);
        assert_eq!(s.count, 1);
        assert_eq!(s.sum, 0.4);
    }

    #[test]
    fn value_equal_to_bound_lands_in_that_bucket() {
        let hist = latency_hist();
        hist.observe(&[], 0.3);

        let s = hist.series(&[]).expect("series exists");
        assert_eq!(s.buckets, vec![0, 1, 1, 1, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn out_of_range_value_touches_only_the_inf_bucket() {
        let hist = latency_hist();
        hist.observe(&[], 42.0);

        let s = hist.series(&[]).expect("series exists");
        assert_eq!(s.buckets, vec![0; 9]);
        assert_eq!(s.count, 1);
        assert_eq!(s.sum, 42.0);
    }

    #[test]
    fn cumulative_counts_are_monotonic() {
        let hist = latency_hist();
        for v in [0.05, 0.2, 0.6, 2.0, 8.0, 12.0] {
            hist.observe(&[], v);
        }

        let s = hist.series(&[]).expect("series exists");
        for pair in s.buckets.windows(2) {
            assert!(pair[0] <= pair[1], "bucket counts decreased: {:?}", s.buckets);
        }
        assert!(*s.buckets.last().expect("non-empty") <= s.count);
        assert_eq!(s.count, 6);
    }

    #[test]
    fn timer_records_once_and_rejects_a_second_stop() {
        let hist = Histogram::new(
            "lat_seconds",
            "Latency",
            &["route"],
            LATENCY_BUCKETS,
        );
        let labels = [("route", "/")];

        let mut timer = hist.start_timer();
        let elapsed = timer.stop(&labels).expect("first stop");
        assert!(elapsed >= 0.0);

        assert_eq!(timer.stop(&labels), Err(MetricError::TimerAlreadyStopped));

        let s = hist.series(&labels).expect("series exists");
        assert_eq!(s.count, 1);
    }

    #[test]
    #[should_panic(expected = "strictly ascending")]
    fn unsorted_bounds_panic() {
        Histogram::new("bad", "Bad", &[], &[1.0, 0.5]);
    }
}
