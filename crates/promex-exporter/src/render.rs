use std::sync::Arc;

use promex_metrics::{
    CounterSnapshot, GaugeFloat64Snapshot, GaugeSnapshot, HistogramSnapshot, MeterSnapshot,
    ResettingTimerSnapshot, TimerSnapshot,
};

use crate::{
    cache::HeaderCache,
    key::{MetricKey, MetricType},
};

pub const HISTOGRAM_QUANTILES: [f64; 6] = [0.5, 0.75, 0.95, 0.99, 0.999, 0.9999];
pub const HISTOGRAM_QUANTILE_TAGS: [&str; 6] = ["p50", "p75", "p95", "p99", "p999", "p9999"];

pub const RESETTING_TIMER_PERCENTILES: [f64; 3] = [50.0, 95.0, 99.0];
pub const RESETTING_TIMER_PERCENTILE_TAGS: [&str; 3] = ["p50", "p95", "p99"];

/// Turns metric snapshots into exposition lines, one routine per kind.
pub struct LineRenderer<'a> {
    cache: &'a HeaderCache,
}

impl<'a> LineRenderer<'a> {
    pub fn new(cache: &'a HeaderCache) -> Self {
        Self { cache }
    }

    pub fn counter(&self, out: &mut String, name: &str, snapshot: &CounterSnapshot) {
        let key = self.begin(out, name, MetricType::Gauge);
        key.write_line(out, "value", snapshot.count);
    }

    pub fn gauge(&self, out: &mut String, name: &str, snapshot: &GaugeSnapshot) {
        let key = self.begin(out, name, MetricType::Gauge);
        key.write_line(out, "value", snapshot.value);
    }

    pub fn gauge_float64(&self, out: &mut String, name: &str, snapshot: &GaugeFloat64Snapshot) {
        let key = self.begin(out, name, MetricType::Gauge);
        key.write_line(out, "value", snapshot.value);
    }

    pub fn histogram(&self, out: &mut String, name: &str, snapshot: &HistogramSnapshot) {
        let key = self.begin(out, name, MetricType::Summary);
        write_distribution(out, &key, snapshot);
    }

    pub fn meter(&self, out: &mut String, name: &str, snapshot: &MeterSnapshot) {
        let key = self.begin(out, name, MetricType::Gauge);
        key.write_line(out, "count", snapshot.count);
        key.write_line(out, "m1", snapshot.rate1);
        key.write_line(out, "m5", snapshot.rate5);
        key.write_line(out, "m15", snapshot.rate15);
        key.write_line(out, "mean", snapshot.rate_mean);
    }

    pub fn timer(&self, out: &mut String, name: &str, snapshot: &TimerSnapshot) {
        let key = self.begin(out, name, MetricType::Summary);
        write_distribution(out, &key, &snapshot.histogram);
        key.write_line(out, "m1", snapshot.meter.rate1);
        key.write_line(out, "m5", snapshot.meter.rate5);
        key.write_line(out, "m15", snapshot.meter.rate15);
        key.write_line(out, "meanrate", snapshot.meter.rate_mean);
    }

    /// Writes nothing when the timer recorded no values in its window.
    pub fn resetting_timer(&self, out: &mut String, name: &str, snapshot: &ResettingTimerSnapshot) {
        let values = snapshot.values();
        let (Some(&min), Some(&max)) = (values.first(), values.last()) else {
            return;
        };

        let percentiles = snapshot.percentiles(&RESETTING_TIMER_PERCENTILES);
        let key = self.begin(out, name, MetricType::Summary);
        key.write_line(out, "count", values.len());
        key.write_line(out, "max", max);
        key.write_line(out, "mean", snapshot.mean());
        key.write_line(out, "min", min);
        for (tag, value) in RESETTING_TIMER_PERCENTILE_TAGS.iter().zip(percentiles) {
            key.write_line(out, tag, value);
        }
    }

    fn begin(&self, out: &mut String, name: &str, metric_type: MetricType) -> Arc<MetricKey> {
        let key = self.cache.resolve(name, metric_type);
        out.push_str(key.header());
        key
    }
}

fn write_distribution(out: &mut String, key: &MetricKey, snapshot: &HistogramSnapshot) {
    let percentiles = snapshot.percentiles(&HISTOGRAM_QUANTILES);
    key.write_line(out, "count", snapshot.count());
    key.write_line(out, "max", snapshot.max());
    key.write_line(out, "mean", snapshot.mean());
    key.write_line(out, "min", snapshot.min());
    key.write_line(out, "stddev", snapshot.stddev());
    key.write_line(out, "variance", snapshot.variance());
    for (tag, value) in HISTOGRAM_QUANTILE_TAGS.iter().zip(percentiles) {
        key.write_line(out, tag, value);
    }
}
