use std::time::{Duration, Instant};

use crate::{
    histogram::{Histogram, HistogramSnapshot},
    meter::{Meter, MeterSnapshot},
};

/// Duration distribution (nanoseconds) combined with the rate of updates.
#[derive(Debug, Default)]
pub struct Timer {
    histogram: Histogram,
    meter: Meter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimerSnapshot {
    pub histogram: HistogramSnapshot,
    pub meter: MeterSnapshot,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reservoir(reservoir_size: usize) -> Self {
        Self {
            histogram: Histogram::new(reservoir_size),
            meter: Meter::new(),
        }
    }

    pub fn update(&self, elapsed: Duration) {
        self.histogram.update(duration_nanos(elapsed));
        self.meter.mark(1);
    }

    pub fn update_since(&self, start: Instant) {
        self.update(start.elapsed());
    }

    pub fn time<T>(&self, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        self.update_since(start);
        result
    }

    pub fn stop(&self) {
        self.meter.stop();
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            histogram: self.histogram.snapshot(),
            meter: self.meter.snapshot(),
        }
    }
}

impl TimerSnapshot {
    pub fn count(&self) -> i64 {
        self.histogram.count()
    }

    pub fn percentiles(&self, quantiles: &[f64]) -> Vec<f64> {
        self.histogram.percentiles(quantiles)
    }
}

pub(crate) fn duration_nanos(elapsed: Duration) -> i64 {
    i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Timer;

    #[test]
    fn update_feeds_histogram_and_meter() {
        let timer = Timer::new();
        timer.update(Duration::from_millis(2));
        timer.update(Duration::from_millis(4));

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.count(), 2);
        assert_eq!(snapshot.meter.count, 2);
        assert_eq!(snapshot.histogram.min(), 2_000_000);
        assert_eq!(snapshot.histogram.max(), 4_000_000);
        assert_eq!(snapshot.histogram.mean(), 3_000_000.0);
    }

    #[test]
    fn reservoir_bounds_percentiles_not_count() {
        let timer = Timer::with_reservoir(2);
        for nanos in [100, 300, 500] {
            timer.update(Duration::from_nanos(nanos));
        }

        let snapshot = timer.snapshot();
        assert_eq!(snapshot.count(), 3);
        assert_eq!(snapshot.histogram.values(), &[300, 500]);
        assert_eq!(snapshot.percentiles(&[0.0, 0.99]), vec![300.0, 500.0]);
    }

    #[test]
    fn time_returns_closure_result() {
        let timer = Timer::new();
        let value = timer.time(|| 7);

        assert_eq!(value, 7);
        assert_eq!(timer.snapshot().count(), 1);
    }
}
