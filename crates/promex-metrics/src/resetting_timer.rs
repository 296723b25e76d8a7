use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

use crate::timer::duration_nanos;

/// Collects raw durations (nanoseconds) and hands them over on snapshot,
/// starting an empty collection window each time.
#[derive(Debug, Default)]
pub struct ResettingTimer {
    values: Mutex<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResettingTimerSnapshot {
    values: Vec<i64>,
    mean: f64,
}

impl ResettingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, elapsed: Duration) {
        if let Ok(mut values) = self.values.lock() {
            values.push(duration_nanos(elapsed));
        }
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

    pub fn snapshot(&self) -> ResettingTimerSnapshot {
        let values = match self.values.lock() {
            Ok(mut values) => std::mem::take(&mut *values),
            Err(_) => Vec::new(),
        };
        ResettingTimerSnapshot::from_values(values)
    }
}

impl ResettingTimerSnapshot {
    pub fn from_values(mut values: Vec<i64>) -> Self {
        values.sort_unstable();
        let mean = if values.is_empty() {
            0.0
        } else {
            values.iter().map(|value| *value as f64).sum::<f64>() / values.len() as f64
        };
        Self { values, mean }
    }

    /// Recorded values, ascending.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Nearest-rank percentiles on the 0..=100 scale.
    pub fn percentiles(&self, percentiles: &[f64]) -> Vec<i64> {
        let count = self.values.len();
        let Some(&max) = self.values.last() else {
            return vec![0; percentiles.len()];
        };

        percentiles
            .iter()
            .map(|percentile| {
                if count == 1 {
                    return max;
                }
                let mut index = ((percentile / 100.0) * count as f64 + 0.5).floor() as usize;
                if index > 0 {
                    index -= 1;
                }
                self.values[index.min(count - 1)]
            })
            .collect()
    }
}
