use std::{collections::VecDeque, sync::Mutex};

pub const DEFAULT_RESERVOIR_SIZE: usize = 1028;

/// Distribution of `i64` observations over the most recent `reservoir_size`
/// updates. `count` keeps the total number of updates ever applied.
#[derive(Debug)]
pub struct Histogram {
    sample: Mutex<Sample>,
}

#[derive(Debug)]
struct Sample {
    reservoir_size: usize,
    count: i64,
    values: VecDeque<i64>,
}

impl Histogram {
    pub fn new(reservoir_size: usize) -> Self {
        let reservoir_size = reservoir_size.max(1);
        Self {
            sample: Mutex::new(Sample {
                reservoir_size,
                count: 0,
                values: VecDeque::with_capacity(reservoir_size),
            }),
        }
    }

    pub fn update(&self, value: i64) {
        if let Ok(mut sample) = self.sample.lock() {
            sample.count += 1;
            if sample.values.len() == sample.reservoir_size {
                sample.values.pop_front();
            }
            sample.values.push_back(value);
        }
    }

    pub fn count(&self) -> i64 {
        match self.sample.lock() {
            Ok(sample) => sample.count,
            Err(_) => 0,
        }
    }

    pub fn clear(&self) {
        if let Ok(mut sample) = self.sample.lock() {
            sample.count = 0;
            sample.values.clear();
        }
    }

    pub fn snapshot(&self) -> HistogramSnapshot {
        match self.sample.lock() {
            Ok(sample) => {
                HistogramSnapshot::new(sample.count, sample.values.iter().copied().collect())
            }
            Err(_) => HistogramSnapshot::new(0, Vec::new()),
        }
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVOIR_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    count: i64,
    min: i64,
    max: i64,
    mean: f64,
    variance: f64,
    sorted: Vec<i64>,
}

impl HistogramSnapshot {
    /// Builds a snapshot from a total update count and the retained values.
    pub fn new(count: i64, mut values: Vec<i64>) -> Self {
        values.sort_unstable();

        let (min, max, mean, variance) = match (values.first(), values.last()) {
            (Some(&min), Some(&max)) => {
                let len = values.len() as f64;
                let mean = values.iter().map(|value| *value as f64).sum::<f64>() / len;
                let variance = values
                    .iter()
                    .map(|value| {
                        let delta = *value as f64 - mean;
                        delta * delta
                    })
                    .sum::<f64>()
                    / len;
                (min, max, mean, variance)
            }
            _ => (0, 0, 0.0, 0.0),
        };

        Self {
            count,
            min,
            max,
            mean,
            variance,
            sorted: values,
        }
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn stddev(&self) -> f64 {
        self.variance.sqrt()
    }

    pub fn values(&self) -> &[i64] {
        &self.sorted
    }

    /// Answers fractional quantile requests (`0.5` is the median). The
    /// result has the same length as `quantiles`.
    pub fn percentiles(&self, quantiles: &[f64]) -> Vec<f64> {
        quantiles
            .iter()
            .map(|quantile| sample_percentile(&self.sorted, *quantile))
            .collect()
    }
}

fn sample_percentile(sorted: &[i64], quantile: f64) -> f64 {
    let Some((&first, &last)) = sorted.first().zip(sorted.last()) else {
        return 0.0;
    };

    let size = sorted.len() as f64;
    let pos = quantile * (size + 1.0);
    if pos.is_nan() || pos < 1.0 {
        first as f64
    } else if pos >= size {
        last as f64
    } else {
        let index = pos.floor() as usize;
        let lower = sorted[index - 1] as f64;
        let upper = sorted[index] as f64;
        lower + (pos - pos.floor()) * (upper - lower)
    }
}
