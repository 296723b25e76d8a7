use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicI64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeSnapshot {
    pub value: i64,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, value: i64) {
        self.value.store(value, Ordering::Relaxed);
    }

    pub fn inc(&self, value: i64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    pub fn dec(&self, value: i64) {
        self.value.fetch_sub(value, Ordering::Relaxed);
    }

    pub fn value(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> GaugeSnapshot {
        GaugeSnapshot {
            value: self.value(),
        }
    }
}

/// Floating point gauge, stored as raw `f64` bits.
#[derive(Debug)]
pub struct GaugeFloat64 {
    bits: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeFloat64Snapshot {
    pub value: f64,
}

impl GaugeFloat64 {
    pub fn new() -> Self {
        Self {
            bits: AtomicU64::new(0.0_f64.to_bits()),
        }
    }

    pub fn update(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn snapshot(&self) -> GaugeFloat64Snapshot {
        GaugeFloat64Snapshot {
            value: self.value(),
        }
    }
}

impl Default for GaugeFloat64 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Gauge, GaugeFloat64};

    #[test]
    fn gauge_update_overwrites_and_inc_dec_adjust() {
        let gauge = Gauge::new();
        gauge.update(40);
        gauge.inc(5);
        gauge.dec(3);
        assert_eq!(gauge.snapshot().value, 42);

        gauge.update(-7);
        assert_eq!(gauge.value(), -7);
    }

    #[test]
    fn float_gauge_keeps_exact_value() {
        let gauge = GaugeFloat64::new();
        assert_eq!(gauge.value(), 0.0);

        gauge.update(0.125);
        assert_eq!(gauge.snapshot().value, 0.125);
    }
}
