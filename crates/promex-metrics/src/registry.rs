use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use promex_common::error::{PromexError, Result};
use tracing::debug;

use crate::{
    counter::Counter,
    gauge::{Gauge, GaugeFloat64},
    healthcheck::Healthcheck,
    histogram::Histogram,
    meter::Meter,
    resetting_timer::ResettingTimer,
    timer::Timer,
};

/// A registered metric of any kind. New kinds may be added, so consumers
/// matching on it need a fallback arm.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Metric {
    Counter(Arc<Counter>),
    Gauge(Arc<Gauge>),
    GaugeFloat64(Arc<GaugeFloat64>),
    Histogram(Arc<Histogram>),
    Meter(Arc<Meter>),
    Timer(Arc<Timer>),
    ResettingTimer(Arc<ResettingTimer>),
    Healthcheck(Arc<Healthcheck>),
}

impl Metric {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Counter(_) => "counter",
            Self::Gauge(_) => "gauge",
            Self::GaugeFloat64(_) => "gauge_float64",
            Self::Histogram(_) => "histogram",
            Self::Meter(_) => "meter",
            Self::Timer(_) => "timer",
            Self::ResettingTimer(_) => "resetting_timer",
            Self::Healthcheck(_) => "healthcheck",
        }
    }
}

pub struct Registry {
    metrics: RwLock<HashMap<String, Metric>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            metrics: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(&self, name: &str, metric: Metric) -> Result<()> {
        let mut metrics = self.metrics.write().map_err(|_| {
            PromexError::InternalError("failed to acquire metrics registry lock".to_string())
        })?;

        if metrics.contains_key(name) {
            return Err(PromexError::InvalidArgument(format!(
                "metric already registered: {name}"
            )));
        }

        debug!(name, kind = metric.kind(), "registered metric");
        metrics.insert(name.to_string(), metric);
        Ok(())
    }

    pub fn register_counter(&self, name: &str) -> Result<Arc<Counter>> {
        let counter = Arc::new(Counter::new());
        self.register(name, Metric::Counter(Arc::clone(&counter)))?;
        Ok(counter)
    }

    pub fn register_gauge(&self, name: &str) -> Result<Arc<Gauge>> {
        let gauge = Arc::new(Gauge::new());
        self.register(name, Metric::Gauge(Arc::clone(&gauge)))?;
        Ok(gauge)
    }

    pub fn register_gauge_float64(&self, name: &str) -> Result<Arc<GaugeFloat64>> {
        let gauge = Arc::new(GaugeFloat64::new());
        self.register(name, Metric::GaugeFloat64(Arc::clone(&gauge)))?;
        Ok(gauge)
    }

    pub fn register_histogram(&self, name: &str, reservoir_size: usize) -> Result<Arc<Histogram>> {
        let histogram = Arc::new(Histogram::new(reservoir_size));
        self.register(name, Metric::Histogram(Arc::clone(&histogram)))?;
        Ok(histogram)
    }

    pub fn register_meter(&self, name: &str) -> Result<Arc<Meter>> {
        let meter = Arc::new(Meter::new());
        self.register(name, Metric::Meter(Arc::clone(&meter)))?;
        Ok(meter)
    }

    pub fn register_timer(&self, name: &str) -> Result<Arc<Timer>> {
        let timer = Arc::new(Timer::new());
        self.register(name, Metric::Timer(Arc::clone(&timer)))?;
        Ok(timer)
    }

    pub fn register_resetting_timer(&self, name: &str) -> Result<Arc<ResettingTimer>> {
        let timer = Arc::new(ResettingTimer::new());
        self.register(name, Metric::ResettingTimer(Arc::clone(&timer)))?;
        Ok(timer)
    }

    pub fn register_healthcheck(&self, name: &str) -> Result<Arc<Healthcheck>> {
        let healthcheck = Arc::new(Healthcheck::new());
        self.register(name, Metric::Healthcheck(Arc::clone(&healthcheck)))?;
        Ok(healthcheck)
    }

    pub fn get(&self, name: &str) -> Option<Metric> {
        self.metrics.read().ok()?.get(name).cloned()
    }

    pub fn unregister(&self, name: &str) -> Option<Metric> {
        self.metrics.write().ok()?.remove(name)
    }

    pub fn len(&self) -> usize {
        self.metrics.read().map(|metrics| metrics.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visits every registered metric in name order. The entries are copied
    /// out first, so `f` runs without holding the registry lock.
    pub fn each(&self, mut f: impl FnMut(&str, &Metric)) {
        let mut entries = match self.metrics.read() {
            Ok(guard) => guard
                .iter()
                .map(|(name, metric)| (name.clone(), metric.clone()))
                .collect::<Vec<_>>(),
            Err(_) => return,
        };

        entries.sort_by(|left, right| left.0.cmp(&right.0));
        for (name, metric) in &entries {
            f(name, metric);
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use promex_common::PromexError;

    use super::{Metric, Registry};

    #[test]
    fn duplicate_registration_is_rejected() {
        let registry = Registry::new();
        registry.register_counter("db/reads").unwrap();

        let err = registry.register_gauge("db/reads").unwrap_err();
        assert!(matches!(err, PromexError::InvalidArgument(_)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn each_visits_entries_in_name_order() {
        let registry = Registry::new();
        registry.register_meter("p2p/egress").unwrap();
        registry.register_counter("chain/head").unwrap();
        registry.register_healthcheck("node/health").unwrap();

        let mut seen = Vec::new();
        registry.each(|name, metric| seen.push((name.to_string(), metric.kind())));

        assert_eq!(
            seen,
            vec![
                ("chain/head".to_string(), "counter"),
                ("node/health".to_string(), "healthcheck"),
                ("p2p/egress".to_string(), "meter"),
            ]
        );
    }

    #[test]
    fn get_shares_the_live_metric() {
        let registry = Registry::new();
        let counter = registry.register_counter("txpool/pending").unwrap();
        counter.inc(3);

        let Some(Metric::Counter(found)) = registry.get("txpool/pending") else {
            panic!("expected a counter");
        };
        assert_eq!(found.count(), 3);
    }

    #[test]
    fn unregister_frees_the_name() {
        let registry = Registry::new();
        registry.register_timer("rpc/duration").unwrap();

        assert!(registry.unregister("rpc/duration").is_some());
        assert!(registry.is_empty());
        assert!(registry.register_resetting_timer("rpc/duration").is_ok());
    }
}
