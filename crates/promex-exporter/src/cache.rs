use std::{
    collections::HashMap,
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use tracing::debug;

use crate::key::{GaugeSpelling, MetricKey, MetricType};

/// Process-lifetime map from raw metric name to its [`MetricKey`].
///
/// Entries are never evicted: metric names are fixed at startup, so the map
/// stops growing after the first full scrape.
#[derive(Debug, Default)]
pub struct HeaderCache {
    spelling: GaugeSpelling,
    keys: RwLock<HashMap<String, Arc<MetricKey>>>,
    constructions: AtomicU64,
}

impl HeaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spelling(spelling: GaugeSpelling) -> Self {
        Self {
            spelling,
            ..Self::default()
        }
    }

    pub fn spelling(&self) -> GaugeSpelling {
        self.spelling
    }

    /// Returns the cached key for `name`, building it on first use. The
    /// declared type only matters for that first call.
    pub fn resolve(&self, name: &str, metric_type: MetricType) -> Arc<MetricKey> {
        if let Ok(guard) = self.keys.read()
            && let Some(existing) = guard.get(name)
        {
            return Arc::clone(existing);
        }

        match self.keys.write() {
            Ok(mut guard) => {
                let key = guard.entry(name.to_string()).or_insert_with(|| {
                    let key = self.construct(name, metric_type);
                    debug!(name, key = key.key(), "cached exposition header");
                    key
                });
                Arc::clone(key)
            }
            Err(_) => self.construct(name, metric_type),
        }
    }

    /// Number of keys built so far, including uncached fallbacks.
    pub fn constructions(&self) -> u64 {
        self.constructions.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.keys.read().map(|keys| keys.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn construct(&self, name: &str, metric_type: MetricType) -> Arc<MetricKey> {
        self.constructions.fetch_add(1, Ordering::Relaxed);
        Arc::new(MetricKey::new(name, metric_type, self.spelling))
    }
}
