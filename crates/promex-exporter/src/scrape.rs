use std::sync::Arc;

use promex_metrics::{Metric, Registry};

use crate::{cache::HeaderCache, render::LineRenderer};

/// Drives one full scrape: walks the registry and renders every supported
/// metric into a single buffer.
#[derive(Debug, Clone, Default)]
pub struct ScrapeAssembler {
    cache: Arc<HeaderCache>,
}

impl ScrapeAssembler {
    pub fn new(cache: Arc<HeaderCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &HeaderCache {
        &self.cache
    }

    pub fn render(&self, registry: &Registry, out: &mut String) {
        let renderer = LineRenderer::new(&self.cache);

        registry.each(|name, metric| match metric {
            Metric::Counter(counter) => renderer.counter(out, name, &counter.snapshot()),
            Metric::Gauge(gauge) => renderer.gauge(out, name, &gauge.snapshot()),
            Metric::GaugeFloat64(gauge) => renderer.gauge_float64(out, name, &gauge.snapshot()),
            Metric::Histogram(histogram) => renderer.histogram(out, name, &histogram.snapshot()),
            Metric::Meter(meter) => renderer.meter(out, name, &meter.snapshot()),
            Metric::Timer(timer) => renderer.timer(out, name, &timer.snapshot()),
            Metric::ResettingTimer(timer) => renderer.resetting_timer(out, name, &timer.snapshot()),
            // Healthchecks and any kind without an exposition form are dropped.
            _ => {}
        });
    }

    pub fn render_to_string(&self, registry: &Registry) -> String {
        let mut out = String::new();
        self.render(registry, &mut out);
        out
    }
}
