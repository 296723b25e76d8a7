//! Prometheus text exposition for a `promex_metrics::Registry`.
//!
//! [`ScrapeAssembler`] walks a registry and renders each metric with
//! [`LineRenderer`], whose series names and header blocks come from a shared
//! [`HeaderCache`]. The [`server`] module serves the result over HTTP.

pub mod cache;
pub mod config;
pub mod key;
pub mod pool;
pub mod render;
pub mod scrape;
pub mod server;

pub use cache::HeaderCache;
pub use config::ExporterConfig;
pub use key::{GaugeSpelling, MetricKey, MetricType};
pub use pool::BufferPool;
pub use render::LineRenderer;
pub use scrape::ScrapeAssembler;
pub use server::{ExporterState, router, run};
