use std::time::Duration;

use crate::{key::GaugeSpelling, pool::DEFAULT_POOL_CAPACITY};

pub const DEFAULT_ADDR: &str = "127.0.0.1:6060";
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub addr: String,
    /// Deadline for a client to finish sending request headers.
    pub read_timeout: Duration,
    /// Deadline for producing the response.
    pub write_timeout: Duration,
    pub gauge_spelling: GaugeSpelling,
    pub pool_capacity: usize,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            gauge_spelling: GaugeSpelling::default(),
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}
