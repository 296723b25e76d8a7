use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use promex_common::error::Result;
use promex_metrics::{Gauge, Registry, ResettingTimer};
use tracing::debug;

/// Self-metrics of the exporter process, refreshed on an interval.
pub struct ProcessCollector {
    start_time: Instant,
    uptime_seconds: Arc<Gauge>,
    resident_memory_bytes: Arc<Gauge>,
    threads: Arc<Gauge>,
    refresh_duration: Arc<ResettingTimer>,
}

impl ProcessCollector {
    pub fn register(registry: &Registry) -> Result<Self> {
        Ok(Self {
            start_time: Instant::now(),
            uptime_seconds: registry.register_gauge("process/uptime")?,
            resident_memory_bytes: registry.register_gauge("process/resident_memory_bytes")?,
            threads: registry.register_gauge("process/threads")?,
            refresh_duration: registry.register_resetting_timer("process/collector/refresh")?,
        })
    }

    pub fn refresh(&self) {
        let started = Instant::now();

        self.uptime_seconds
            .update(self.start_time.elapsed().as_secs() as i64);

        match read_resident_memory_bytes() {
            Some(resident_bytes) => self
                .resident_memory_bytes
                .update(saturating_i64_from_u64(resident_bytes)),
            None => debug!("resident memory size unavailable"),
        }

        if let Some(threads) = read_thread_count() {
            self.threads.update(saturating_i64_from_u64(threads));
        }

        self.refresh_duration.update_since(started);
    }

    pub fn spawn_refresh(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                self.refresh();
            }
        })
    }
}

fn saturating_i64_from_u64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(target_os = "linux")]
fn read_status_field(field: &str) -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    status
        .lines()
        .find_map(|line| line.strip_prefix(field))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|value| value.parse::<u64>().ok())
}

#[cfg(target_os = "linux")]
fn read_resident_memory_bytes() -> Option<u64> {
    read_status_field("VmRSS:")?.checked_mul(1024)
}

#[cfg(target_os = "linux")]
fn read_thread_count() -> Option<u64> {
    read_status_field("Threads:")
}

#[cfg(not(target_os = "linux"))]
fn read_resident_memory_bytes() -> Option<u64> {
    None
}

#[cfg(not(target_os = "linux"))]
fn read_thread_count() -> Option<u64> {
    std::thread::available_parallelism()
        .ok()
        .map(|parallelism| parallelism.get() as u64)
}

#[cfg(test)]
mod tests {
    use promex_metrics::{Metric, Registry};

    use super::{ProcessCollector, saturating_i64_from_u64};

    #[test]
    fn registers_process_metrics() {
        let registry = Registry::new();
        let collector = ProcessCollector::register(&registry).unwrap();
        collector.refresh();

        assert_eq!(registry.len(), 4);
        let Some(Metric::ResettingTimer(timer)) = registry.get("process/collector/refresh") else {
            panic!("expected a resetting timer");
        };
        assert_eq!(timer.snapshot().values().len(), 1);
    }

    #[test]
    fn second_registration_fails() {
        let registry = Registry::new();
        ProcessCollector::register(&registry).unwrap();

        assert!(ProcessCollector::register(&registry).is_err());
    }

    #[test]
    fn saturates_large_values() {
        assert_eq!(saturating_i64_from_u64(u64::MAX), i64::MAX);
        assert_eq!(saturating_i64_from_u64(12), 12);
    }
}
