pub mod counter;
pub mod gauge;
pub mod healthcheck;
pub mod histogram;
pub mod meter;
pub mod registry;
pub mod resetting_timer;
pub mod timer;

pub use counter::{Counter, CounterSnapshot};
pub use gauge::{Gauge, GaugeFloat64, GaugeFloat64Snapshot, GaugeSnapshot};
pub use healthcheck::Healthcheck;
pub use histogram::{DEFAULT_RESERVOIR_SIZE, Histogram, HistogramSnapshot};
pub use meter::{Ewma, Meter, MeterSnapshot};
pub use registry::{Metric, Registry};
pub use resetting_timer::{ResettingTimer, ResettingTimerSnapshot};
pub use timer::{Timer, TimerSnapshot};
