use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

const TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Exponentially weighted moving average of an event rate, in events per
/// second. Expects `tick` to be called once per 5-second interval.
#[derive(Debug, Clone)]
pub struct Ewma {
    alpha: f64,
    uncounted: i64,
    rate: f64,
    initialized: bool,
}

impl Ewma {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            uncounted: 0,
            rate: 0.0,
            initialized: false,
        }
    }

    pub fn with_minutes(minutes: f64) -> Self {
        Self::new(1.0 - (-(TICK_INTERVAL.as_secs_f64()) / 60.0 / minutes).exp())
    }

    pub fn update(&mut self, events: i64) {
        self.uncounted += events;
    }

    pub fn tick(&mut self) {
        let instant_rate = self.uncounted as f64 / TICK_INTERVAL.as_secs_f64();
        self.uncounted = 0;

        if self.initialized {
            self.rate += self.alpha * (instant_rate - self.rate);
        } else {
            self.rate = instant_rate;
            self.initialized = true;
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

#[derive(Debug)]
pub struct Meter {
    state: Mutex<MeterState>,
}

#[derive(Debug)]
struct MeterState {
    count: i64,
    rate1: Ewma,
    rate5: Ewma,
    rate15: Ewma,
    started_at: Instant,
    last_tick: Instant,
    stopped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterSnapshot {
    pub count: i64,
    pub rate1: f64,
    pub rate5: f64,
    pub rate15: f64,
    pub rate_mean: f64,
}

impl Meter {
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    fn started_at(now: Instant) -> Self {
        Self {
            state: Mutex::new(MeterState {
                count: 0,
                rate1: Ewma::with_minutes(1.0),
                rate5: Ewma::with_minutes(5.0),
                rate15: Ewma::with_minutes(15.0),
                started_at: now,
                last_tick: now,
                stopped: false,
            }),
        }
    }

    pub fn mark(&self, events: i64) {
        self.mark_at(events, Instant::now());
    }

    fn mark_at(&self, events: i64, now: Instant) {
        if let Ok(mut state) = self.state.lock() {
            if state.stopped {
                return;
            }
            state.catch_up(now);
            state.count += events;
            state.rate1.update(events);
            state.rate5.update(events);
            state.rate15.update(events);
        }
    }

    /// Freezes the meter; later marks are ignored.
    pub fn stop(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.stopped = true;
        }
    }

    pub fn count(&self) -> i64 {
        match self.state.lock() {
            Ok(state) => state.count,
            Err(_) => 0,
        }
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        self.snapshot_at(Instant::now())
    }

    fn snapshot_at(&self, now: Instant) -> MeterSnapshot {
        let Ok(mut state) = self.state.lock() else {
            return MeterSnapshot::default();
        };
        if !state.stopped {
            state.catch_up(now);
        }

        let elapsed = now
            .saturating_duration_since(state.started_at)
            .as_secs_f64();
        let rate_mean = if elapsed > 0.0 {
            state.count as f64 / elapsed
        } else {
            0.0
        };

        MeterSnapshot {
            count: state.count,
            rate1: state.rate1.rate(),
            rate5: state.rate5.rate(),
            rate15: state.rate15.rate(),
            rate_mean,
        }
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for MeterSnapshot {
    fn default() -> Self {
        Self {
            count: 0,
            rate1: 0.0,
            rate5: 0.0,
            rate15: 0.0,
            rate_mean: 0.0,
        }
    }
}

impl MeterState {
    // One tick per whole interval elapsed since the last one.
    fn catch_up(&mut self, now: Instant) {
        while now.saturating_duration_since(self.last_tick) >= TICK_INTERVAL {
            self.rate1.tick();
            self.rate5.tick();
            self.rate15.tick();
            self.last_tick += TICK_INTERVAL;
        }
    }
}
