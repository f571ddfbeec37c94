//! Rolling-window float aggregation.
//!
//! [`RollingFloat`] keeps lifetime sums next to a fixed ring of the most recent
//! samples, so a [`RollingReport`] can show both "since start" and "recently"
//! averages without keeping the whole history.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::Value;

use crate::counter::format_thousands;
use crate::registry::{Registry, RegistryError, Var};

/// Window used when a zero-sized one is requested.
pub const DEFAULT_WINDOW: usize = 100;

#[derive(Debug)]
struct Window {
    reports: u64,
    value_sum: f64,
    delta_sum: f64,
    values: Vec<f64>,
}

impl Window {
    fn cursor(&self) -> usize {
        (self.reports % self.values.len() as u64) as usize
    }
}

/// Aggregates a stream of `f64` samples from any number of threads.
///
/// All state sits behind one mutex: a report needs the ring and both sums from the
/// same generation, which independent atomics cannot give.
#[derive(Debug)]
pub struct RollingFloat {
    window: Mutex<Window>,
}

impl RollingFloat {
    /// Seeded aggregator. `initial` counts as the first report and goes into both
    /// lifetime sums but is not written to the ring, so `last_value` starts at zero.
    pub fn new(initial: f64, window_size: usize) -> Self {
        let rolling = Self::with_window(window_size);
        {
            let mut w = rolling.lock();
            w.reports = 1;
            w.value_sum = initial;
            // delta against the zero-filled slot
            w.delta_sum = initial;
        }
        rolling
    }

    /// Aggregator with no reports yet.
    pub fn with_window(window_size: usize) -> Self {
        let size = if window_size == 0 { DEFAULT_WINDOW } else { window_size };
        Self {
            window: Mutex::new(Window {
                reports: 0,
                value_sum: 0.0,
                delta_sum: 0.0,
                values: vec![0.0; size],
            }),
        }
    }

    /// Build a seeded aggregator and publish it under `name`.
    pub fn publish(
        registry: &Registry,
        name: &str,
        initial: f64,
        window_size: usize,
    ) -> Result<Arc<Self>, RegistryError> {
        registry.publish(name, Arc::new(Self::new(initial, window_size)))
    }

    fn lock(&self) -> MutexGuard<'_, Window> {
        // Every update completes before the guard drops, so a poisoned window is
        // still consistent.
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn window_size(&self) -> usize {
        self.lock().values.len()
    }

    pub fn add(&self, sample: f64) {
        let mut w = self.lock();
        let evicted = w.values[w.cursor()];
        w.delta_sum += sample - evicted;
        w.value_sum += sample;
        w.reports += 1;
        // Written one slot past the one read above; last_value and the rolling
        // averages depend on this placement.
        let next = w.cursor();
        w.values[next] = sample;
    }

    pub fn report(&self) -> RollingReport {
        let w = self.lock();
        if w.reports == 0 {
            return RollingReport::default();
        }

        let len = w.values.len();
        let start = w.cursor();
        let mut rolling_delta = 0.0;
        for j in 0..len {
            let i = start + j;
            rolling_delta += w.values[i % len] - w.values[(i + 1) % len];
        }

        let reports = w.reports as f64;
        RollingReport {
            reports: w.reports,
            window_size: len as u64,
            last_value: w.values[start],
            value_avg: w.value_sum / reports,
            delta_avg: w.delta_sum / reports,
            rolling_value_avg: w.values.iter().sum::<f64>() / len as f64,
            rolling_delta_avg: rolling_delta / len as f64,
        }
    }
}

impl Default for RollingFloat {
    fn default() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }
}

impl fmt::Display for RollingFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.report(), f)
    }
}

impl Var for RollingFloat {
    fn json(&self) -> Value {
        serde_json::to_value(self.report()).unwrap_or(Value::Null)
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

/// Point-in-time view of a [`RollingFloat`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RollingReport {
    pub reports: u64,
    pub window_size: u64,
    pub last_value: f64,
    pub value_avg: f64,
    pub delta_avg: f64,
    pub rolling_value_avg: f64,
    pub rolling_delta_avg: f64,
}

impl RollingReport {
    /// Lifetime sum implied by the average, `value_avg * reports`.
    pub fn value_sum(&self) -> f64 {
        self.value_avg * self.reports as f64
    }
}

impl fmt::Display for RollingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reports: {}, Window Size: {}, Last Value: {:.6}, Value Avg: {:.6}, Delta Avg: {:.6}, Rolling Value Avg: {:.6}, Rolling Delta Avg: {:.6}",
            format_thousands(self.reports),
            format_thousands(self.window_size),
            self.last_value,
            self.value_avg,
            self.delta_avg,
            self.rolling_value_avg,
            self.rolling_delta_avg,
        )
    }
}
