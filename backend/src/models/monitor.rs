//! Monitor model
//!
//! An append-only, time-stamped level recorder. Monitors are the single source
//! of truth for resource occupancy, queue length and entity activity: every
//! admission or queueing decision is derived from `last_value()` and recorded
//! as a new sample, so the sample history is the complete audit trail of a run.
//!
//! # Example
//!
//! ```rust
//! use queueing_simulator_core_rs::Monitor;
//!
//! let mut mon = Monitor::new("doctor.server");
//! mon.record_increment(0.0, 1.0);
//! mon.record_increment(1.5, 1.0);
//! mon.record_decrement(4.0, 1.0);
//!
//! assert_eq!(mon.last_value(), 1.0);
//! assert_eq!(mon.samples().len(), 3);
//! ```

use crate::core::SimTime;
use serde::{Deserialize, Serialize};

/// A single recorded level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorSample {
    pub time: SimTime,
    pub level: f64,
}

/// Time-stamped level recorder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    name: String,
    samples: Vec<MonitorSample>,
}

impl Monitor {
    /// Create an empty monitor (level 0)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last recorded level, or 0 if nothing was recorded yet
    pub fn last_value(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.level)
    }

    /// Record an absolute level at `time`
    pub fn record(&mut self, time: SimTime, level: f64) {
        self.samples.push(MonitorSample { time, level });
    }

    /// Record the last level raised by `amount`
    pub fn record_increment(&mut self, time: SimTime, amount: f64) {
        let level = self.last_value() + amount;
        self.record(time, level);
    }

    /// Record the last level lowered by `amount`
    pub fn record_decrement(&mut self, time: SimTime, amount: f64) {
        let level = self.last_value() - amount;
        self.record(time, level);
    }

    /// Full sample history in recording order
    pub fn samples(&self) -> &[MonitorSample] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
