//! Simulated time for the engine
//!
//! The simulation operates in continuous simulated time (`f64` time units).
//! The clock only moves forward: every caller of the event protocol relies on
//! time being non-decreasing between calls.

use thiserror::Error;

/// Simulated time, in model time units
pub type SimTime = f64;

/// Errors raised by the simulation clock
#[derive(Debug, Error, PartialEq)]
pub enum ClockError {
    #[error("Clock cannot move backwards: now {now}, requested {requested}")]
    Backwards { now: SimTime, requested: SimTime },

    #[error("Invalid simulated time: {0}")]
    NotFinite(SimTime),
}

/// Monotonic simulated clock
///
/// # Example
/// ```
/// use queueing_simulator_core_rs::Clock;
///
/// let mut clock = Clock::new();
/// assert_eq!(clock.now(), 0.0);
///
/// clock.advance_to(2.5).unwrap();
/// assert_eq!(clock.now(), 2.5);
/// assert!(clock.advance_to(1.0).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Clock {
    /// Current simulated time
    now: SimTime,
}

impl Clock {
    /// Create a clock positioned at time zero
    pub fn new() -> Self {
        Self { now: 0.0 }
    }

    /// Get the current simulated time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Move the clock to `time`
    ///
    /// Staying at the current instant is allowed; moving backwards is not.
    ///
    /// # Example
    /// ```
    /// use queueing_simulator_core_rs::Clock;
    ///
    /// let mut clock = Clock::new();
    /// clock.advance_to(3.0).unwrap();
    /// clock.advance_to(3.0).unwrap();
    /// assert_eq!(clock.now(), 3.0);
    /// ```
    pub fn advance_to(&mut self, time: SimTime) -> Result<(), ClockError> {
        if !time.is_finite() {
            return Err(ClockError::NotFinite(time));
        }
        if time < self.now {
            return Err(ClockError::Backwards {
                now: self.now,
                requested: time,
            });
        }
        self.now = time;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backwards_move_is_rejected() {
        let mut clock = Clock::new();
        clock.advance_to(10.0).unwrap();

        let err = clock.advance_to(9.5).unwrap_err();
        assert_eq!(
            err,
            ClockError::Backwards {
                now: 10.0,
                requested: 9.5
            }
        );
        assert_eq!(clock.now(), 10.0);
    }

    #[test]
    fn test_infinite_time_is_rejected() {
        let mut clock = Clock::new();
        assert!(matches!(
            clock.advance_to(f64::INFINITY),
            Err(ClockError::NotFinite(_))
        ));
    }
}
