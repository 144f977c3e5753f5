//! Resource model
//!
//! A named, finite-capacity server with an optional waiting line.
//!
//! The resource keeps no occupancy counters of its own: the server monitor
//! holds the units currently in service and the queue monitor holds the units
//! waiting. `capacity` and `queue_size` are the only limits.
//!
//! # Queue bound
//!
//! - `queue_size == 0`: no waiting line, requests that cannot be served leave
//! - `queue_size < 0`: unbounded waiting line
//! - `queue_size > 0`: at most that many units may wait

use crate::core::SimTime;
use crate::models::monitor::Monitor;

/// Finite-capacity server with a waiting line
///
/// # Example
/// ```
/// use queueing_simulator_core_rs::Resource;
///
/// let res = Resource::new("doctor", 2.0, 3);
/// assert_eq!(res.capacity(), 2.0);
/// assert_eq!(res.server_count(), 0.0);
/// assert!(res.queue_has_room(2.0));
/// assert!(!res.queue_has_room(3.0));
/// ```
#[derive(Debug, Clone)]
pub struct Resource {
    name: String,
    capacity: f64,
    queue_size: i64,
    /// Units in service
    server: Monitor,
    /// Units waiting
    queue: Monitor,
    /// Time of the most recent release
    last_release: SimTime,
}

impl Resource {
    pub fn new(name: impl Into<String>, capacity: f64, queue_size: i64) -> Self {
        let name = name.into();
        Self {
            server: Monitor::new(format!("{}.server", name)),
            queue: Monitor::new(format!("{}.queue", name)),
            name,
            capacity,
            queue_size,
            last_release: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn queue_size(&self) -> i64 {
        self.queue_size
    }

    pub fn last_release(&self) -> SimTime {
        self.last_release
    }

    pub(crate) fn set_last_release(&mut self, time: SimTime) {
        self.last_release = time;
    }

    pub fn server_monitor(&self) -> &Monitor {
        &self.server
    }

    pub fn queue_monitor(&self) -> &Monitor {
        &self.queue
    }

    pub(crate) fn server_monitor_mut(&mut self) -> &mut Monitor {
        &mut self.server
    }

    pub(crate) fn queue_monitor_mut(&mut self) -> &mut Monitor {
        &mut self.queue
    }

    /// Units currently in service
    pub fn server_count(&self) -> f64 {
        self.server.last_value()
    }

    /// Units currently waiting
    pub fn queue_count(&self) -> f64 {
        self.queue.last_value()
    }

    /// Whether `amount` more units fit in the server on top of `server_usage`
    pub fn can_serve(&self, server_usage: f64, amount: f64) -> bool {
        self.capacity >= server_usage + amount
    }

    /// Whether a new request may join a queue currently holding `queue_usage`
    pub fn queue_has_room(&self, queue_usage: f64) -> bool {
        self.queue_size != 0 && (self.queue_size < 0 || self.queue_size as f64 > queue_usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_queue_never_has_room() {
        let res = Resource::new("r", 1.0, 0);
        assert!(!res.queue_has_room(0.0));
    }

    #[test]
    fn test_unbounded_queue_always_has_room() {
        let res = Resource::new("r", 1.0, -1);
        assert!(res.queue_has_room(0.0));
        assert!(res.queue_has_room(1_000_000.0));
    }

    #[test]
    fn test_monitor_names_follow_resource() {
        let res = Resource::new("desk", 1.0, -1);
        assert_eq!(res.server_monitor().name(), "desk.server");
        assert_eq!(res.queue_monitor().name(), "desk.queue");
    }

    #[test]
    fn test_can_serve_exact_fit() {
        let res = Resource::new("r", 2.0, 0);
        assert!(res.can_serve(1.0, 1.0));
        assert!(!res.can_serve(1.5, 1.0));
    }
}
