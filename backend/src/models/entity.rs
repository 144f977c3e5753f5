//! Entity model
//!
//! A simulated process instance moving through a sequence of events.
//! Each entity has:
//! - A pending-event queue (owns the events it has yet to run)
//! - An own-state monitor (1 while a timeout is active, 0 otherwise)
//! - A `leave` flag, raised when a seize can neither be served nor queued
//!
//! Events refer back to their entity through an [`EntityId`] handle into the
//! entity table held by `SimulationState`, never through an owning pointer.

use crate::events::Event;
use crate::models::monitor::Monitor;
use std::collections::VecDeque;
use std::fmt;

/// Handle to an entity in the simulation state's entity table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Simulated process instance
///
/// # Example
/// ```
/// use queueing_simulator_core_rs::{Entity, EntityId, Event};
///
/// let mut entity = Entity::new(EntityId(0), "customer0");
/// entity.push_event(Event::timeout(3.0));
/// entity.push_event(Event::timeout(4.0));
///
/// assert_eq!(entity.pending_len(), 2);
/// let first = entity.get_event().unwrap();
/// assert_eq!(first.end_time(), -1.0);
/// assert_eq!(entity.pending_len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    name: String,
    pending: VecDeque<Event>,
    monitor: Monitor,
    leave: bool,
}

impl Entity {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            monitor: Monitor::new(format!("{}.state", name)),
            name,
            pending: VecDeque::new(),
            leave: false,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append an event, binding it to this entity
    pub fn push_event(&mut self, mut event: Event) {
        event.set_parent_entity(self.id);
        self.pending.push_back(event);
    }

    /// Put an event back at the head of the queue
    pub fn push_front_event(&mut self, mut event: Event) {
        event.set_parent_entity(self.id);
        self.pending.push_front(event);
    }

    /// Pop the next pending event, transferring ownership to the caller
    pub fn get_event(&mut self) -> Option<Event> {
        self.pending.pop_front()
    }

    pub fn peek_event(&self) -> Option<&Event> {
        self.pending.front()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_events(&self) -> impl Iterator<Item = &Event> {
        self.pending.iter()
    }

    /// Drop every pending event
    pub fn clear_events(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn leave(&self) -> bool {
        self.leave
    }

    pub fn set_leave(&mut self, leave: bool) {
        self.leave = leave;
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    pub fn monitor_mut(&mut self) -> &mut Monitor {
        &mut self.monitor
    }
}
