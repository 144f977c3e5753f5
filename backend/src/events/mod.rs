//! Event state machines
//!
//! An event is one step of an entity's process. The scheduler drives every
//! event through the same two-phase protocol:
//!
//! 1. `try_to_start(now)` is called (possibly many times) until it returns
//!    [`StartOutcome::Started`]. A [`StartOutcome::Blocked`] result is never an
//!    error: the scheduler retries on a later wake-up.
//! 2. `stop(now)` is called once the event's `end_time` has been reached.
//!
//! # Event Types
//!
//! - **Skip**: discards the next `n` pending events of its entity
//! - **Seize**: acquires resource capacity, queueing or leaving when it cannot
//! - **Release**: returns resource capacity
//! - **Timeout**: pure delay, tracked on the entity's own monitor
//!
//! The four kinds share only their lifecycle fields ([`Lifecycle`]); each
//! variant carries its own data in [`EventKind`].
//!
//! # Ownership
//!
//! The scheduler pops an event off its entity's queue before attempting it and
//! pushes it back to the front when it is blocked. A skip therefore discards
//! the events *after* itself.
//!
//! # Example
//!
//! ```rust
//! use queueing_simulator_core_rs::{Event, Resource, SimulationState, StartOutcome};
//!
//! let mut state = SimulationState::new(vec![Resource::new("desk", 1.0, -1)]);
//! let clerk = state.add_entity("clerk");
//!
//! let mut seize = Event::seize("desk", 1.0);
//! seize.set_parent_entity(clerk);
//! seize.set_early_start_time(0.0);
//!
//! let outcome = seize.try_to_start(0.0, &mut state).unwrap();
//! assert_eq!(outcome, StartOutcome::Started { at: 0.0 });
//! assert_eq!(state.get_resource("desk").unwrap().server_count(), 1.0);
//! ```

pub mod release;
pub mod seize;
pub mod skip;
pub mod timeout;

pub use release::ReleaseEvent;
pub use seize::{SeizeEvent, SeizeStatus};
pub use skip::SkipEvent;
pub use timeout::TimeoutEvent;

use crate::core::SimTime;
use crate::models::entity::EntityId;
use crate::models::resource::Resource;
use crate::models::state::SimulationState;
use thiserror::Error;

/// Fatal errors raised by the event protocol
///
/// These indicate broken bookkeeping in the model, never a timing condition.
#[derive(Debug, Error, PartialEq)]
pub enum EventError {
    #[error("Trying to release more than is in service on resource '{resource}' (entity '{entity}'): in service {in_service}, requested {requested}")]
    ReleaseExceedsUsage {
        resource: String,
        entity: String,
        in_service: f64,
        requested: f64,
    },

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("{0} is not bound to an entity")]
    Unbound(&'static str),
}

/// Why an event could not start yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// `now` is before the event's early start time
    NotYetEligible,
    /// The request just joined the resource's waiting line
    Enqueued,
    /// The request was already waiting and still does not fit
    AwaitingCapacity,
    /// No room to be served or queued; the entity's `leave` flag is set
    Rejected,
}

/// Result of a start attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StartOutcome {
    /// The event began at the effective time `at`
    Started { at: SimTime },
    /// The event must be retried later
    Blocked(BlockReason),
}

impl StartOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, StartOutcome::Started { .. })
    }

    /// Effective time of the attempt: the start time if started, else `now`
    pub fn effective_time(&self, now: SimTime) -> SimTime {
        match self {
            StartOutcome::Started { at } => *at,
            StartOutcome::Blocked(_) => now,
        }
    }
}

/// Scheduling state shared by every event kind
#[derive(Debug, Clone, PartialEq)]
pub struct Lifecycle {
    parent: Option<EntityId>,
    description: String,
    early_start_time: SimTime,
    /// -1 until a successful start
    end_time: SimTime,
    processing: bool,
    finished: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            parent: None,
            description: String::new(),
            early_start_time: 0.0,
            end_time: -1.0,
            processing: false,
            finished: false,
        }
    }
}

impl Lifecycle {
    pub fn early_start_time(&self) -> SimTime {
        self.early_start_time
    }

    pub fn end_time(&self) -> SimTime {
        self.end_time
    }

    pub(crate) fn set_end_time(&mut self, time: SimTime) {
        self.end_time = time;
    }

    /// True while `now` is before the early start time
    pub(crate) fn not_yet_eligible(&self, now: SimTime) -> bool {
        self.early_start_time > now
    }

    pub(crate) fn parent(&self, event_type: &'static str) -> Result<EntityId, EventError> {
        self.parent.ok_or(EventError::Unbound(event_type))
    }
}

/// Per-kind behavior behind the event protocol
pub trait EventProtocol {
    /// Type name reported by [`Event::event_type`]
    const TYPE: &'static str;

    fn try_to_start(
        &mut self,
        lifecycle: &mut Lifecycle,
        now: SimTime,
        state: &mut SimulationState,
    ) -> Result<StartOutcome, EventError>;

    fn stop(
        &mut self,
        lifecycle: &mut Lifecycle,
        now: SimTime,
        state: &mut SimulationState,
    ) -> Result<bool, EventError>;
}

/// The four event kinds
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Skip(SkipEvent),
    Seize(SeizeEvent),
    Release(ReleaseEvent),
    Timeout(TimeoutEvent),
}

/// One step of an entity's process
///
/// `Clone` is the event's copy operation: a clone keeps the parent handle but
/// never owns the entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    lifecycle: Lifecycle,
    kind: EventKind,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            kind,
        }
    }

    pub fn skip(n_events: usize) -> Self {
        Self::new(EventKind::Skip(SkipEvent::new(n_events)))
    }

    pub fn seize(resource: impl Into<String>, amount: f64) -> Self {
        Self::new(EventKind::Seize(SeizeEvent::new(resource, amount)))
    }

    pub fn release(resource: impl Into<String>, amount: f64) -> Self {
        Self::new(EventKind::Release(ReleaseEvent::new(resource, amount)))
    }

    pub fn timeout(duration: f64) -> Self {
        Self::new(EventKind::Timeout(TimeoutEvent::new(duration)))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.lifecycle.description = description.into();
        self
    }

    /// Copy this event and bind the copy to `parent`
    pub fn instantiate(&self, parent: EntityId) -> Self {
        let mut event = self.clone();
        event.set_parent_entity(parent);
        event
    }

    pub fn event_type(&self) -> &'static str {
        match &self.kind {
            EventKind::Skip(_) => SkipEvent::TYPE,
            EventKind::Seize(_) => SeizeEvent::TYPE,
            EventKind::Release(_) => ReleaseEvent::TYPE,
            EventKind::Timeout(_) => TimeoutEvent::TYPE,
        }
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Name of the resource a seize or release refers to
    pub fn resource_name(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Seize(e) => Some(e.resource_name()),
            EventKind::Release(e) => Some(e.resource_name()),
            EventKind::Skip(_) | EventKind::Timeout(_) => None,
        }
    }

    /// Resolve the referenced resource; `None` for skips and timeouts
    pub fn get_resource<'a>(
        &self,
        state: &'a SimulationState,
    ) -> Result<Option<&'a Resource>, EventError> {
        match self.resource_name() {
            Some(name) => state
                .get_resource(name)
                .map(Some)
                .ok_or_else(|| EventError::ResourceNotFound(name.to_string())),
            None => Ok(None),
        }
    }

    pub fn description(&self) -> &str {
        &self.lifecycle.description
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn parent_entity(&self) -> Option<EntityId> {
        self.lifecycle.parent
    }

    pub fn set_parent_entity(&mut self, entity: EntityId) {
        self.lifecycle.parent = Some(entity);
    }

    pub fn early_start_time(&self) -> SimTime {
        self.lifecycle.early_start_time
    }

    /// Set by the scheduler before each start attempt
    pub fn set_early_start_time(&mut self, time: SimTime) {
        self.lifecycle.early_start_time = time;
    }

    pub fn end_time(&self) -> SimTime {
        self.lifecycle.end_time
    }

    /// Whether a seize is currently waiting in a resource queue
    pub fn enqueued(&self) -> bool {
        match &self.kind {
            EventKind::Seize(e) => e.status() == SeizeStatus::Enqueued,
            _ => false,
        }
    }

    pub fn processing(&self) -> bool {
        self.lifecycle.processing
    }

    pub fn set_processing(&mut self, processing: bool) {
        self.lifecycle.processing = processing;
    }

    pub fn finished(&self) -> bool {
        self.lifecycle.finished
    }

    pub fn set_finished(&mut self, finished: bool) {
        self.lifecycle.finished = finished;
    }

    /// Attempt to begin the event at `now`
    pub fn try_to_start(
        &mut self,
        now: SimTime,
        state: &mut SimulationState,
    ) -> Result<StartOutcome, EventError> {
        let lifecycle = &mut self.lifecycle;
        match &mut self.kind {
            EventKind::Skip(e) => e.try_to_start(lifecycle, now, state),
            EventKind::Seize(e) => e.try_to_start(lifecycle, now, state),
            EventKind::Release(e) => e.try_to_start(lifecycle, now, state),
            EventKind::Timeout(e) => e.try_to_start(lifecycle, now, state),
        }
    }

    /// Finalize the event once its end time has been reached
    pub fn stop(&mut self, now: SimTime, state: &mut SimulationState) -> Result<bool, EventError> {
        let lifecycle = &mut self.lifecycle;
        match &mut self.kind {
            EventKind::Skip(e) => e.stop(lifecycle, now, state),
            EventKind::Seize(e) => e.stop(lifecycle, now, state),
            EventKind::Release(e) => e.stop(lifecycle, now, state),
            EventKind::Timeout(e) => e.stop(lifecycle, now, state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_events_have_no_end_time() {
        for event in [
            Event::skip(1),
            Event::seize("r", 1.0),
            Event::release("r", 1.0),
            Event::timeout(2.0),
        ] {
            assert_eq!(event.end_time(), -1.0, "{}", event.event_type());
            assert!(!event.enqueued());
            assert!(!event.processing());
            assert!(!event.finished());
            assert_eq!(event.parent_entity(), None);
        }
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Event::skip(0).event_type(), "SkipEvent");
        assert_eq!(Event::seize("r", 1.0).event_type(), "SeizeEvent");
        assert_eq!(Event::release("r", 1.0).event_type(), "ReleaseEvent");
        assert_eq!(Event::timeout(1.0).event_type(), "TimeoutEvent");
    }

    #[test]
    fn test_instantiate_binds_copy_only() {
        let template = Event::timeout(4.0).with_description("service");
        let copy = template.instantiate(EntityId(3));

        assert_eq!(copy.parent_entity(), Some(EntityId(3)));
        assert_eq!(copy.description(), "service");
        assert_eq!(template.parent_entity(), None);
    }

    #[test]
    fn test_unbound_event_is_a_contract_error() {
        let mut state = SimulationState::default();
        let mut event = Event::timeout(1.0);
        assert_eq!(
            event.try_to_start(0.0, &mut state),
            Err(EventError::Unbound("TimeoutEvent"))
        );
    }

    #[test]
    fn test_effective_time_of_blocked_attempt_is_now() {
        let outcome = StartOutcome::Blocked(BlockReason::Enqueued);
        assert!(!outcome.is_started());
        assert_eq!(outcome.effective_time(7.0), 7.0);
        assert_eq!(StartOutcome::Started { at: 5.0 }.effective_time(7.0), 5.0);
    }

    #[test]
    fn test_get_resource_resolves_by_name() {
        let state = SimulationState::new(vec![Resource::new("desk", 2.0, -1)]);

        let found = Event::seize("desk", 1.0).get_resource(&state).unwrap();
        assert_eq!(found.map(|r| r.capacity()), Some(2.0));
        assert!(matches!(Event::timeout(1.0).get_resource(&state), Ok(None)));
        assert!(matches!(
            Event::release("nowhere", 1.0).get_resource(&state),
            Err(EventError::ResourceNotFound(name)) if name == "nowhere"
        ));
    }
}
