//! Orchestrator Engine
//!
//! Drives entities through their pending events in simulated time.
//!
//! # Architecture
//!
//! The orchestrator keeps an agenda of wake-ups ordered by time, then by
//! insertion order. Processing a wake-up for an entity:
//!
//! ```text
//! 1. Stop the entity's active timeout if its end time has been reached
//! 2. Pop the head event, set its early start time, try_to_start
//! 3. Started, ends later (timeout)  → keep as active, wake at end_time
//!    Started, instantaneous         → stop it, continue with the next event
//!    Release                        → wake every entity waiting on the resource
//!    NotYetEligible                 → push back, wake at early_start_time
//!    Enqueued                       → push back, retry at the same instant
//!    AwaitingCapacity               → push back, wait for a release
//!    Rejected                       → entity leaves, remaining steps dropped
//! 4. No events left                 → entity departs
//! ```
//!
//! # Example
//!
//! ```rust
//! use queueing_simulator_core_rs::{Event, Orchestrator, Resource, SimulationState};
//!
//! let state = SimulationState::new(vec![Resource::new("desk", 1.0, -1)]);
//! let mut orch = Orchestrator::new(state);
//!
//! let visit = vec![
//!     Event::seize("desk", 1.0),
//!     Event::timeout(3.0),
//!     Event::release("desk", 1.0),
//! ];
//! orch.spawn("c0", &visit, 0.0).unwrap();
//! orch.spawn("c1", &visit, 1.0).unwrap();
//!
//! let summary = orch.run(f64::INFINITY).unwrap();
//! assert_eq!(summary.departures, 2);
//! assert_eq!(orch.arrivals()[1].end_time, Some(6.0));
//! ```

use crate::core::{Clock, ClockError, SimTime};
use crate::events::{BlockReason, Event, EventError, EventKind, StartOutcome};
use crate::models::entity::EntityId;
use crate::models::state::SimulationState;
use crate::orchestrator::config::{ConfigError, ModelConfig};
use crate::orchestrator::report::{ArrivalRecord, ResourceReport, SimulationReport};
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap, HashMap, VecDeque};
use thiserror::Error;
use tracing::{debug, info};

// ============================================================================
// Errors
// ============================================================================

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Clock error: {0}")]
    Clock(#[from] ClockError),
}

// ============================================================================
// Agenda
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Wakeup {
    time: SimTime,
    seq: u64,
    entity: EntityId,
}

impl PartialEq for Wakeup {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Wakeup {}

impl PartialOrd for Wakeup {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Wakeup {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Where an entity is in its process
#[derive(Debug, Clone)]
struct EntityProgress {
    arrival_time: SimTime,
    /// Timeout currently running
    active: Option<Event>,
    /// End time of the last completed event
    next_early_start: SimTime,
    departure: Option<SimTime>,
    /// False when the entity left before finishing its steps
    finished: bool,
}

impl EntityProgress {
    fn arriving_at(arrival_time: SimTime) -> Self {
        Self {
            arrival_time,
            active: None,
            next_early_start: arrival_time,
            departure: None,
            finished: false,
        }
    }
}

/// Statistics from a call to [`Orchestrator::run`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Wake-ups processed during this call
    pub wakeups: usize,
    /// Entities that completed all their steps during this call
    pub departures: usize,
    /// Entities that left because a seize was rejected during this call
    pub dropouts: usize,
    /// Simulated time when the call returned
    pub end_time: SimTime,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Event scheduler over a [`SimulationState`]
#[derive(Debug)]
pub struct Orchestrator {
    state: SimulationState,
    clock: Clock,
    agenda: BinaryHeap<Reverse<Wakeup>>,
    next_seq: u64,
    progress: Vec<EntityProgress>,
    /// Entities blocked on each resource, in the order they blocked
    waiters: HashMap<String, VecDeque<EntityId>>,
    config_hash: Option<String>,
    departures: usize,
    dropouts: usize,
}

impl Orchestrator {
    /// Create an orchestrator over existing resources
    ///
    /// Entities already in `state` arrive at time 0 with their pending events.
    pub fn new(state: SimulationState) -> Self {
        let existing: Vec<EntityId> = state.entities().iter().map(|e| e.id()).collect();
        let mut orchestrator = Self {
            state,
            clock: Clock::new(),
            agenda: BinaryHeap::new(),
            next_seq: 0,
            progress: Vec::with_capacity(existing.len()),
            waiters: HashMap::new(),
            config_hash: None,
            departures: 0,
            dropouts: 0,
        };
        for id in existing {
            orchestrator.progress.push(EntityProgress::arriving_at(0.0));
            orchestrator.schedule(0.0, id);
        }
        orchestrator
    }

    /// Build resources, trajectories and entities from a model
    pub fn from_config(config: &ModelConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let resources = config.resources.iter().map(|r| r.build()).collect();
        let mut orchestrator = Self::new(SimulationState::new(resources));
        orchestrator.config_hash = Some(config.config_hash()?);

        let templates: BTreeMap<&str, Vec<Event>> = config
            .trajectories
            .iter()
            .map(|(name, steps)| (name.as_str(), steps.iter().map(|s| s.to_event()).collect()))
            .collect();

        for entity in &config.entities {
            let steps = templates.get(entity.trajectory.as_str()).ok_or_else(|| {
                ConfigError::UnknownTrajectory {
                    entity: entity.name.clone(),
                    trajectory: entity.trajectory.clone(),
                }
            })?;
            orchestrator.spawn(entity.name.clone(), steps, entity.arrival_time)?;
        }

        info!(
            resources = orchestrator.state.num_resources(),
            entities = orchestrator.state.num_entities(),
            "model loaded"
        );
        Ok(orchestrator)
    }

    /// Create an entity running copies of `steps`, arriving at `arrival_time`
    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        steps: &[Event],
        arrival_time: SimTime,
    ) -> Result<EntityId, SimulationError> {
        if arrival_time < self.clock.now() {
            return Err(ClockError::Backwards {
                now: self.clock.now(),
                requested: arrival_time,
            }
            .into());
        }

        let id = self.state.add_entity(name);
        let entity = self
            .state
            .get_entity_mut(id)
            .ok_or(EventError::EntityNotFound(id))?;
        for step in steps {
            entity.push_event(step.instantiate(id));
        }

        self.progress.push(EntityProgress::arriving_at(arrival_time));
        self.schedule(arrival_time, id);
        Ok(id)
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Time of the next wake-up, if any
    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.agenda.peek().map(|Reverse(w)| w.time)
    }

    /// Entities currently waiting on `resource`, in order
    pub fn waiting_on(&self, resource: &str) -> Vec<EntityId> {
        self.waiters
            .get(resource)
            .map(|q| q.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Process a single wake-up
    ///
    /// Returns `Ok(false)` when the agenda is empty.
    pub fn step(&mut self) -> Result<bool, SimulationError> {
        let Some(Reverse(wakeup)) = self.agenda.pop() else {
            return Ok(false);
        };
        self.clock.advance_to(wakeup.time)?;
        self.process(wakeup.entity)?;
        Ok(true)
    }

    /// Process every wake-up scheduled at or before `until`
    pub fn run(&mut self, until: SimTime) -> Result<RunSummary, SimulationError> {
        let departures_before = self.departures;
        let dropouts_before = self.dropouts;
        let mut wakeups = 0;

        info!(from = self.clock.now(), until, "run started");
        while let Some(time) = self.peek_next_time() {
            if time > until {
                break;
            }
            self.step()?;
            wakeups += 1;
        }

        let summary = RunSummary {
            wakeups,
            departures: self.departures - departures_before,
            dropouts: self.dropouts - dropouts_before,
            end_time: self.clock.now(),
        };
        info!(
            wakeups = summary.wakeups,
            departures = summary.departures,
            dropouts = summary.dropouts,
            end_time = summary.end_time,
            "run finished"
        );
        Ok(summary)
    }

    /// One record per entity, in creation order
    pub fn arrivals(&self) -> Vec<ArrivalRecord> {
        self.state
            .entities()
            .iter()
            .zip(&self.progress)
            .map(|(entity, progress)| ArrivalRecord {
                name: entity.name().to_string(),
                start_time: progress.arrival_time,
                end_time: progress.departure,
                finished: progress.finished,
                activity: entity.monitor().samples().to_vec(),
            })
            .collect()
    }

    /// Monitor histories and arrival records so far
    pub fn report(&self) -> SimulationReport {
        let resources = self
            .state
            .resource_names()
            .iter()
            .filter_map(|name| self.state.get_resource(name))
            .map(ResourceReport::from)
            .collect();

        SimulationReport {
            config_hash: self.config_hash.clone(),
            end_time: self.clock.now(),
            resources,
            arrivals: self.arrivals(),
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn schedule(&mut self, time: SimTime, entity: EntityId) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.agenda.push(Reverse(Wakeup { time, seq, entity }));
    }

    fn process(&mut self, id: EntityId) -> Result<(), SimulationError> {
        let now = self.clock.now();
        let idx = id.0;

        if self.progress[idx].departure.is_some() {
            return Ok(());
        }

        if let Some(mut active) = self.progress[idx].active.take() {
            if active.end_time() > now {
                self.progress[idx].active = Some(active);
                return Ok(());
            }
            active.stop(now, &mut self.state)?;
            active.set_processing(false);
            active.set_finished(true);
            self.progress[idx].next_early_start = active.end_time();
        }

        loop {
            let entity = self
                .state
                .get_entity_mut(id)
                .ok_or(EventError::EntityNotFound(id))?;
            let Some(mut event) = entity.get_event() else {
                self.depart(id, now, true);
                return Ok(());
            };

            // A waiting seize keeps the early start time it first queued with
            if !event.enqueued() {
                event.set_early_start_time(self.progress[idx].next_early_start);
            }

            match event.try_to_start(now, &mut self.state)? {
                StartOutcome::Started { at } => {
                    if event.end_time() > at {
                        let end_time = event.end_time();
                        event.set_processing(true);
                        self.progress[idx].active = Some(event);
                        self.schedule(end_time, id);
                        return Ok(());
                    }

                    event.stop(at, &mut self.state)?;
                    event.set_finished(true);
                    self.progress[idx].next_early_start = event.end_time();

                    if let EventKind::Release(release) = event.kind() {
                        self.wake_waiters(release.resource_name(), now);
                    }
                }
                StartOutcome::Blocked(BlockReason::NotYetEligible) => {
                    let early_start = event.early_start_time();
                    self.push_back(id, event)?;
                    self.schedule(early_start, id);
                    return Ok(());
                }
                StartOutcome::Blocked(BlockReason::Enqueued) => {
                    // Once queued the request may take capacity that is already free
                    self.push_back(id, event)?;
                    self.schedule(now, id);
                    return Ok(());
                }
                StartOutcome::Blocked(BlockReason::AwaitingCapacity) => {
                    if let Some(resource) = event.resource_name() {
                        self.waiters
                            .entry(resource.to_string())
                            .or_default()
                            .push_back(id);
                    }
                    self.push_back(id, event)?;
                    return Ok(());
                }
                StartOutcome::Blocked(BlockReason::Rejected) => {
                    self.depart(id, now, false);
                    return Ok(());
                }
            }
        }
    }

    fn push_back(&mut self, id: EntityId, event: Event) -> Result<(), SimulationError> {
        self.state
            .get_entity_mut(id)
            .ok_or(EventError::EntityNotFound(id))?
            .push_front_event(event);
        Ok(())
    }

    fn wake_waiters(&mut self, resource: &str, now: SimTime) {
        let Some(waiting) = self.waiters.remove(resource) else {
            return;
        };
        for entity in waiting {
            self.schedule(now, entity);
        }
    }

    fn depart(&mut self, id: EntityId, now: SimTime, finished: bool) {
        let progress = &mut self.progress[id.0];
        progress.departure = Some(now);
        progress.finished = finished;

        if let Some(entity) = self.state.get_entity_mut(id) {
            let dropped = entity.clear_events();
            debug!(
                entity = entity.name(),
                now,
                finished,
                dropped,
                "entity departed"
            );
        }

        if finished {
            self.departures += 1;
        } else {
            self.dropouts += 1;
        }
    }
}
