//! Seize: acquire units of a resource's capacity
//!
//! # Admission
//!
//! A request is served when the resource has room for it
//! (`capacity >= in_service + amount`) and either:
//! - it was already waiting in the queue, or
//! - the queue is empty.
//!
//! An arriving request never overtakes a non-empty queue, even when capacity
//! is free. A request that waited is served as soon as it fits, whatever
//! arrived after it.
//!
//! # Queueing
//!
//! A request that cannot be served joins the queue when the resource allows
//! one and it has room (see [`Resource::queue_has_room`]). Otherwise the
//! entity's `leave` flag is raised and the request is not queued.
//!
//! # Service time correction
//!
//! A waiting request served after a release is started at the release time
//! when its early start time is not after it, so no service time is credited
//! before the resource actually became free.
//!
//! All effects are recorded on the resource's monitors; the resource holds no
//! separate counters.
//!
//! [`Resource::queue_has_room`]: crate::models::resource::Resource::queue_has_room

use super::{BlockReason, EventError, EventProtocol, Lifecycle, StartOutcome};
use crate::core::SimTime;
use crate::models::state::SimulationState;
use tracing::debug;

/// Progress of a seize request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeizeStatus {
    /// Never attempted, or attempted while not yet eligible
    Fresh,
    /// Waiting, counted in the resource's queue monitor
    Enqueued,
    /// Counted in the resource's server monitor
    Served,
    /// No room to wait; the entity was told to leave
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeizeEvent {
    resource: String,
    amount: f64,
    status: SeizeStatus,
}

impl SeizeEvent {
    pub fn new(resource: impl Into<String>, amount: f64) -> Self {
        Self {
            resource: resource.into(),
            amount,
            status: SeizeStatus::Fresh,
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn status(&self) -> SeizeStatus {
        self.status
    }

    fn is_enqueued(&self) -> bool {
        self.status == SeizeStatus::Enqueued
    }
}

impl EventProtocol for SeizeEvent {
    const TYPE: &'static str = "SeizeEvent";

    fn try_to_start(
        &mut self,
        lifecycle: &mut Lifecycle,
        now: SimTime,
        state: &mut SimulationState,
    ) -> Result<StartOutcome, EventError> {
        if lifecycle.not_yet_eligible(now) {
            return Ok(StartOutcome::Blocked(BlockReason::NotYetEligible));
        }

        let entity_id = lifecycle.parent(Self::TYPE)?;
        let (resource, entity) = state.resource_and_entity_mut(&self.resource, entity_id)?;

        let server_usage = resource.server_count();
        // Queue levels are whole waiting units
        let queue_usage = resource.queue_count().trunc();

        let admissible = self.is_enqueued() || queue_usage == 0.0;
        if resource.can_serve(server_usage, self.amount) && admissible {
            let mut at = now;
            if self.is_enqueued() {
                if lifecycle.early_start_time() <= resource.last_release() {
                    at = resource.last_release();
                }
                resource.queue_monitor_mut().record_decrement(at, self.amount);
            }
            resource.server_monitor_mut().record_increment(at, self.amount);
            lifecycle.set_end_time(at);
            self.status = SeizeStatus::Served;

            debug!(
                resource = %self.resource,
                entity = entity.name(),
                amount = self.amount,
                at,
                "seize served"
            );
            return Ok(StartOutcome::Started { at });
        }

        if self.is_enqueued() {
            return Ok(StartOutcome::Blocked(BlockReason::AwaitingCapacity));
        }

        if resource.queue_has_room(queue_usage) {
            resource.queue_monitor_mut().record_increment(now, self.amount);
            self.status = SeizeStatus::Enqueued;
            debug!(
                resource = %self.resource,
                entity = entity.name(),
                amount = self.amount,
                now,
                "seize enqueued"
            );
            Ok(StartOutcome::Blocked(BlockReason::Enqueued))
        } else {
            entity.set_leave(true);
            self.status = SeizeStatus::Left;
            debug!(
                resource = %self.resource,
                entity = entity.name(),
                queue_size = resource.queue_size(),
                now,
                "seize rejected, entity leaves"
            );
            Ok(StartOutcome::Blocked(BlockReason::Rejected))
        }
    }

    fn stop(
        &mut self,
        _lifecycle: &mut Lifecycle,
        _now: SimTime,
        _state: &mut SimulationState,
    ) -> Result<bool, EventError> {
        Ok(true)
    }
}
