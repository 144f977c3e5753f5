//! Release: return units of a resource's capacity
//!
//! A release must match an earlier seize. Releasing more than is in service
//! means the model's seize/release pairs are out of balance; that is reported
//! as [`EventError::ReleaseExceedsUsage`] and is never retried.

use super::{BlockReason, EventError, EventProtocol, Lifecycle, StartOutcome};
use crate::core::SimTime;
use crate::models::state::SimulationState;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseEvent {
    resource: String,
    amount: f64,
}

impl ReleaseEvent {
    pub fn new(resource: impl Into<String>, amount: f64) -> Self {
        Self {
            resource: resource.into(),
            amount,
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }
}

impl EventProtocol for ReleaseEvent {
    const TYPE: &'static str = "ReleaseEvent";

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

        let in_service = resource.server_count();
        if in_service - self.amount < 0.0 {
            error!(
                resource = %self.resource,
                entity = entity.name(),
                in_service,
                requested = self.amount,
                "release exceeds units in service"
            );
            return Err(EventError::ReleaseExceedsUsage {
                resource: self.resource.clone(),
                entity: entity.name().to_string(),
                in_service,
                requested: self.amount,
            });
        }

        resource.server_monitor_mut().record_decrement(now, self.amount);
        resource.set_last_release(now);
        lifecycle.set_end_time(now);

        debug!(
            resource = %self.resource,
            entity = entity.name(),
            amount = self.amount,
            now,
            "release"
        );
        Ok(StartOutcome::Started { at: now })
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
