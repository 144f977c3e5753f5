//! Timeout: a pure delay
//!
//! The only event whose end lies in the future relative to its start. The
//! entity's own monitor reads 1 from start until `stop` and 0 afterwards; the
//! scheduler calls `stop` no earlier than `end_time`.

use super::{BlockReason, EventError, EventProtocol, Lifecycle, StartOutcome};
use crate::core::SimTime;
use crate::models::state::SimulationState;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeoutEvent {
    duration: f64,
}

impl TimeoutEvent {
    pub fn new(duration: f64) -> Self {
        Self { duration }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }
}

impl EventProtocol for TimeoutEvent {
    const TYPE: &'static str = "TimeoutEvent";

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
        let entity = state
            .get_entity_mut(entity_id)
            .ok_or(EventError::EntityNotFound(entity_id))?;

        entity.monitor_mut().record(now, 1.0);
        lifecycle.set_end_time(now + self.duration);
        Ok(StartOutcome::Started { at: now })
    }

    fn stop(
        &mut self,
        lifecycle: &mut Lifecycle,
        now: SimTime,
        state: &mut SimulationState,
    ) -> Result<bool, EventError> {
        let entity_id = lifecycle.parent(Self::TYPE)?;
        let entity = state
            .get_entity_mut(entity_id)
            .ok_or(EventError::EntityNotFound(entity_id))?;

        entity.monitor_mut().record(now, 0.0);
        Ok(true)
    }
}
