//! Skip: discard upcoming steps
//!
//! Starting a skip drops the next `n` events from its entity's pending queue.
//! The queue hands over ownership of each discarded event, which is dropped
//! here. Skip always starts and never blocks.

use super::{EventError, EventProtocol, Lifecycle, StartOutcome};
use crate::core::SimTime;
use crate::models::state::SimulationState;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct SkipEvent {
    n_events: usize,
}

impl SkipEvent {
    pub fn new(n_events: usize) -> Self {
        Self { n_events }
    }

    pub fn n_events(&self) -> usize {
        self.n_events
    }
}

impl EventProtocol for SkipEvent {
    const TYPE: &'static str = "SkipEvent";

    fn try_to_start(
        &mut self,
        lifecycle: &mut Lifecycle,
        now: SimTime,
        state: &mut SimulationState,
    ) -> Result<StartOutcome, EventError> {
        let entity_id = lifecycle.parent(Self::TYPE)?;
        let entity = state
            .get_entity_mut(entity_id)
            .ok_or(EventError::EntityNotFound(entity_id))?;

        for discarded in 0..self.n_events {
            if entity.get_event().is_none() {
                warn!(
                    entity = entity.name(),
                    requested = self.n_events,
                    discarded,
                    "skip ran past the end of the pending queue"
                );
                break;
            }
        }

        lifecycle.set_end_time(now);
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
