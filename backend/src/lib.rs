//! Queueing Simulator Core - Rust Engine
//!
//! Event state machines for a discrete-event simulation of queueing networks.
//!
//! # Architecture
//!
//! - **core**: Simulated time
//! - **models**: Monitor, Resource, Entity, SimulationState
//! - **events**: The event protocol and its four kinds (skip, seize, release, timeout)
//! - **orchestrator**: Scheduler loop, JSON model config, run reports
//!
//! # Critical Invariants
//!
//! 1. A resource's server level never exceeds its capacity
//! 2. Monitors are the only record of occupancy and queue length
//! 3. "Cannot start yet" is a return value, never an error
//! 4. Simulated time never moves backwards

// Module declarations
pub mod core;
pub mod events;
pub mod models;
pub mod orchestrator;

// Re-exports for convenience
pub use crate::core::time::{Clock, ClockError, SimTime};
pub use events::{
    BlockReason, Event, EventError, EventKind, EventProtocol, Lifecycle, ReleaseEvent,
    SeizeEvent, SeizeStatus, SkipEvent, StartOutcome, TimeoutEvent,
};
pub use models::{
    entity::{Entity, EntityId},
    monitor::{Monitor, MonitorSample},
    resource::Resource,
    state::SimulationState,
};
pub use orchestrator::{
    ArrivalRecord, ConfigError, ModelConfig, Orchestrator, ResourceReport, RunSummary,
    SimulationError, SimulationReport,
};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn queueing_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::simulator::PySimulator>()?;
    Ok(())
}
