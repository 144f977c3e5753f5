//! Domain models for the queueing simulator

pub mod entity;
pub mod monitor;
pub mod resource;
pub mod state;

// Re-exports
pub use entity::{Entity, EntityId};
pub use monitor::{Monitor, MonitorSample};
pub use resource::Resource;
pub use state::SimulationState;
