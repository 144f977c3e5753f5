//! Orchestrator - drives the event protocol in simulated time
//!
//! See `engine.rs` for the scheduling loop.

pub mod config;
pub mod engine;
pub mod report;

// Re-export main types for convenience
pub use config::{ConfigError, EntityConfig, ModelConfig, ResourceConfig, StepConfig};
pub use engine::{Orchestrator, RunSummary, SimulationError};
pub use report::{ArrivalRecord, ResourceReport, SimulationReport};
