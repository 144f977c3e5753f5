//! Report - serializable run output
//!
//! Captures monitor histories for every resource and one record per entity.
//! Values are copied straight from the monitors; no statistics are derived.

use crate::core::SimTime;
use crate::models::monitor::MonitorSample;
use crate::models::resource::Resource;
use serde::{Deserialize, Serialize};

// ============================================================================
// Report Structures
// ============================================================================

/// Complete run output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// SHA256 hash of the model (absent for models built in code)
    pub config_hash: Option<String>,

    /// Simulated time when the report was taken
    pub end_time: SimTime,

    /// Resources, sorted by name
    pub resources: Vec<ResourceReport>,

    /// Entities, in creation order
    pub arrivals: Vec<ArrivalRecord>,
}

/// Resource monitor histories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceReport {
    pub name: String,
    pub capacity: f64,
    pub queue_size: i64,
    pub last_release: SimTime,
    pub server: Vec<MonitorSample>,
    pub queue: Vec<MonitorSample>,
}

impl From<&Resource> for ResourceReport {
    fn from(resource: &Resource) -> Self {
        ResourceReport {
            name: resource.name().to_string(),
            capacity: resource.capacity(),
            queue_size: resource.queue_size(),
            last_release: resource.last_release(),
            server: resource.server_monitor().samples().to_vec(),
            queue: resource.queue_monitor().samples().to_vec(),
        }
    }
}

/// One entity's passage through the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalRecord {
    pub name: String,
    pub start_time: SimTime,
    /// None while the entity is still in the system
    pub end_time: Option<SimTime>,
    /// False if the entity left because a seize was rejected
    pub finished: bool,
    /// Own-state monitor samples (1 while in a timeout)
    pub activity: Vec<MonitorSample>,
}

impl SimulationReport {
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
