//! Model configuration
//!
//! A model is described as JSON: resources, named trajectories (flat step
//! lists) and the entities that run them.
//!
//! ```json
//! {
//!   "resources": [{"name": "doctor", "capacity": 1, "queue_size": -1}],
//!   "trajectories": {
//!     "patient": [
//!       {"type": "seize", "resource": "doctor", "amount": 1},
//!       {"type": "timeout", "duration": 5},
//!       {"type": "release", "resource": "doctor", "amount": 1}
//!     ]
//!   },
//!   "entities": [{"name": "p0", "trajectory": "patient", "arrival_time": 0}]
//! }
//! ```

use crate::events::Event;
use crate::models::resource::Resource;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Configuration errors, reported before a run starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid model JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Resource {0} is defined more than once")]
    DuplicateResource(String),

    #[error("Resource {resource} has invalid capacity {capacity}")]
    InvalidCapacity { resource: String, capacity: f64 },

    #[error("Trajectory {trajectory} refers to unknown resource {resource}")]
    UnknownResource { trajectory: String, resource: String },

    #[error("Entity {entity} refers to unknown trajectory {trajectory}")]
    UnknownTrajectory { entity: String, trajectory: String },

    #[error("{context} must be a non-negative number, got {value}")]
    NegativeValue { context: String, value: f64 },
}

fn default_queue_size() -> i64 {
    -1
}

fn default_amount() -> f64 {
    1.0
}

/// A resource definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub name: String,
    pub capacity: f64,
    /// 0 = no queue, negative = unbounded (the default)
    #[serde(default = "default_queue_size")]
    pub queue_size: i64,
}

impl ResourceConfig {
    pub fn build(&self) -> Resource {
        Resource::new(self.name.clone(), self.capacity, self.queue_size)
    }
}

/// One step of a trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepConfig {
    Seize {
        resource: String,
        #[serde(default = "default_amount")]
        amount: f64,
        #[serde(default)]
        description: Option<String>,
    },
    Release {
        resource: String,
        #[serde(default = "default_amount")]
        amount: f64,
        #[serde(default)]
        description: Option<String>,
    },
    Timeout {
        duration: f64,
        #[serde(default)]
        description: Option<String>,
    },
    Skip {
        n: usize,
        #[serde(default)]
        description: Option<String>,
    },
}

impl StepConfig {
    /// Build the unbound event template for this step
    pub fn to_event(&self) -> Event {
        let (event, description) = match self {
            StepConfig::Seize {
                resource,
                amount,
                description,
            } => (Event::seize(resource.clone(), *amount), description),
            StepConfig::Release {
                resource,
                amount,
                description,
            } => (Event::release(resource.clone(), *amount), description),
            StepConfig::Timeout {
                duration,
                description,
            } => (Event::timeout(*duration), description),
            StepConfig::Skip { n, description } => (Event::skip(*n), description),
        };
        match description {
            Some(d) => event.with_description(d.clone()),
            None => event,
        }
    }

    fn resource(&self) -> Option<&str> {
        match self {
            StepConfig::Seize { resource, .. } | StepConfig::Release { resource, .. } => {
                Some(resource.as_str())
            }
            StepConfig::Timeout { .. } | StepConfig::Skip { .. } => None,
        }
    }

    fn quantity(&self) -> Option<(&'static str, f64)> {
        match self {
            StepConfig::Seize { amount, .. } => Some(("seize amount", *amount)),
            StepConfig::Release { amount, .. } => Some(("release amount", *amount)),
            StepConfig::Timeout { duration, .. } => Some(("timeout duration", *duration)),
            StepConfig::Skip { .. } => None,
        }
    }
}

/// An entity to create, running a named trajectory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    pub trajectory: String,
    #[serde(default)]
    pub arrival_time: f64,
}

/// Complete model description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub resources: Vec<ResourceConfig>,
    #[serde(default)]
    pub trajectories: BTreeMap<String, Vec<StepConfig>>,
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

impl ModelConfig {
    /// Parse and validate a JSON model
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ModelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check names, references and value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for resource in &self.resources {
            if !names.insert(resource.name.as_str()) {
                return Err(ConfigError::DuplicateResource(resource.name.clone()));
            }
            if resource.capacity.is_nan() || resource.capacity < 0.0 {
                return Err(ConfigError::InvalidCapacity {
                    resource: resource.name.clone(),
                    capacity: resource.capacity,
                });
            }
        }

        for (trajectory, steps) in &self.trajectories {
            for step in steps {
                if let Some(resource) = step.resource() {
                    if !names.contains(resource) {
                        return Err(ConfigError::UnknownResource {
                            trajectory: trajectory.clone(),
                            resource: resource.to_string(),
                        });
                    }
                }
                if let Some((what, value)) = step.quantity() {
                    check_non_negative(&format!("{} in trajectory {}", what, trajectory), value)?;
                }
            }
        }

        for entity in &self.entities {
            if !self.trajectories.contains_key(&entity.trajectory) {
                return Err(ConfigError::UnknownTrajectory {
                    entity: entity.name.clone(),
                    trajectory: entity.trajectory.clone(),
                });
            }
            check_non_negative(
                &format!("arrival_time of entity {}", entity.name),
                entity.arrival_time,
            )?;
        }

        Ok(())
    }

    /// SHA-256 of the canonical JSON form of this model
    ///
    /// Two runs with the same hash ran the same model.
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(&canonicalize(serde_json::to_value(self)?))?;
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}

fn check_non_negative(context: &str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NegativeValue {
            context: context.to_string(),
            value,
        })
    }
}

/// Sort object keys recursively
fn canonicalize(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
