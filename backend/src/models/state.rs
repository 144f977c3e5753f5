//! Simulation State
//!
//! Holds the shared mutable state the event protocol operates on:
//! the resource registry and the entity table.
//!
//! # Critical Invariants
//!
//! 1. **Name Stability**: A resource keeps its name for the whole run; events
//!    look resources up by name on every attempt
//! 2. **Handle Validity**: `EntityId(i)` always refers to `entities[i]`
//! 3. **Capacity**: No resource's server monitor ever exceeds its capacity

use crate::events::EventError;
use crate::models::entity::{Entity, EntityId};
use crate::models::resource::Resource;
use std::collections::HashMap;

/// Resource registry plus entity table
///
/// # Example
///
/// ```rust
/// use queueing_simulator_core_rs::{Resource, SimulationState};
///
/// let mut state = SimulationState::new(vec![
///     Resource::new("doctor", 1.0, -1),
///     Resource::new("nurse", 2.0, 0),
/// ]);
/// let patient = state.add_entity("patient0");
///
/// assert_eq!(state.num_resources(), 2);
/// assert_eq!(state.get_entity(patient).unwrap().name(), "patient0");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulationState {
    /// All resources, indexed by name
    resources: HashMap<String, Resource>,

    /// All entities, indexed by `EntityId`
    entities: Vec<Entity>,
}

impl SimulationState {
    /// Create a state with the given resources and no entities
    ///
    /// # Panics
    ///
    /// Panics if two resources share a name
    pub fn new(resources: Vec<Resource>) -> Self {
        let mut state = Self::default();
        for resource in resources {
            state.add_resource(resource);
        }
        state
    }

    /// Register a resource
    ///
    /// # Panics
    ///
    /// Panics if the name is already registered
    pub fn add_resource(&mut self, resource: Resource) {
        let name = resource.name().to_string();
        assert!(
            !self.resources.contains_key(&name),
            "Resource {} already exists",
            name
        );
        self.resources.insert(name, resource);
    }

    /// Create a new entity and return its handle
    pub fn add_entity(&mut self, name: impl Into<String>) -> EntityId {
        let id = EntityId(self.entities.len());
        self.entities.push(Entity::new(id, name));
        id
    }

    pub fn get_resource(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    pub fn get_resource_mut(&mut self, name: &str) -> Option<&mut Resource> {
        self.resources.get_mut(name)
    }

    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.0)
    }

    /// Borrow a resource and an entity mutably at the same time
    ///
    /// Seize needs both: the resource's monitors and the entity's `leave` flag.
    pub fn resource_and_entity_mut(
        &mut self,
        resource: &str,
        entity: EntityId,
    ) -> Result<(&mut Resource, &mut Entity), EventError> {
        let res = self
            .resources
            .get_mut(resource)
            .ok_or_else(|| EventError::ResourceNotFound(resource.to_string()))?;
        let ent = self
            .entities
            .get_mut(entity.0)
            .ok_or(EventError::EntityNotFound(entity))?;
        Ok((res, ent))
    }

    pub fn resources(&self) -> &HashMap<String, Resource> {
        &self.resources
    }

    /// Resource names in sorted order (stable across runs)
    pub fn resource_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.resources.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn num_resources(&self) -> usize {
        self.resources.len()
    }

    pub fn num_entities(&self) -> usize {
        self.entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "Resource doctor already exists")]
    fn test_duplicate_resource_panics() {
        SimulationState::new(vec![
            Resource::new("doctor", 1.0, 0),
            Resource::new("doctor", 2.0, 0),
        ]);
    }

    #[test]
    fn test_entity_ids_are_sequential() {
        let mut state = SimulationState::default();
        assert_eq!(state.add_entity("a"), EntityId(0));
        assert_eq!(state.add_entity("b"), EntityId(1));
        assert_eq!(state.num_entities(), 2);
    }

    #[test]
    fn test_split_borrow_reports_missing_resource() {
        let mut state = SimulationState::default();
        let id = state.add_entity("a");
        let err = state.resource_and_entity_mut("ghost", id).unwrap_err();
        assert_eq!(err, EventError::ResourceNotFound("ghost".to_string()));
    }
}
