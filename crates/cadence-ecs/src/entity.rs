//! Entities and their ordered component lists

use crate::component::{Attached, Component};
use cadence_core::{ComponentId, EntityId, Fingerprint};
use serde::{Deserialize, Serialize};

/// An identity owning an ordered collection of components.
///
/// Components keep their attachment order. Removal compacts the list, so
/// queries never observe a gap where a component used to be.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    components: Vec<Attached>,
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity {
    /// Create an empty entity with a fresh id
    pub fn new() -> Self {
        Self::with_id(EntityId::new())
    }

    /// Create an empty entity with a specific id
    pub fn with_id(id: EntityId) -> Self {
        Self {
            id,
            components: Vec::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Attach a component, recording this entity as its owner.
    ///
    /// There is no duplicate check: attaching two equal values yields two
    /// entries that share a fingerprint but have distinct ids.
    pub fn attach<C: Component>(&mut self, component: C) -> ComponentId {
        self.reattach(Attached::new(component))
    }

    /// Attach a component previously detached from this or another entity.
    /// Its `ComponentId` is preserved.
    pub fn reattach(&mut self, mut component: Attached) -> ComponentId {
        let id = component.id();
        component.attach_to(self.id);
        self.components.push(component);
        id
    }

    /// Get a component by id
    pub fn get(&self, id: ComponentId) -> Option<&Attached> {
        self.components.iter().find(|c| c.id() == id)
    }

    /// Get a mutable component by id
    pub fn get_mut(&mut self, id: ComponentId) -> Option<&mut Attached> {
        self.components.iter_mut().find(|c| c.id() == id)
    }

    /// Get a component by id as its concrete type
    pub fn get_as<T: Component>(&self, id: ComponentId) -> Option<&T> {
        self.get(id).and_then(|c| c.downcast_ref::<T>())
    }

    pub fn get_as_mut<T: Component>(&mut self, id: ComponentId) -> Option<&mut T> {
        self.get_mut(id).and_then(|c| c.downcast_mut::<T>())
    }

    /// First component whose current state matches the fingerprint
    pub fn get_by_fingerprint(&self, fingerprint: &Fingerprint) -> Option<&Attached> {
        self.components.iter().find(|c| c.matches(fingerprint))
    }

    /// All components whose current state matches the fingerprint, in attachment order
    pub fn get_all_by_fingerprint(&self, fingerprint: &Fingerprint) -> Vec<&Attached> {
        self.components
            .iter()
            .filter(|c| c.matches(fingerprint))
            .collect()
    }

    /// All components of concrete type `T`, in attachment order
    pub fn get_all_by_type<T: Component>(&self) -> Vec<&T> {
        self.components
            .iter()
            .filter_map(|c| c.downcast_ref::<T>())
            .collect()
    }

    pub fn get_all_by_type_mut<T: Component>(&mut self) -> Vec<&mut T> {
        self.components
            .iter_mut()
            .filter_map(|c| c.downcast_mut::<T>())
            .collect()
    }

    /// Check if any attached component has type `T`
    pub fn has<T: Component>(&self) -> bool {
        self.components.iter().any(|c| c.is::<T>())
    }

    /// Remove a component by id, returning it detached.
    /// Removing an id that is not attached does nothing.
    pub fn remove(&mut self, id: ComponentId) -> Option<Attached> {
        let idx = self.components.iter().position(|c| c.id() == id)?;
        Some(self.take(idx))
    }

    /// Remove the first component whose current state matches the fingerprint
    pub fn remove_by_fingerprint(&mut self, fingerprint: &Fingerprint) -> Option<Attached> {
        let idx = self.components.iter().position(|c| c.matches(fingerprint))?;
        Some(self.take(idx))
    }

    /// Detach every component, leaving the entity empty
    pub fn detach_all(&mut self) -> Vec<Attached> {
        let mut detached: Vec<Attached> = self.components.drain(..).collect();
        for c in &mut detached {
            c.detach();
        }
        detached
    }

    fn take(&mut self, idx: usize) -> Attached {
        let mut component = self.components.remove(idx);
        component.detach();
        component
    }

    /// Advance every component by one step, in attachment order
    pub fn update(&mut self, delta_ms: f64) {
        for component in &mut self.components {
            component.update(delta_ms);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attached> {
        self.components.iter()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Short type names of attached components, in attachment order
    pub fn component_names(&self) -> Vec<&'static str> {
        self.components.iter().map(|c| c.short_type_name()).collect()
    }
}

/// Information about an entity for listings and serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityInfo {
    /// The stable entity ID
    pub id: EntityId,
    /// Human-readable name, if the entity was spawned with one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Component type names in attachment order
    pub components: Vec<String>,
}

impl EntityInfo {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            name: None,
            components: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_components(mut self, components: Vec<String>) -> Self {
        self.components = components;
        self
    }
}
