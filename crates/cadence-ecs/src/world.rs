//! World - entity registry with stable IDs and component queries

use crate::component::{Attached, Component};
use crate::entity::{Entity, EntityInfo};
use bimap::BiMap;
use cadence_core::{CadenceError, ComponentId, EntityId, Fingerprint, Result};

/// The registry of live entities
///
/// Wraps hecs::World with:
/// - Stable EntityId mapping
/// - Optional unique entity names
/// - Queries by component type, id and fingerprint
///
/// Iteration visits entities in ascending `EntityId` order, which is spawn
/// order for ids allocated by [`World::spawn`].
pub struct World {
    /// The underlying hecs world; each hecs entity carries one [`Entity`]
    world: hecs::World,
    /// Bidirectional mapping: EntityId <-> hecs::Entity
    id_map: BiMap<EntityId, hecs::Entity>,
    /// Bidirectional mapping: entity name <-> EntityId
    name_map: BiMap<String, EntityId>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            world: hecs::World::new(),
            id_map: BiMap::new(),
            name_map: BiMap::new(),
        }
    }

    /// Spawn a new empty entity
    pub fn spawn(&mut self) -> EntityId {
        let entity = Entity::new();
        let id = entity.id();
        let handle = self.world.spawn((entity,));
        self.id_map.insert(id, handle);
        id
    }

    /// Spawn a new empty entity with a unique name
    pub fn spawn_named(&mut self, name: impl Into<String>) -> Result<EntityId> {
        let name = name.into();

        if self.name_map.contains_left(&name) {
            return Err(CadenceError::DuplicateEntityName(name));
        }

        let id = self.spawn();
        self.name_map.insert(name, id);
        Ok(id)
    }

    /// Insert an entity built outside the world, keeping its id and components
    pub fn insert(&mut self, entity: Entity) -> Result<EntityId> {
        let id = entity.id();
        if self.id_map.contains_left(&id) {
            return Err(CadenceError::DuplicateEntityId(id.to_string()));
        }

        // Keep the ID counter ahead so later spawns cannot collide
        EntityId::ensure_counter_above(id.raw())?;

        let handle = self.world.spawn((entity,));
        self.id_map.insert(id, handle);
        Ok(id)
    }

    /// Despawn an entity, handing back ownership of it and its components
    pub fn despawn(&mut self, id: EntityId) -> Result<Entity> {
        let handle = *self
            .id_map
            .get_by_left(&id)
            .ok_or_else(|| CadenceError::EntityNotFound(id.to_string()))?;

        let entity = self
            .world
            .remove_one::<Entity>(handle)
            .map_err(|_| CadenceError::EntityNotFound(id.to_string()))?;
        self.world
            .despawn(handle)
            .map_err(|_| CadenceError::EntityNotFound(id.to_string()))?;

        self.id_map.remove_by_left(&id);
        self.name_map.remove_by_right(&id);

        Ok(entity)
    }

    /// Despawn an entity by name
    pub fn despawn_by_name(&mut self, name: &str) -> Result<Entity> {
        let id = self
            .name_map
            .get_by_left(name)
            .copied()
            .ok_or_else(|| CadenceError::EntityNotFound(name.to_string()))?;

        self.despawn(id)
    }

    /// Get entity ID by name
    pub fn get_id(&self, name: &str) -> Option<EntityId> {
        self.name_map.get_by_left(name).copied()
    }

    /// Get entity name by ID
    pub fn get_name(&self, id: EntityId) -> Option<&str> {
        self.name_map.get_by_right(&id).map(String::as_str)
    }

    /// Borrow an entity
    pub fn entity(&self, id: EntityId) -> Option<hecs::Ref<'_, Entity>> {
        let handle = *self.id_map.get_by_left(&id)?;
        self.world.get::<&Entity>(handle).ok()
    }

    /// Mutably borrow an entity
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let handle = *self.id_map.get_by_left(&id)?;
        self.world.query_one_mut::<&mut Entity>(handle).ok()
    }

    /// Attach a component to an entity in this world
    pub fn attach<C: Component>(&mut self, id: EntityId, component: C) -> Result<ComponentId> {
        let entity = self
            .entity_mut(id)
            .ok_or_else(|| CadenceError::EntityNotFound(id.to_string()))?;
        Ok(entity.attach(component))
    }

    /// Detach a component from whichever entity holds it
    pub fn detach(&mut self, component: ComponentId) -> Option<Attached> {
        let owner = self.find_component(component)?;
        self.entity_mut(owner)?.remove(component)
    }

    /// Ids of all entities holding at least one component of type `T`
    pub fn entities_with<T: Component>(&self) -> Vec<EntityId> {
        self.collect_ids(|entity| entity.has::<T>())
    }

    /// Ids of all entities holding a component whose current state matches `fingerprint`
    pub fn find_entities_with(&self, fingerprint: &Fingerprint) -> Vec<EntityId> {
        self.collect_ids(|entity| entity.get_by_fingerprint(fingerprint).is_some())
    }

    /// The entity that holds the given component
    pub fn find_component(&self, component: ComponentId) -> Option<EntityId> {
        self.collect_ids(|entity| entity.get(component).is_some())
            .into_iter()
            .next()
    }

    /// Visit every component of type `T` together with its owner
    pub fn for_each<T: Component>(&self, mut f: impl FnMut(EntityId, &T)) {
        let mut query = self.world.query::<&Entity>();
        let mut entities: Vec<&Entity> = query.iter().map(|(_, e)| e).collect();
        entities.sort_by_key(|e| e.id());

        for entity in entities {
            for component in entity.get_all_by_type::<T>() {
                f(entity.id(), component);
            }
        }
    }

    /// Visit every component of type `T` mutably together with its owner
    pub fn for_each_mut<T: Component>(&mut self, mut f: impl FnMut(EntityId, &mut T)) {
        for entity in self.sorted_entities_mut() {
            let id = entity.id();
            for component in entity.get_all_by_type_mut::<T>() {
                f(id, component);
            }
        }
    }

    /// Advance every entity's components by one fixed step
    pub fn update(&mut self, delta_ms: f64) {
        for entity in self.sorted_entities_mut() {
            entity.update(delta_ms);
        }
    }

    /// Get info about all entities
    pub fn all_entities(&self) -> Vec<EntityInfo> {
        let mut query = self.world.query::<&Entity>();
        let mut infos: Vec<EntityInfo> = query
            .iter()
            .map(|(_, entity)| {
                let components = entity
                    .component_names()
                    .into_iter()
                    .map(String::from)
                    .collect();
                let info = EntityInfo::new(entity.id()).with_components(components);
                match self.get_name(entity.id()) {
                    Some(name) => info.with_name(name),
                    None => info,
                }
            })
            .collect();
        infos.sort_by_key(|info| info.id);
        infos
    }

    /// Get number of entities
    pub fn entity_count(&self) -> usize {
        self.id_map.len()
    }

    /// Total number of attached components across all entities
    pub fn component_count(&self) -> usize {
        let mut query = self.world.query::<&Entity>();
        query.iter().map(|(_, e)| e.len()).sum()
    }

    /// Check if an entity exists
    pub fn contains(&self, id: EntityId) -> bool {
        self.id_map.contains_left(&id)
    }

    /// Check if an entity with name exists
    pub fn contains_name(&self, name: &str) -> bool {
        self.name_map.contains_left(name)
    }

    /// Clear the world
    pub fn clear(&mut self) {
        self.world.clear();
        self.id_map.clear();
        self.name_map.clear();
    }

    fn collect_ids(&self, mut predicate: impl FnMut(&Entity) -> bool) -> Vec<EntityId> {
        let mut query = self.world.query::<&Entity>();
        let mut ids: Vec<EntityId> = query
            .iter()
            .filter(|(_, e)| predicate(*e))
            .map(|(_, e)| e.id())
            .collect();
        ids.sort();
        ids
    }

    /// Collects and sorts on every call, so each world update is O(n log n)
    /// in the entity count on top of the component work.
    fn sorted_entities_mut(&mut self) -> Vec<&mut Entity> {
        let mut entities: Vec<&mut Entity> = self
            .world
            .query_mut::<&mut Entity>()
            .into_iter()
            .map(|(_, e)| e)
            .collect();
        entities.sort_by_key(|e| e.id());
        entities
    }
}
