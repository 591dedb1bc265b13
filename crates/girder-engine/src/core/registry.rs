use std::collections::{BTreeMap, HashMap};

use crate::api::types::{EntityId, EntityType};
use crate::components::entity::{Entity, EntityKind, EntityView};
use crate::components::template::{shape_of, EntitySpec};
use crate::core::geometry::Footprint;
use crate::core::physics::{BodyDesc, PhysicsAdapter};

/// Entity storage grouped by type.
///
/// Every insert creates the physics body and every removal destroys it, so an
/// entity is registered exactly when its body is in the adapter.
pub struct EntityRegistry {
    by_type: BTreeMap<EntityType, Vec<Entity>>,
    index: HashMap<EntityId, EntityType>,
    next_id: u32,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::with_next_id(1)
    }

    pub(crate) fn with_next_id(next_id: u32) -> Self {
        Self {
            by_type: BTreeMap::new(),
            index: HashMap::new(),
            next_id,
        }
    }

    /// The id the next inserted entity will receive.
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create an entity and its body from a spec. Returns the new id.
    pub fn insert(&mut self, physics: &mut PhysicsAdapter, spec: EntitySpec) -> EntityId {
        let id = self.allocate_id();
        let desc = spec.body_desc();
        let body = physics.create_body(id, &desc);
        let is_static = desc.mass.is_static();
        self.store(Entity::new(id, spec.kind, spec.shape, spec.footprint, is_static, body));
        id
    }

    /// Recreate an entity with a known id from an explicit body description.
    /// Returns `false` (and creates nothing) when the id is already taken.
    pub(crate) fn insert_with_desc(
        &mut self,
        physics: &mut PhysicsAdapter,
        id: EntityId,
        kind: EntityKind,
        desc: &BodyDesc,
    ) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.next_id = self.next_id.max(id.0 + 1);
        let body = physics.create_body(id, desc);
        let footprint = Footprint::new(desc.position, desc.collider.size(), desc.rotation);
        let entity = Entity::new(
            id,
            kind,
            shape_of(&desc.collider),
            footprint,
            desc.mass.is_static(),
            body,
        );
        self.store(entity);
        true
    }

    fn store(&mut self, entity: Entity) {
        let entity_type = entity.entity_type();
        self.index.insert(entity.id, entity_type);
        self.by_type.entry(entity_type).or_default().push(entity);
    }

    /// Remove an entity and its body. Returns the entity's final view.
    pub fn remove(&mut self, physics: &mut PhysicsAdapter, id: EntityId) -> Option<EntityView> {
        let entity_type = self.index.remove(&id)?;
        let list = self.by_type.get_mut(&entity_type)?;
        let idx = list.iter().position(|e| e.id == id)?;
        let entity = list.swap_remove(idx);
        let view = entity.view();
        physics.remove_body(entity.into_body());
        Some(view)
    }

    /// Remove every entity whose `alive` flag is cleared.
    pub fn remove_dead(&mut self, physics: &mut PhysicsAdapter) -> Vec<EntityView> {
        let dead: Vec<EntityId> = self.iter().filter(|e| !e.alive).map(|e| e.id).collect();
        dead.into_iter()
            .filter_map(|id| self.remove(physics, id))
            .collect()
    }

    /// Get a reference to an entity by ID.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let entity_type = self.index.get(&id)?;
        self.by_type.get(entity_type)?.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let entity_type = self.index.get(&id)?;
        self.by_type.get_mut(entity_type)?.iter_mut().find(|e| e.id == id)
    }

    pub fn type_of(&self, id: EntityId) -> Option<EntityType> {
        self.index.get(&id).copied()
    }

    /// Iterate over all entities of one type.
    pub fn of_type(&self, entity_type: EntityType) -> impl Iterator<Item = &Entity> {
        self.by_type.get(&entity_type).into_iter().flatten()
    }

    /// Iterate over all entities of one type mutably.
    pub fn of_type_mut(&mut self, entity_type: EntityType) -> impl Iterator<Item = &mut Entity> {
        self.by_type.get_mut(&entity_type).into_iter().flatten()
    }

    /// Iterate over all entities, grouped by type.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.by_type.values().flatten()
    }

    /// Iterate over all entities mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.by_type.values_mut().flatten()
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of entities of one type.
    pub fn count(&self, entity_type: EntityType) -> usize {
        self.by_type.get(&entity_type).map_or(0, Vec::len)
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}
