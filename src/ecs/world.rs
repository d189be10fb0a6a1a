//! World wrapper around hecs

use hecs::Entity;

use crate::ecs::components::Enabled;
use crate::ecs::hierarchy::Parent;

/// Game world containing all entities and components
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn an entity with the given components
    pub fn spawn(&mut self, components: impl hecs::DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Despawn an entity
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Get a reference to a component
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Get a mutable reference to a component
    pub fn get_mut<T: hecs::Component>(
        &mut self,
        entity: Entity,
    ) -> Result<hecs::RefMut<'_, T>, hecs::ComponentError> {
        self.inner.get::<&mut T>(entity)
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Get the number of entities
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if the world is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Clear all entities from the world
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Query for entities with specific components
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query::<Q>()
    }

    /// Query for entities with specific components (mutable)
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<'_, Q> {
        self.inner.query_mut::<Q>()
    }

    /// Get an entity's own enabled flag.
    ///
    /// A missing [`Enabled`] component counts as enabled; a despawned
    /// entity counts as disabled.
    pub fn entity_enabled(&self, entity: Entity) -> bool {
        if !self.inner.contains(entity) {
            return false;
        }
        match self.inner.get::<&Enabled>(entity) {
            Ok(enabled) => enabled.0,
            Err(_) => true,
        }
    }

    /// Set an entity's own enabled flag, inserting the component if needed.
    pub fn set_entity_enabled(&mut self, entity: Entity, value: bool) {
        if let Ok(mut enabled) = self.inner.get::<&mut Enabled>(entity) {
            enabled.0 = value;
            return;
        }
        // Insert fails only for a despawned entity, which we ignore.
        let _ = self.inner.insert_one(entity, Enabled(value));
    }

    /// Compute an entity's *effective* enabled state: the entity and every
    /// ancestor in the [`Parent`] chain must be enabled.
    pub fn entity_effective_enabled(&self, entity: Entity) -> bool {
        let mut current = entity;
        let mut hops = 0u32;
        loop {
            if !self.entity_enabled(current) {
                return false;
            }
            match self.inner.get::<&Parent>(current) {
                Ok(parent) => current = parent.entity(),
                Err(_) => return true,
            }
            // Guard against a malformed parent cycle.
            hops += 1;
            if hops > 10_000 {
                log::warn!("parent chain cycle detected at entity {:?}", entity);
                return false;
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
