//! Entity hierarchy components
//!
//! Provides parent-child relationships between entities. The scripting
//! runtime consumes the hierarchy purely through enabled-state queries;
//! transform propagation is left to the render backend.

use hecs::Entity;
use smallvec::SmallVec;

/// Parent component - indicates this entity has a parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Entity);

impl Parent {
    /// Create a new parent reference
    #[must_use]
    pub const fn new(entity: Entity) -> Self {
        Self(entity)
    }

    /// Get the parent entity
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.0
    }
}

/// Children component - tracks all children of this entity
#[derive(Debug, Clone, Default)]
pub struct Children(pub SmallVec<[Entity; 8]>);

impl Children {
    /// Create an empty children list
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Add a child
    pub fn add(&mut self, child: Entity) {
        if !self.0.contains(&child) {
            self.0.push(child);
        }
    }

    /// Remove a child
    pub fn remove(&mut self, child: Entity) -> bool {
        if let Some(pos) = self.0.iter().position(|&e| e == child) {
            self.0.remove(pos);
            true
        } else {
            false
        }
    }

    /// Check if this entity has children
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of children
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over children
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.0.iter()
    }
}
