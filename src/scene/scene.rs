//! Scene serialization and deserialization
//!
//! Supports saving and loading scenes in RON (Rusty Object Notation) and JSON
//! formats, and instantiating a loaded scene into a [`World`], including each
//! entity's attached scripts.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ecs::{Children, Enabled, Name, Parent, Transform, World};
use crate::script::{ScriptContainer, ScriptRegistry, ScriptValue};

fn default_true() -> bool {
    true
}

/// A script attached to a serialized entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedScript {
    /// Registered script type name
    pub name: String,
    /// Whether the script starts enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Initial attribute values
    #[serde(default)]
    pub attributes: HashMap<String, ScriptValue>,
}

impl SerializedScript {
    /// Create a serialized script with default state
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            attributes: HashMap::new(),
        }
    }
}

/// A serializable entity with its components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedEntity {
    /// Optional entity name
    pub name: Option<String>,
    /// Whether the entity starts enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Transform component
    pub transform: Option<Transform>,
    /// Parent entity index (if any)
    pub parent_index: Option<usize>,
    /// Child entity indices
    pub children_indices: Vec<usize>,
    /// Scripts to attach, in execution order
    #[serde(default)]
    pub scripts: Vec<SerializedScript>,
}

impl Default for SerializedEntity {
    fn default() -> Self {
        Self {
            name: None,
            enabled: true,
            transform: Some(Transform::default()),
            parent_index: None,
            children_indices: Vec::new(),
            scripts: Vec::new(),
        }
    }
}

/// A serializable scene containing multiple entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Scene name
    pub name: String,
    /// Scene version for compatibility
    pub version: u32,
    /// All entities in the scene
    pub entities: Vec<SerializedEntity>,
}

impl Scene {
    /// Create a new empty scene
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: 1,
            entities: Vec::new(),
        }
    }

    /// Add an entity to the scene
    pub fn add_entity(&mut self, entity: SerializedEntity) -> usize {
        let index = self.entities.len();
        self.entities.push(entity);
        index
    }

    /// Save the scene to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| SceneError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a scene from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::IoError(e.to_string()))?;
        let scene: Scene =
            ron::from_str(&content).map_err(|e| SceneError::DeserializeError(e.to_string()))?;
        Ok(scene)
    }

    /// Save the scene to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| SceneError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| SceneError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a scene from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::IoError(e.to_string()))?;
        let scene: Scene = serde_json::from_str(&content)
            .map_err(|e| SceneError::DeserializeError(e.to_string()))?;
        Ok(scene)
    }

    /// Spawn every entity in the scene into the world.
    ///
    /// Entities are spawned in declaration order, then linked into parent/child
    /// hierarchies by index. Scripts are attached disabled or enabled as
    /// declared; their lifecycle callbacks fire on the next script tick, so a
    /// whole loaded scene initializes as one batch.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::UnknownScript`] if an entity references a script
    /// type that is not registered.
    pub fn instantiate(
        &self,
        world: &mut World,
        registry: &ScriptRegistry,
    ) -> Result<Vec<hecs::Entity>, SceneError> {
        // First pass: spawn all entities so indices can be resolved
        let mut spawned = Vec::with_capacity(self.entities.len());
        for serialized in &self.entities {
            let entity = world.spawn(());
            if let Some(name) = &serialized.name {
                let _ = world.inner.insert_one(entity, Name::new(name.clone()));
            }
            if let Some(transform) = &serialized.transform {
                let _ = world.inner.insert_one(entity, transform.clone());
            }
            let _ = world.inner.insert_one(entity, Enabled(serialized.enabled));
            spawned.push(entity);
        }

        // Second pass: hierarchy links and script containers
        for (index, serialized) in self.entities.iter().enumerate() {
            let entity = spawned[index];

            if let Some(parent_index) = serialized.parent_index {
                if let Some(&parent) = spawned.get(parent_index) {
                    let _ = world.inner.insert_one(entity, Parent(parent));
                }
            }
            if !serialized.children_indices.is_empty() {
                let mut children = Children::new();
                for &child_index in &serialized.children_indices {
                    if let Some(&child) = spawned.get(child_index) {
                        children.add(child);
                    }
                }
                let _ = world.inner.insert_one(entity, children);
            }

            if !serialized.scripts.is_empty() {
                let mut container = ScriptContainer::new();
                for script in &serialized.scripts {
                    let mut instance = registry
                        .instantiate(&script.name)
                        .map_err(|_| SceneError::UnknownScript(script.name.clone()))?;
                    instance.set_raw_enabled(script.enabled);
                    for (key, value) in &script.attributes {
                        instance.set_attr(key, value.clone());
                    }
                    container.attach(instance);
                }
                let _ = world.inner.insert_one(entity, container);
            }
        }

        Ok(spawned)
    }

    /// Get the number of entities
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Check if the scene is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Errors that can occur during scene operations
#[derive(Debug, Clone)]
pub enum SceneError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// A serialized script names a type missing from the registry
    UnknownScript(String),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::UnknownScript(name) => write!(f, "Unknown script type: {name}"),
        }
    }
}

impl std::error::Error for SceneError {}
