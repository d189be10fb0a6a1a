//! Script type registry
//!
//! Behaviour types are registered once, up front, producing a stable
//! [`ScriptTypeId`], a display name and a callback capability table.
//! Registering the same name again replaces the descriptor and bumps its
//! revision; containers pick the new definition up through
//! [`crate::script::ScriptContainer::apply_swaps`] (hot-reload).

use rustc_hash::FxHashMap;

use crate::script::behaviour::{CallbackSet, Script};
use crate::script::instance::ScriptInstance;
use crate::script::ScriptError;

/// Stable identifier of a registered script type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptTypeId(u32);

impl ScriptTypeId {
    #[must_use]
    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw index value, for diagnostics
    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

/// Registered metadata for one script type
#[derive(Debug, Clone)]
pub struct ScriptDescriptor {
    /// Stable id, assigned at first registration
    pub id: ScriptTypeId,
    /// Display name (registry key)
    pub name: String,
    /// Callbacks the type implements
    pub callbacks: CallbackSet,
    /// Bumped every time the name is re-registered
    pub revision: u32,
}

type Factory = Box<dyn Fn() -> Box<dyn Script> + Send + Sync>;

struct Entry {
    descriptor: ScriptDescriptor,
    factory: Factory,
}

/// Registry of every script type known to the engine
#[derive(Default)]
pub struct ScriptRegistry {
    by_name: FxHashMap<String, ScriptTypeId>,
    entries: Vec<Entry>,
}

impl ScriptRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a script type under an explicit name.
    ///
    /// A duplicate name replaces the previous definition in place: the id
    /// is kept, the revision is bumped, and existing instances become
    /// eligible for hot-swap.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        callbacks: CallbackSet,
        factory: F,
    ) -> ScriptTypeId
    where
        F: Fn() -> Box<dyn Script> + Send + Sync + 'static,
    {
        let name = name.into();
        if let Some(&id) = self.by_name.get(&name) {
            let entry = &mut self.entries[id.0 as usize];
            entry.descriptor.callbacks = callbacks;
            entry.descriptor.revision += 1;
            entry.factory = Box::new(factory);
            log::info!(
                "script type '{}' re-registered (revision {})",
                name,
                entry.descriptor.revision
            );
            return id;
        }

        let id = ScriptTypeId(self.entries.len() as u32);
        log::debug!("script type '{}' registered as {:?}", name, id);
        self.by_name.insert(name.clone(), id);
        self.entries.push(Entry {
            descriptor: ScriptDescriptor {
                id,
                name,
                callbacks,
                revision: 0,
            },
            factory: Box::new(factory),
        });
        id
    }

    /// Register with a name derived from the concrete type
    pub fn register_default<T>(&mut self, callbacks: CallbackSet) -> ScriptTypeId
    where
        T: Script + Default,
    {
        self.register(derived_name::<T>(), callbacks, || {
            Box::new(T::default()) as Box<dyn Script>
        })
    }

    /// Look up a type id by name
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<ScriptTypeId> {
        self.by_name.get(name).copied()
    }

    /// Descriptor for a registered type
    #[must_use]
    pub fn descriptor(&self, id: ScriptTypeId) -> Option<&ScriptDescriptor> {
        self.entries.get(id.0 as usize).map(|e| &e.descriptor)
    }

    /// Build a fresh behaviour box for a registered type
    pub(crate) fn new_behaviour(&self, id: ScriptTypeId) -> Option<Box<dyn Script>> {
        self.entries.get(id.0 as usize).map(|e| (e.factory)())
    }

    /// Instantiate a script by type name.
    ///
    /// # Errors
    ///
    /// Returns [`ScriptError::UnknownType`] when the name was never
    /// registered.
    pub fn instantiate(&self, name: &str) -> Result<ScriptInstance, ScriptError> {
        let id = self
            .lookup(name)
            .ok_or_else(|| ScriptError::UnknownType(name.to_string()))?;
        self.instantiate_id(id)
    }

    /// Instantiate a script by type id
    pub fn instantiate_id(&self, id: ScriptTypeId) -> Result<ScriptInstance, ScriptError> {
        let entry = self
            .entries
            .get(id.0 as usize)
            .ok_or_else(|| ScriptError::UnknownType(format!("{id:?}")))?;
        Ok(ScriptInstance::new(
            id,
            entry.descriptor.name.clone(),
            entry.descriptor.revision,
            entry.descriptor.callbacks,
            (entry.factory)(),
        ))
    }

    /// Number of registered types
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptRegistry")
            .field("types", &self.entries.len())
            .finish()
    }
}

/// Derive a display name from a concrete type.
///
/// Used when no explicit name is supplied at registration; diagnostics
/// only, never a behavioral key unless registered under it.
#[must_use]
pub fn derived_name<T: ?Sized>() -> &'static str {
    short_type_name(std::any::type_name::<T>())
}

/// Trim a raw type path down to a display name.
///
/// Strips generic arguments and the module path, keeping the final
/// segment. Returns the `"undefined"` sentinel when the input yields no
/// usable name.
#[must_use]
pub fn short_type_name(raw: &str) -> &str {
    let base = raw.split('<').next().unwrap_or("");
    let name = base.rsplit("::").next().unwrap_or("").trim();
    if name.is_empty() { "undefined" } else { name }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Mover {
        speed: f32,
    }
    impl Script for Mover {}

    #[derive(Default)]
    struct Chaser;
    impl Script for Chaser {}

    #[test]
    fn test_register_and_instantiate() {
        let mut registry = ScriptRegistry::new();
        let id = registry.register("mover", CallbackSet::NONE.with_update(), || {
            Box::new(Mover { speed: 4.0 })
        });

        assert_eq!(registry.lookup("mover"), Some(id));
        let instance = registry.instantiate("mover").unwrap();
        assert_eq!(instance.type_name(), "mover");
        assert_eq!(instance.type_id(), id);
        assert!(instance.callbacks().update);
        assert_eq!(instance.behaviour_as::<Mover>().unwrap().speed, 4.0);
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let registry = ScriptRegistry::new();
        let err = registry.instantiate("ghost").unwrap_err();
        assert!(matches!(err, ScriptError::UnknownType(name) if name == "ghost"));
    }

    #[test]
    fn test_reregistration_keeps_id_bumps_revision() {
        let mut registry = ScriptRegistry::new();
        let first = registry.register("mover", CallbackSet::NONE, || Box::new(Mover::default()));
        assert_eq!(registry.descriptor(first).unwrap().revision, 0);

        let second = registry.register("mover", CallbackSet::NONE.with_swap(), || {
            Box::new(Mover { speed: 9.0 })
        });
        assert_eq!(first, second);
        let descriptor = registry.descriptor(first).unwrap();
        assert_eq!(descriptor.revision, 1);
        assert!(descriptor.callbacks.swap);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_derived_name_trims_path_and_generics() {
        assert_eq!(derived_name::<Chaser>(), "Chaser");
        assert_eq!(short_type_name("alloc::vec::Vec<u8>"), "Vec");
        assert_eq!(short_type_name("Plain"), "Plain");
        assert_eq!(short_type_name(""), "undefined");
        assert_eq!(short_type_name("<>"), "undefined");
    }

    #[test]
    fn test_register_default_uses_derived_name() {
        let mut registry = ScriptRegistry::new();
        registry.register_default::<Chaser>(CallbackSet::NONE);
        assert!(registry.lookup("Chaser").is_some());
    }
}
