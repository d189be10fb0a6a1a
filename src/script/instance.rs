//! Script instance state machine
//!
//! One instance binds one behaviour to one entity. The instance owns its
//! raw enabled flag and lifecycle flags; the *effective* enabled state is a
//! pure conjunction recomputed on demand, with a single cached copy used
//! only for edge detection. State transitions per instance:
//!
//! ```text
//! Attached(disabled)
//!   -> Attached(enabled, uninitialized)
//!   -> Attached(enabled, initialized)
//!   -> Attached(enabled, post_initialized)
//!  <-> Attached(disabled, initialized/post_initialized)
//!   -> Destroyed (terminal)
//! ```
//!
//! Disable never resets the lifecycle flags; `initialize` and
//! `post_initialize` run at most once per instance lifetime.

use rustc_hash::FxHashMap;

use crate::script::behaviour::{CallbackSet, Script};
use crate::script::events::{EventDispatcher, EventFilter, ScriptEvent, ScriptValue};
use crate::script::registry::ScriptTypeId;
use crate::script::CallbackKind;

/// Snapshot of the ancestor conditions that feed an instance's effective
/// enabled state, plus the container phase guard.
#[derive(Debug, Clone, Copy)]
pub struct EnableEnv {
    /// Owning container's enabled flag
    pub container_enabled: bool,
    /// Bound entity's effective enabled state (own flag and all ancestors)
    pub entity_enabled: bool,
    /// True while the container runs the first pass of an enable cascade;
    /// defers `post_initialize` until every sibling has initialized
    pub in_enable_cascade: bool,
}

impl EnableEnv {
    /// Environment for a detached or test-standalone instance
    #[must_use]
    pub const fn detached() -> Self {
        Self {
            container_enabled: false,
            entity_enabled: false,
            in_enable_cascade: false,
        }
    }
}

/// One behaviour bound to one entity, owned by a
/// [`crate::script::ScriptContainer`].
pub struct ScriptInstance {
    type_id: ScriptTypeId,
    type_name: String,
    revision: u32,
    callbacks: CallbackSet,
    behaviour: Box<dyn Script>,
    raw_enabled: bool,
    /// Last computed effective state, kept only for edge detection
    enabled_old: bool,
    initialized: bool,
    post_initialized: bool,
    destroyed: bool,
    /// Position among siblings; -1 until attached
    execution_order: i32,
    attributes: FxHashMap<String, ScriptValue>,
    dispatcher: EventDispatcher,
}

impl ScriptInstance {
    pub(crate) fn new(
        type_id: ScriptTypeId,
        type_name: String,
        revision: u32,
        callbacks: CallbackSet,
        behaviour: Box<dyn Script>,
    ) -> Self {
        Self {
            type_id,
            type_name,
            revision,
            callbacks,
            behaviour,
            raw_enabled: true,
            enabled_old: false,
            initialized: false,
            post_initialized: false,
            destroyed: false,
            execution_order: -1,
            attributes: FxHashMap::default(),
            dispatcher: EventDispatcher::new(),
        }
    }

    /// Stable id of the behaviour type
    #[must_use]
    pub fn type_id(&self) -> ScriptTypeId {
        self.type_id
    }

    /// Display name of the behaviour type
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Registry revision this instance was built from
    #[must_use]
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Callback capability table copied from the registry descriptor
    #[must_use]
    pub fn callbacks(&self) -> CallbackSet {
        self.callbacks
    }

    /// The instance's own desired state, ignoring ancestors
    #[must_use]
    pub fn raw_enabled(&self) -> bool {
        self.raw_enabled
    }

    /// Has the one-time `initialize` callback run?
    #[must_use]
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Has the one-time `post_initialize` step run?
    #[must_use]
    pub fn post_initialized(&self) -> bool {
        self.post_initialized
    }

    /// Permanently removed?
    #[must_use]
    pub fn destroyed(&self) -> bool {
        self.destroyed
    }

    /// Position among sibling instances; -1 while unattached
    #[must_use]
    pub fn execution_order(&self) -> i32 {
        self.execution_order
    }

    pub(crate) fn set_execution_order(&mut self, order: i32) {
        self.execution_order = order;
    }

    /// Effective enabled state: the instance's own flag AND not destroyed
    /// AND container enabled AND entity enabled. Pure; never cached beyond
    /// the internal edge detector.
    #[must_use]
    pub fn effective_enabled(&self, env: EnableEnv) -> bool {
        self.raw_enabled && !self.destroyed && env.container_enabled && env.entity_enabled
    }

    /// Can per-tick callbacks run right now?
    #[must_use]
    pub fn running(&self, env: EnableEnv) -> bool {
        self.initialized && self.effective_enabled(env)
    }

    /// Register an event listener; delivery is in registration order
    pub fn on(
        &mut self,
        filter: EventFilter,
        listener: impl FnMut(&ScriptEvent) + Send + Sync + 'static,
    ) {
        self.dispatcher.on(filter, listener);
    }

    /// Read an attribute
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&ScriptValue> {
        self.attributes.get(name)
    }

    /// Set an attribute, firing `Attr` notifications when the value changes
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<ScriptValue>) {
        let name = name.into();
        let value = value.into();
        let old_value = self
            .attributes
            .insert(name.clone(), value.clone())
            .unwrap_or(ScriptValue::Null);
        if old_value != value {
            self.dispatcher.emit(&ScriptEvent::Attr {
                name,
                new_value: value,
                old_value,
            });
        }
    }

    /// Iterate attributes (scene serialization)
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &ScriptValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Borrow the concrete behaviour, if it has the expected type
    #[must_use]
    pub fn behaviour_as<T: Script>(&self) -> Option<&T> {
        self.behaviour.as_any().downcast_ref::<T>()
    }

    pub(crate) fn behaviour_mut(&mut self) -> &mut dyn Script {
        self.behaviour.as_mut()
    }

    pub(crate) fn replace_behaviour(
        &mut self,
        behaviour: Box<dyn Script>,
        revision: u32,
        callbacks: CallbackSet,
    ) -> Box<dyn Script> {
        self.revision = revision;
        self.callbacks = callbacks;
        std::mem::replace(&mut self.behaviour, behaviour)
    }

    pub(crate) fn set_raw_enabled(&mut self, value: bool) {
        self.raw_enabled = value;
    }

    /// Recompute the effective state against `env` and fire edge
    /// notifications. Returns `Some(CallbackKind::Initialize)` when the
    /// one-time setup callback must now be invoked (the `initialized` flag
    /// is already set so a re-entrant refresh cannot request it twice).
    pub(crate) fn refresh(&mut self, env: EnableEnv) -> Option<CallbackKind> {
        let effective = self.effective_enabled(env);
        if effective == self.enabled_old {
            return None;
        }

        self.enabled_old = effective;
        self.dispatcher.emit(if effective {
            &ScriptEvent::Enabled
        } else {
            &ScriptEvent::Disabled
        });
        self.dispatcher.emit(&ScriptEvent::State(effective));

        if effective && !self.initialized {
            self.initialized = true;
            self.dispatcher.emit(&ScriptEvent::PreInitialize);
            if self.callbacks.initialize {
                return Some(CallbackKind::Initialize);
            }
        }
        None
    }

    /// One-shot post-initialize step. Marks the flag and reports whether
    /// the callback must be invoked. Never fires during the `Enabling`
    /// phase of a cascade; the container runs it once the whole batch has
    /// initialized.
    pub(crate) fn take_post_initialize(&mut self, env: EnableEnv) -> bool {
        if self.initialized
            && !self.post_initialized
            && self.effective_enabled(env)
            && !env.in_enable_cascade
        {
            self.post_initialized = true;
            return self.callbacks.post_initialize;
        }
        false
    }

    /// Permanently retire the instance. Idempotent; fires the disable edge
    /// if the instance was running, then `Destroyed`. No lifecycle callback
    /// ever runs afterwards.
    pub(crate) fn destroy(&mut self, env: EnableEnv) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        // Forces effective false; emits Disabled + State(false) if needed.
        self.refresh(env);
        self.dispatcher.emit(&ScriptEvent::Destroyed);
    }

    pub(crate) fn emit_error(&mut self, method: CallbackKind, message: String) {
        self.dispatcher.emit(&ScriptEvent::Error { method, message });
    }
}

impl std::fmt::Debug for ScriptInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptInstance")
            .field("type_name", &self.type_name)
            .field("raw_enabled", &self.raw_enabled)
            .field("initialized", &self.initialized)
            .field("post_initialized", &self.post_initialized)
            .field("destroyed", &self.destroyed)
            .field("execution_order", &self.execution_order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::events::ScriptEventKind;
    use std::sync::{Arc, Mutex};

    struct Inert;
    impl Script for Inert {}

    fn standalone() -> ScriptInstance {
        ScriptInstance::new(
            ScriptTypeId::from_raw(0),
            "Inert".to_string(),
            0,
            CallbackSet::NONE,
            Box::new(Inert),
        )
    }

    const ALL_ON: EnableEnv = EnableEnv {
        container_enabled: true,
        entity_enabled: true,
        in_enable_cascade: false,
    };

    fn watch(instance: &mut ScriptInstance) -> Arc<Mutex<Vec<String>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        instance.on(EventFilter::Any, move |event| {
            sink.lock().unwrap().push(format!("{:?}", event.kind()));
        });
        log
    }

    #[test]
    fn test_effective_is_four_flag_conjunction() {
        let mut instance = standalone();
        assert!(instance.effective_enabled(ALL_ON));

        assert!(!instance.effective_enabled(EnableEnv {
            container_enabled: false,
            ..ALL_ON
        }));
        assert!(!instance.effective_enabled(EnableEnv {
            entity_enabled: false,
            ..ALL_ON
        }));

        instance.set_raw_enabled(false);
        assert!(!instance.effective_enabled(ALL_ON));
        instance.set_raw_enabled(true);

        instance.destroy(ALL_ON);
        assert!(!instance.effective_enabled(ALL_ON));
    }

    #[test]
    fn test_refresh_fires_only_on_edges() {
        let mut instance = standalone();
        let log = watch(&mut instance);

        instance.refresh(ALL_ON);
        instance.refresh(ALL_ON);
        instance.refresh(ALL_ON);

        let entries = log.lock().unwrap();
        // One edge: Enabled, State, PreInitialize - repeats are no-ops
        assert_eq!(
            entries.as_slice(),
            ["Enabled", "State", "PreInitialize"]
        );
    }

    #[test]
    fn test_enable_disable_cycle_events() {
        let mut instance = standalone();
        let log = watch(&mut instance);

        instance.refresh(ALL_ON);
        instance.set_raw_enabled(false);
        instance.refresh(ALL_ON);
        instance.set_raw_enabled(true);
        instance.refresh(ALL_ON);

        let entries = log.lock().unwrap();
        assert_eq!(
            entries.as_slice(),
            [
                "Enabled",
                "State",
                "PreInitialize",
                "Disabled",
                "State",
                "Enabled",
                "State",
            ]
        );
    }

    #[test]
    fn test_initialize_requested_once() {
        let mut instance = standalone();
        let mut with_init = ScriptInstance::new(
            ScriptTypeId::from_raw(1),
            "WithInit".to_string(),
            0,
            CallbackSet::NONE.with_initialize(),
            Box::new(Inert),
        );

        // Without the capability, the edge still marks initialized but
        // requests no invocation.
        assert_eq!(instance.refresh(ALL_ON), None);
        assert!(instance.initialized());

        assert_eq!(with_init.refresh(ALL_ON), Some(CallbackKind::Initialize));
        with_init.set_raw_enabled(false);
        with_init.refresh(ALL_ON);
        with_init.set_raw_enabled(true);
        // Re-enable: initialize must not be requested again
        assert_eq!(with_init.refresh(ALL_ON), None);
        assert!(with_init.initialized());
    }

    #[test]
    fn test_post_initialize_deferred_during_cascade() {
        let mut instance = ScriptInstance::new(
            ScriptTypeId::from_raw(2),
            "Post".to_string(),
            0,
            CallbackSet::NONE.with_post_initialize(),
            Box::new(Inert),
        );
        let cascade = EnableEnv {
            in_enable_cascade: true,
            ..ALL_ON
        };

        instance.refresh(cascade);
        assert!(instance.initialized());
        // Deferred while the cascade is running
        assert!(!instance.take_post_initialize(cascade));
        assert!(!instance.post_initialized());

        // Fires once the cascade completes, and only once
        assert!(instance.take_post_initialize(ALL_ON));
        assert!(instance.post_initialized());
        assert!(!instance.take_post_initialize(ALL_ON));
    }

    #[test]
    fn test_destroy_is_idempotent_and_terminal() {
        let mut instance = standalone();
        let log = watch(&mut instance);

        instance.refresh(ALL_ON);
        instance.destroy(ALL_ON);
        instance.destroy(ALL_ON);

        assert!(instance.destroyed());
        assert!(!instance.effective_enabled(ALL_ON));

        // Re-enabling after destroy is a permanent no-op
        instance.set_raw_enabled(true);
        assert_eq!(instance.refresh(ALL_ON), None);
        assert!(!instance.take_post_initialize(ALL_ON));

        let entries = log.lock().unwrap();
        assert_eq!(
            entries.as_slice(),
            [
                "Enabled",
                "State",
                "PreInitialize",
                "Disabled",
                "State",
                "Destroyed",
            ]
        );
    }

    #[test]
    fn test_attr_change_detection() {
        let mut instance = standalone();
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        instance.on(EventFilter::Kind(ScriptEventKind::Attr), move |event| {
            if let ScriptEvent::Attr {
                name,
                new_value,
                old_value,
            } = event
            {
                sink.lock()
                    .unwrap()
                    .push(format!("{name}: {old_value} -> {new_value}"));
            }
        });

        instance.set_attr("speed", 2.0);
        instance.set_attr("speed", 2.0); // unchanged, no event
        instance.set_attr("speed", 3.0);

        assert_eq!(instance.attr("speed"), Some(&ScriptValue::Float(3.0)));
        let entries = log.lock().unwrap();
        assert_eq!(
            entries.as_slice(),
            ["speed: null -> 2", "speed: 2 -> 3"]
        );
    }

    #[test]
    fn test_per_attribute_listener() {
        let mut instance = standalone();
        let hits = Arc::new(Mutex::new(0u32));
        let sink = Arc::clone(&hits);
        instance.on(EventFilter::Attr("speed".to_string()), move |_| {
            *sink.lock().unwrap() += 1;
        });

        instance.set_attr("speed", 1.0);
        instance.set_attr("health", 5i64);

        assert_eq!(*hits.lock().unwrap(), 1);
    }
}
