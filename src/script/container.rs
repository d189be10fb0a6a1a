//! Script container component
//!
//! The per-entity component owning an ordered list of script instances.
//! All lifecycle callbacks are invoked through the container's guarded
//! path: a missing capability is a no-op, a failing callback disables the
//! instance and emits an error notification, and sibling processing is
//! never interrupted.
//!
//! Batch enabling runs in two phases so that every instance's `initialize`
//! completes before any instance's `post_initialize` starts. The phase is
//! explicit state (not a hidden flag) and carries a nesting depth: only
//! the outermost cascade runs the post pass, so re-entrant cascades can
//! neither skip it nor run it early.

use crate::core::events::EngineEvent;
use crate::script::behaviour::ScriptContext;
use crate::script::instance::{EnableEnv, ScriptInstance};
use crate::script::registry::ScriptRegistry;
use crate::script::CallbackKind;

/// Where a container currently is in the enable cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnablePhase {
    /// No batch operation in progress
    #[default]
    Idle,
    /// First pass: recomputing instance states, running `initialize`.
    /// `post_initialize` is deferred while this phase is active.
    Enabling,
    /// Second pass: running deferred `post_initialize` callbacks
    PostEnabling,
}

/// Component orchestrating every script instance attached to one entity
pub struct ScriptContainer {
    /// Execution order is list order; kept sorted by each instance's
    /// `execution_order` key
    instances: Vec<ScriptInstance>,
    enabled: bool,
    phase: EnablePhase,
    /// Re-entrant cascade depth; the post pass runs only when the
    /// outermost cascade unwinds
    enabling_depth: u32,
    next_order: i32,
}

impl ScriptContainer {
    /// Create an enabled container with no instances
    #[must_use]
    pub fn new() -> Self {
        Self {
            instances: Vec::new(),
            enabled: true,
            phase: EnablePhase::Idle,
            enabling_depth: 0,
            next_order: 0,
        }
    }

    /// Create a container that starts disabled
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Container-level enabled flag
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Current cascade phase
    #[must_use]
    pub fn phase(&self) -> EnablePhase {
        self.phase
    }

    /// Number of attached instances
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether any instances are attached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Instances in execution order
    pub fn iter(&self) -> impl Iterator<Item = &ScriptInstance> {
        self.instances.iter()
    }

    /// Find an instance by type name
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ScriptInstance> {
        self.instances.iter().find(|i| i.type_name() == name)
    }

    /// Find an instance by type name, mutably
    pub fn find_mut(&mut self, name: &str) -> Option<&mut ScriptInstance> {
        self.instances.iter_mut().find(|i| i.type_name() == name)
    }

    /// Attach an instance, assigning the next execution order.
    ///
    /// Lifecycle callbacks fire on the next [`Self::refresh`] (the script
    /// system runs one every tick), so attaching mid-batch cannot bypass
    /// the initialize-before-post-initialize ordering.
    pub fn attach(&mut self, mut instance: ScriptInstance) {
        instance.set_execution_order(self.next_order);
        self.next_order += 1;
        log::debug!(
            "attached script '{}' at order {}",
            instance.type_name(),
            instance.execution_order()
        );
        self.instances.push(instance);
    }

    /// Unbind an instance without destroying it.
    ///
    /// The caller owns the returned instance; its lifecycle flags are kept,
    /// but it will report disabled until re-attached (re-attachment of a
    /// *destroyed* instance is unsupported - create a fresh one).
    pub fn detach(&mut self, name: &str) -> Option<ScriptInstance> {
        let index = self
            .instances
            .iter()
            .position(|i| i.type_name() == name)?;
        Some(self.instances.remove(index))
    }

    /// Destroy an instance in place and remove it.
    ///
    /// Fires the disable edge (if running) and the destroy notification.
    /// Returns false when no instance has the given name; destroying twice
    /// is therefore a silent no-op.
    pub fn destroy_script(&mut self, name: &str, ctx: &mut ScriptContext) -> bool {
        let Some(index) = self
            .instances
            .iter()
            .position(|i| i.type_name() == name)
        else {
            return false;
        };
        let env = self.current_env(ctx);
        self.instances[index].destroy(env);
        self.instances.remove(index);
        true
    }

    /// Enable or disable the whole container.
    ///
    /// A rising edge runs the enable cascade (initialize in execution
    /// order, then post-initialize in execution order); a falling edge
    /// disables every instance in execution order. Redundant calls are
    /// no-ops.
    pub fn set_enabled(&mut self, value: bool, ctx: &mut ScriptContext) {
        if self.enabled == value {
            return;
        }
        self.enabled = value;
        self.refresh(ctx);
    }

    /// Set one instance's own enabled flag.
    ///
    /// Outside a cascade the full lifecycle (initialize, post-initialize)
    /// runs immediately on a rising effective edge. Returns false when the
    /// name is unknown.
    pub fn set_script_enabled(&mut self, name: &str, value: bool, ctx: &mut ScriptContext) -> bool {
        let Some(index) = self
            .instances
            .iter()
            .position(|i| i.type_name() == name)
        else {
            return false;
        };
        self.set_instance_raw_enabled(index, value, ctx);
        true
    }

    /// Reassign an instance's execution order and re-sort siblings.
    ///
    /// The sort is stable, so equal keys keep their attachment order.
    pub fn set_execution_order(&mut self, name: &str, order: i32) -> bool {
        let Some(instance) = self.find_mut(name) else {
            return false;
        };
        instance.set_execution_order(order);
        self.instances.sort_by_key(ScriptInstance::execution_order);
        true
    }

    /// Recompute every instance's effective state, running pending
    /// lifecycle callbacks in execution order.
    ///
    /// This is the cascade primitive: pass one walks the list in the
    /// `Enabling` phase (initialize fires on rising edges, post-initialize
    /// is deferred); when the outermost cascade unwinds, pass two walks the
    /// list again in the `PostEnabling` phase running deferred
    /// post-initialize steps. Edge detection inside each instance makes
    /// redundant refreshes free.
    pub fn refresh(&mut self, ctx: &mut ScriptContext) {
        self.enabling_depth += 1;
        self.phase = EnablePhase::Enabling;

        let mut index = 0;
        while index < self.instances.len() {
            let env = self.current_env(ctx);
            if let Some(kind) = self.instances[index].refresh(env) {
                self.invoke(index, kind, ctx);
            }
            index += 1;
        }

        self.enabling_depth -= 1;
        if self.enabling_depth > 0 {
            // Still inside an outer cascade; it owns the post pass.
            self.phase = EnablePhase::Enabling;
            return;
        }

        self.phase = EnablePhase::PostEnabling;
        let mut index = 0;
        while index < self.instances.len() {
            let env = self.current_env(ctx);
            if self.instances[index].take_post_initialize(env) {
                self.invoke(index, CallbackKind::PostInitialize, ctx);
            }
            index += 1;
        }
        self.phase = EnablePhase::Idle;
    }

    /// Per-tick `update` dispatch in execution order.
    ///
    /// Runs pending lifecycle work first, so instances whose entity became
    /// enabled since the last tick initialize before anything updates.
    pub fn dispatch_update(&mut self, ctx: &mut ScriptContext) {
        self.refresh(ctx);
        let mut index = 0;
        while index < self.instances.len() {
            let env = self.current_env(ctx);
            if self.instances[index].running(env) {
                self.invoke(index, CallbackKind::Update, ctx);
            }
            index += 1;
        }
    }

    /// Per-tick `post_update` dispatch in execution order
    pub fn dispatch_post_update(&mut self, ctx: &mut ScriptContext) {
        let mut index = 0;
        while index < self.instances.len() {
            let env = self.current_env(ctx);
            if self.instances[index].running(env) {
                self.invoke(index, CallbackKind::PostUpdate, ctx);
            }
            index += 1;
        }
    }

    /// Replace behaviours whose registry definition changed since they
    /// were instantiated, calling the new behaviour's `swap` callback with
    /// the old one. Returns the number of swapped instances.
    pub fn apply_swaps(&mut self, registry: &ScriptRegistry, ctx: &mut ScriptContext) -> usize {
        let mut swapped = 0;
        let mut index = 0;
        while index < self.instances.len() {
            let id = self.instances[index].type_id();
            let stale = registry
                .descriptor(id)
                .is_some_and(|d| d.revision != self.instances[index].revision());
            if !stale {
                index += 1;
                continue;
            }
            let descriptor = registry.descriptor(id).expect("descriptor checked above");
            if !descriptor.callbacks.swap {
                // The new definition opted out of hot-swap; keep running
                // the old behaviour until the instance is recreated.
                index += 1;
                continue;
            }
            let Some(fresh) = registry.new_behaviour(id) else {
                index += 1;
                continue;
            };

            let revision = descriptor.revision;
            let callbacks = descriptor.callbacks;
            let instance = &mut self.instances[index];
            let mut old = instance.replace_behaviour(fresh, revision, callbacks);
            let result = instance.behaviour_mut().swap(old.as_any_mut(), ctx);
            if self.handle_result(index, CallbackKind::Swap, result, ctx) {
                swapped += 1;
            }
            self.apply_requested_enabled(index, ctx);
            index += 1;
        }
        swapped
    }

    fn current_env(&self, ctx: &ScriptContext) -> EnableEnv {
        EnableEnv {
            container_enabled: self.enabled,
            entity_enabled: ctx.world.entity_effective_enabled(ctx.entity),
            in_enable_cascade: self.phase == EnablePhase::Enabling,
        }
    }

    /// Guarded callback invocation. Missing capability: no-op. Error:
    /// the instance is force-disabled, an `Error` notification fires on
    /// the instance and an engine event is published, and the failure
    /// never propagates to the caller.
    fn invoke(&mut self, index: usize, kind: CallbackKind, ctx: &mut ScriptContext) {
        if !self.instances[index].callbacks().has(kind) {
            return;
        }

        let result = {
            let behaviour = self.instances[index].behaviour_mut();
            match kind {
                CallbackKind::Initialize => behaviour.initialize(ctx),
                CallbackKind::PostInitialize => behaviour.post_initialize(ctx),
                CallbackKind::Update => behaviour.update(ctx),
                CallbackKind::PostUpdate => behaviour.post_update(ctx),
                // Swap is driven by apply_swaps, which owns the old box.
                CallbackKind::Swap => Ok(()),
            }
        };

        self.handle_result(index, kind, result, ctx);
        self.apply_requested_enabled(index, ctx);
    }

    /// Error half of the invocation guard, shared with `apply_swaps`.
    /// Returns true when the callback succeeded.
    fn handle_result(
        &mut self,
        index: usize,
        kind: CallbackKind,
        result: Result<(), crate::script::ScriptError>,
        ctx: &mut ScriptContext,
    ) -> bool {
        let Err(err) = result else {
            return true;
        };
        let message = err.to_string();
        let name = self.instances[index].type_name().to_string();
        log::warn!("script '{name}' failed in {kind}: {message}");

        self.instances[index].emit_error(kind, message.clone());
        ctx.events.push(EngineEvent::ScriptError {
            entity: ctx.entity,
            script: name,
            method: kind,
            message,
        });

        // Force-disable; the refresh fires the disable edge and can only
        // move towards disabled, so it cannot request initialize.
        self.instances[index].set_raw_enabled(false);
        let env = self.current_env(ctx);
        self.instances[index].refresh(env);
        false
    }

    /// Apply an enable-state change the callback requested for itself
    fn apply_requested_enabled(&mut self, index: usize, ctx: &mut ScriptContext) {
        if let Some(value) = ctx.take_requested_enabled() {
            self.set_instance_raw_enabled(index, value, ctx);
        }
    }

    fn set_instance_raw_enabled(&mut self, index: usize, value: bool, ctx: &mut ScriptContext) {
        self.instances[index].set_raw_enabled(value);
        let env = self.current_env(ctx);
        if let Some(kind) = self.instances[index].refresh(env) {
            self.invoke(index, kind, ctx);
        }
        // Outside a cascade the deferred post step runs immediately.
        if self.phase != EnablePhase::Enabling {
            let env = self.current_env(ctx);
            if self.instances[index].take_post_initialize(env) {
                self.invoke(index, CallbackKind::PostInitialize, ctx);
            }
        }
    }
}

impl Default for ScriptContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScriptContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptContainer")
            .field("instances", &self.instances.len())
            .field("enabled", &self.enabled)
            .field("phase", &self.phase)
            .finish()
    }
}
