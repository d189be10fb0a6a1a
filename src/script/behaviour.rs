//! Script behaviour trait and callback context

use std::any::Any;

use hecs::Entity;

use crate::core::events::{EngineEvent, EventQueue};
use crate::ecs::World;
use crate::script::{CallbackKind, ScriptError};

/// Upcast helper so a boxed behaviour can be inspected during hot-swap
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A user-authored behaviour bound to one entity.
///
/// All callbacks are optional; which ones a type implements is declared in
/// the [`CallbackSet`] passed at registration. A callback that returns an
/// error is caught at the container's invocation boundary: the instance is
/// disabled and an error notification fires, siblings keep running.
///
/// Lifecycle: `initialize` runs once, the first time the instance becomes
/// effectively enabled. `post_initialize` runs once, after `initialize`
/// (and, when a whole container is enabled at once, after *every* sibling's
/// `initialize`). Disabling never re-arms either callback.
#[allow(unused_variables)]
pub trait Script: AsAny + Send + Sync + 'static {
    /// Called when the script is about to run for the first time
    fn initialize(&mut self, ctx: &mut ScriptContext) -> Result<(), ScriptError> {
        Ok(())
    }

    /// Called after all `initialize` callbacks in the same enabling batch
    fn post_initialize(&mut self, ctx: &mut ScriptContext) -> Result<(), ScriptError> {
        Ok(())
    }

    /// Called each tick while the instance is running
    fn update(&mut self, ctx: &mut ScriptContext) -> Result<(), ScriptError> {
        Ok(())
    }

    /// Called each tick after every sibling's `update`
    fn post_update(&mut self, ctx: &mut ScriptContext) -> Result<(), ScriptError> {
        Ok(())
    }

    /// Called on hot-reload with the previous behaviour instance.
    ///
    /// Downcast `old` to the concrete type to carry state over.
    fn swap(&mut self, old: &mut dyn Any, ctx: &mut ScriptContext) -> Result<(), ScriptError> {
        Ok(())
    }
}

/// Which callbacks a script type implements.
///
/// Populated once at registration; the container consults this table
/// instead of probing the behaviour at call time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallbackSet {
    pub initialize: bool,
    pub post_initialize: bool,
    pub update: bool,
    pub post_update: bool,
    pub swap: bool,
}

impl CallbackSet {
    /// No callbacks at all
    pub const NONE: Self = Self {
        initialize: false,
        post_initialize: false,
        update: false,
        post_update: false,
        swap: false,
    };

    #[must_use]
    pub const fn with_initialize(mut self) -> Self {
        self.initialize = true;
        self
    }

    #[must_use]
    pub const fn with_post_initialize(mut self) -> Self {
        self.post_initialize = true;
        self
    }

    #[must_use]
    pub const fn with_update(mut self) -> Self {
        self.update = true;
        self
    }

    #[must_use]
    pub const fn with_post_update(mut self) -> Self {
        self.post_update = true;
        self
    }

    #[must_use]
    pub const fn with_swap(mut self) -> Self {
        self.swap = true;
        self
    }

    /// Does this type implement the given callback?
    #[must_use]
    pub const fn has(&self, kind: CallbackKind) -> bool {
        match kind {
            CallbackKind::Initialize => self.initialize,
            CallbackKind::PostInitialize => self.post_initialize,
            CallbackKind::Update => self.update,
            CallbackKind::PostUpdate => self.post_update,
            CallbackKind::Swap => self.swap,
        }
    }
}

/// Context handed to every script callback.
///
/// The running container is temporarily detached from the world, so the
/// callback gets full mutable world access without aliasing its own
/// container. Enable-state changes for the calling instance go through
/// [`ScriptContext::set_self_enabled`] and are applied by the container as
/// soon as the callback returns.
pub struct ScriptContext<'a> {
    /// Entity the running instance is attached to
    pub entity: Entity,
    /// Seconds since the previous tick
    pub dt: f32,
    /// The game world (minus the running container)
    pub world: &'a mut World,
    /// Engine-level event sink
    pub events: &'a mut EventQueue,
    requested_enabled: Option<bool>,
}

impl<'a> ScriptContext<'a> {
    /// Build a context for one entity's container
    pub fn new(
        entity: Entity,
        dt: f32,
        world: &'a mut World,
        events: &'a mut EventQueue,
    ) -> Self {
        Self {
            entity,
            dt,
            world,
            events,
            requested_enabled: None,
        }
    }

    /// Request an enable-state change for the calling instance.
    ///
    /// Applied by the container immediately after the current callback
    /// returns; redundant requests are absorbed by edge detection.
    pub fn set_self_enabled(&mut self, value: bool) {
        self.requested_enabled = Some(value);
    }

    /// Shorthand for `set_self_enabled(false)`
    pub fn disable_self(&mut self) {
        self.set_self_enabled(false);
    }

    /// Publish a message on the engine event queue
    pub fn post_message(&mut self, message: impl Into<String>) {
        self.events.push(EngineEvent::ScriptMessage {
            entity: self.entity,
            message: message.into(),
        });
    }

    pub(crate) fn take_requested_enabled(&mut self) -> Option<bool> {
        self.requested_enabled.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_set_builder() {
        let set = CallbackSet::NONE.with_initialize().with_update();
        assert!(set.has(CallbackKind::Initialize));
        assert!(set.has(CallbackKind::Update));
        assert!(!set.has(CallbackKind::PostInitialize));
        assert!(!set.has(CallbackKind::Swap));
    }

    #[test]
    fn test_context_requested_enabled_is_taken_once() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let entity = world.spawn(());
        let mut ctx = ScriptContext::new(entity, 0.016, &mut world, &mut events);

        assert_eq!(ctx.take_requested_enabled(), None);
        ctx.disable_self();
        assert_eq!(ctx.take_requested_enabled(), Some(false));
        assert_eq!(ctx.take_requested_enabled(), None);
    }
}
