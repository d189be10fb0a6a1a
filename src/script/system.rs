//! Per-tick script dispatch
//!
//! Drives every [`ScriptContainer`] in a world. Each container is taken
//! out of the world for the duration of its callbacks so scripts get full
//! mutable world access without aliasing their own container.

use hecs::Entity;

use crate::core::events::EventQueue;
use crate::core::Time;
use crate::ecs::World;
use crate::script::behaviour::ScriptContext;
use crate::script::container::ScriptContainer;
use crate::script::instance::ScriptInstance;

/// Run one script tick over the whole world: pending lifecycle work, then
/// `update`, then `post_update`, each in execution order per container.
///
/// Containers are processed entity by entity; an entity despawned by its
/// own scripts simply loses its container.
pub fn update_scripts(world: &mut World, time: &Time, events: &mut EventQueue) {
    let entities: Vec<Entity> = world
        .query::<&ScriptContainer>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();

    let dt = time.delta_seconds();
    for entity in entities {
        let Ok(mut container) = world.inner.remove_one::<ScriptContainer>(entity) else {
            continue;
        };
        {
            let mut ctx = ScriptContext::new(entity, dt, world, events);
            container.dispatch_update(&mut ctx);
            container.dispatch_post_update(&mut ctx);
        }
        if world.contains(entity) {
            let _ = world.inner.insert_one(entity, container);
        } else {
            log::debug!("entity {entity:?} despawned during script update");
        }
    }
}

/// Borrow an entity's container outside the tick, with a proper context.
///
/// Detaches the container, runs `f`, re-attaches. Returns `None` when the
/// entity has no container (or no longer exists).
pub fn with_container<R>(
    world: &mut World,
    events: &mut EventQueue,
    entity: Entity,
    dt: f32,
    f: impl FnOnce(&mut ScriptContainer, &mut ScriptContext) -> R,
) -> Option<R> {
    let mut container = world.inner.remove_one::<ScriptContainer>(entity).ok()?;
    let result = {
        let mut ctx = ScriptContext::new(entity, dt, world, events);
        f(&mut container, &mut ctx)
    };
    if world.contains(entity) {
        let _ = world.inner.insert_one(entity, container);
    }
    Some(result)
}

/// Bind a script instance to a live entity, creating the entity's
/// container on first use.
///
/// Attaching to a dead entity is a precondition violation, not a
/// recoverable error.
pub fn attach_script(
    world: &mut World,
    events: &mut EventQueue,
    entity: Entity,
    instance: ScriptInstance,
) {
    assert!(
        world.contains(entity),
        "script '{}' attached to a dead entity",
        instance.type_name()
    );

    if world.inner.satisfies::<&ScriptContainer>(entity).unwrap_or(false) {
        with_container(world, events, entity, 0.0, |container, ctx| {
            container.attach(instance);
            container.refresh(ctx);
        });
        return;
    }

    let mut container = ScriptContainer::new();
    container.attach(instance);
    {
        let mut ctx = ScriptContext::new(entity, 0.0, world, events);
        container.refresh(&mut ctx);
    }
    let _ = world.inner.insert_one(entity, container);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Enabled, Parent};
    use crate::script::behaviour::{CallbackSet, Script, ScriptContext};
    use crate::script::{ScriptError, ScriptRegistry};
    use std::sync::{Arc, Mutex};

    type CallLog = Arc<Mutex<Vec<String>>>;

    struct Ticker {
        tag: &'static str,
        log: CallLog,
        despawn_self: bool,
    }

    impl Script for Ticker {
        fn initialize(&mut self, _ctx: &mut ScriptContext) -> Result<(), ScriptError> {
            self.log.lock().unwrap().push(format!("{}.initialize", self.tag));
            Ok(())
        }

        fn update(&mut self, ctx: &mut ScriptContext) -> Result<(), ScriptError> {
            self.log.lock().unwrap().push(format!("{}.update", self.tag));
            if self.despawn_self {
                let _ = ctx.world.despawn(ctx.entity);
            }
            Ok(())
        }
    }

    const TICKER_CALLBACKS: CallbackSet = CallbackSet {
        initialize: true,
        post_initialize: false,
        update: true,
        post_update: false,
        swap: false,
    };

    fn ticker_registry(log: &CallLog, tag: &'static str, despawn_self: bool) -> ScriptRegistry {
        let mut registry = ScriptRegistry::new();
        let log = Arc::clone(log);
        registry.register(tag, TICKER_CALLBACKS, move || {
            Box::new(Ticker {
                tag,
                log: Arc::clone(&log),
                despawn_self,
            })
        });
        registry
    }

    #[test]
    fn test_update_scripts_runs_lifecycle_then_updates() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let registry = ticker_registry(&log, "T", false);

        let mut world = World::new();
        let mut events = EventQueue::new();
        let entity = world.spawn(());
        attach_script(&mut world, &mut events, entity, registry.instantiate("T").unwrap());

        let time = Time::new();
        update_scripts(&mut world, &time, &mut events);
        update_scripts(&mut world, &time, &mut events);

        let calls = log.lock().unwrap();
        assert_eq!(calls.as_slice(), ["T.initialize", "T.update", "T.update"]);
    }

    #[test]
    fn test_script_can_despawn_its_own_entity() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let registry = ticker_registry(&log, "Kamikaze", true);

        let mut world = World::new();
        let mut events = EventQueue::new();
        let entity = world.spawn(());
        attach_script(
            &mut world,
            &mut events,
            entity,
            registry.instantiate("Kamikaze").unwrap(),
        );

        let time = Time::new();
        update_scripts(&mut world, &time, &mut events);
        assert!(!world.contains(entity));
        // A further tick is a clean no-op
        update_scripts(&mut world, &time, &mut events);

        let calls = log.lock().unwrap();
        assert_eq!(calls.as_slice(), ["Kamikaze.initialize", "Kamikaze.update"]);
    }

    #[test]
    fn test_ancestor_disable_gates_descendant_scripts() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let registry = ticker_registry(&log, "Child", false);

        let mut world = World::new();
        let mut events = EventQueue::new();
        let root = world.spawn((Enabled(false),));
        let child = world.spawn((Parent::new(root),));
        attach_script(
            &mut world,
            &mut events,
            child,
            registry.instantiate("Child").unwrap(),
        );

        let time = Time::new();
        update_scripts(&mut world, &time, &mut events);
        assert!(log.lock().unwrap().is_empty());

        world.set_entity_enabled(root, true);
        update_scripts(&mut world, &time, &mut events);

        let calls = log.lock().unwrap();
        assert_eq!(calls.as_slice(), ["Child.initialize", "Child.update"]);
    }

    #[test]
    #[should_panic(expected = "attached to a dead entity")]
    fn test_attach_to_dead_entity_panics() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let registry = ticker_registry(&log, "T", false);

        let mut world = World::new();
        let mut events = EventQueue::new();
        let entity = world.spawn(());
        world.despawn(entity).unwrap();

        attach_script(&mut world, &mut events, entity, registry.instantiate("T").unwrap());
    }

    #[test]
    fn test_with_container_toggles_enable() {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let registry = ticker_registry(&log, "T", false);

        let mut world = World::new();
        let mut events = EventQueue::new();
        let entity = world.spawn(());
        attach_script(&mut world, &mut events, entity, registry.instantiate("T").unwrap());

        with_container(&mut world, &mut events, entity, 0.0, |container, ctx| {
            container.set_enabled(false, ctx);
        });

        let time = Time::new();
        update_scripts(&mut world, &time, &mut events);
        let calls = log.lock().unwrap().clone();
        assert_eq!(calls.as_slice(), ["T.initialize"], "initialize ran at attach, update gated off");
    }
}
