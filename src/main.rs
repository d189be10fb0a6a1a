//! Example game demonstrating the script runtime

use vantage::prelude::*;

/// Spins its entity around the Y axis at a configurable speed
#[derive(Default)]
struct Rotator {
    speed: f32,
}

impl Script for Rotator {
    fn initialize(&mut self, ctx: &mut ScriptContext) -> Result<(), ScriptError> {
        log::info!("Rotator attached to {:?}", ctx.entity);
        Ok(())
    }

    fn update(&mut self, ctx: &mut ScriptContext) -> Result<(), ScriptError> {
        let angle = self.speed * ctx.dt;
        if let Ok(mut transform) = ctx.world.get_mut::<Transform>(ctx.entity) {
            transform.rotate_euler(Vec3::new(0.0, angle, 0.0));
        }
        Ok(())
    }
}

/// Announces itself once, then counts its active frames
#[derive(Default)]
struct Greeter {
    frames: u64,
}

impl Script for Greeter {
    fn initialize(&mut self, ctx: &mut ScriptContext) -> Result<(), ScriptError> {
        ctx.post_message("hello from the greeter".to_string());
        Ok(())
    }

    fn post_initialize(&mut self, ctx: &mut ScriptContext) -> Result<(), ScriptError> {
        // Every sibling script has initialized by now
        log::info!("Greeter ready on {:?}", ctx.entity);
        Ok(())
    }

    fn update(&mut self, _ctx: &mut ScriptContext) -> Result<(), ScriptError> {
        self.frames += 1;
        if self.frames % 600 == 0 {
            log::debug!("greeter has been active for {} frames", self.frames);
        }
        Ok(())
    }
}

/// Demo game with scripted entities
struct DemoGame {
    spinner: Option<hecs::Entity>,
}

impl DemoGame {
    fn new() -> Self {
        Self { spinner: None }
    }
}

impl Game for DemoGame {
    fn init(&mut self, ctx: &mut EngineContext) {
        log::info!("Initializing demo game");

        ctx.scripts.register(
            "Rotator",
            CallbackSet::NONE.with_initialize().with_update(),
            || Box::new(Rotator { speed: 1.2 }),
        );
        ctx.scripts.register_default::<Greeter>(
            CallbackSet::NONE
                .with_initialize()
                .with_post_initialize()
                .with_update(),
        );

        let spinner = ctx.world.spawn((
            Name::new("spinner"),
            Transform::from_position(Vec3::new(0.0, 1.0, 0.0)),
        ));
        self.spinner = Some(spinner);

        // Both scripts land in one container and initialize as a batch
        let rotator = ctx
            .scripts
            .instantiate("Rotator")
            .expect("Rotator registered above");
        let greeter = ctx
            .scripts
            .instantiate("Greeter")
            .expect("Greeter registered above");
        attach_script(&mut ctx.world, &mut ctx.events, spinner, rotator);
        attach_script(&mut ctx.world, &mut ctx.events, spinner, greeter);

        log::info!("Demo game initialized");
    }

    fn update(&mut self, ctx: &mut EngineContext) {
        if ctx.input.is_key_pressed(KeyCode::Escape) {
            ctx.quit();
            return;
        }

        // Toggle the spinner's enabled state to exercise the cascade
        if ctx.input.is_key_just_pressed(KeyCode::Space) {
            if let Some(spinner) = self.spinner {
                let enabled = !ctx.world.entity_enabled(spinner);
                ctx.world.set_entity_enabled(spinner, enabled);
                ctx.events.push(EngineEvent::EntityEnabled {
                    entity: spinner,
                    enabled,
                });
                log::info!("spinner enabled: {enabled}");
            }
        }

        for event in ctx.events.iter() {
            match event {
                EngineEvent::ScriptMessage { entity, message } => {
                    log::info!("message from {entity:?}: {message}");
                }
                EngineEvent::ScriptError {
                    script,
                    method,
                    message,
                    ..
                } => {
                    log::error!("script '{script}' failed in {method}: {message}");
                }
                _ => {}
            }
        }
    }
}

fn main() {
    let config = EngineConfig::default()
        .with_title("Vantage Demo")
        .with_size(1280, 720);

    if let Err(e) = Engine::new(config, DemoGame::new()).run() {
        eprintln!("Engine error: {e}");
        std::process::exit(1);
    }
}
