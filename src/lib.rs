//! A scriptable game runtime built in Rust
//!
//! This engine provides:
//! - Entity Component System (ECS) architecture with parent/child hierarchies
//! - A script lifecycle runtime (initialize, post-initialize, update, swap)
//! - Scene serialization with script attachments
//! - Input handling with winit

pub mod core;
pub mod ecs;
pub mod input;
pub mod scene;
pub mod script;
pub mod ui;

// Re-exports for convenience
pub use glam;
pub use hecs;
pub use winit;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{Engine, EngineConfig, EngineContext, EngineEvent, Game, RenderBackend};
    pub use crate::ecs::{Children, Enabled, Name, Parent, Transform, World};
    pub use crate::input::Input;
    pub use crate::scene::{Scene, SerializedEntity, SerializedScript};
    pub use crate::script::{
        attach_script, CallbackSet, Script, ScriptContainer, ScriptContext, ScriptError,
        ScriptInstance, ScriptRegistry, ScriptValue,
    };
    pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
    pub use winit::keyboard::KeyCode;
}
