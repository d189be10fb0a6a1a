//! Core engine systems: the main loop, frame timing, and engine events.

mod backend;
mod engine;
pub mod events;
mod time;

pub use backend::RenderBackend;
pub use engine::{Engine, EngineConfig, EngineContext, Game};
pub use events::{EngineEvent, EventQueue};
pub use time::Time;
