//! Render backend seam
//!
//! The engine core never touches the GPU. A host application plugs a
//! rendering pipeline in through this trait; the engine only calls it at
//! frame boundaries with read access to the world.

use crate::ecs::World;

/// Opaque handle to an external rendering pipeline.
///
/// Implementations own their device, surfaces and resources; the engine
/// drives them per frame and forwards window resizes.
pub trait RenderBackend: Send {
    /// Called at the start of a frame
    fn begin_frame(&mut self);

    /// Render the current world state
    fn render(&mut self, world: &World);

    /// Called at the end of a frame, after the game's own render hook
    fn end_frame(&mut self);

    /// The window surface changed size
    fn resize(&mut self, _width: u32, _height: u32) {}
}
