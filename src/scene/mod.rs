//! Scene description, serialization, and instantiation.

#[allow(clippy::module_inception)]
mod scene;
mod skin;

pub use scene::{Scene, SceneError, SerializedEntity, SerializedScript};
pub use skin::Skin;
