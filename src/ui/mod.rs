//! UI widget data and layout primitives.

mod button;
mod color;
mod rect;

pub use button::{ButtonData, ButtonTransitionMode};
pub use color::Color;
pub use rect::{Anchor, Rect};
