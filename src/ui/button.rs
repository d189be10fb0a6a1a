//! Button widget data
//!
//! [`ButtonData`] holds the declarative state of a clickable UI element:
//! visual feedback mode, tints or sprite frames per interaction state, and
//! the padded hit area. Input routing and drawing are left to the game and
//! its render backend.

use glam::Vec4;
use hecs::Entity;
use serde::{Deserialize, Serialize};

use crate::ui::Color;

/// How a button visually reacts to hover and press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ButtonTransitionMode {
    /// Multiply the image color by a per-state tint
    #[default]
    Tint,
    /// Switch the image sprite frame per state
    SpriteChange,
}

/// Declarative state for a button widget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonData {
    /// Whether the button responds to input at all
    pub active: bool,
    /// The entity carrying the button's visual, if any
    #[serde(skip)]
    pub image_entity: Option<Entity>,
    /// Padding added to the hit area (left, top, right, bottom)
    pub hit_padding: Vec4,
    /// Visual feedback mode
    pub transition_mode: ButtonTransitionMode,
    /// Tint while hovered
    pub hover_tint: Color,
    /// Tint while pressed
    pub pressed_tint: Color,
    /// Tint while inactive
    pub inactive_tint: Color,
    /// Tint fade time in seconds (0 snaps instantly)
    pub fade_duration: f32,
    /// Sprite frame while hovered
    pub hover_sprite_frame: u32,
    /// Sprite frame while pressed
    pub pressed_sprite_frame: u32,
    /// Sprite frame while inactive
    pub inactive_sprite_frame: u32,
}

impl Default for ButtonData {
    fn default() -> Self {
        Self {
            active: true,
            image_entity: None,
            hit_padding: Vec4::ZERO,
            transition_mode: ButtonTransitionMode::Tint,
            hover_tint: Color::grey(0.75),
            pressed_tint: Color::grey(0.5),
            inactive_tint: Color::grey(0.25),
            fade_duration: 0.0,
            hover_sprite_frame: 0,
            pressed_sprite_frame: 0,
            inactive_sprite_frame: 0,
        }
    }
}

impl ButtonData {
    /// Tint for the given interaction state, `None` when the default visual
    /// should show.
    #[must_use]
    pub fn state_tint(&self, hovered: bool, pressed: bool) -> Option<Color> {
        if !self.active {
            return Some(self.inactive_tint);
        }
        if pressed {
            Some(self.pressed_tint)
        } else if hovered {
            Some(self.hover_tint)
        } else {
            None
        }
    }
}
