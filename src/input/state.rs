//! Input state management
//!
//! Polls macroquad's keyboard state through an action-based API.
//! Both arrow keys and WASD drive movement.

use macroquad::prelude::*;
use crate::game::MoveIntent;
use super::Action;

pub struct InputState;

impl InputState {
    pub fn new() -> Self {
        Self
    }

    /// Check if action is currently held down
    pub fn action_down(&self, action: Action) -> bool {
        match action {
            Action::MoveUp => is_key_down(KeyCode::Up) || is_key_down(KeyCode::W),
            Action::MoveDown => is_key_down(KeyCode::Down) || is_key_down(KeyCode::S),
            Action::MoveLeft => is_key_down(KeyCode::Left) || is_key_down(KeyCode::A),
            Action::MoveRight => is_key_down(KeyCode::Right) || is_key_down(KeyCode::D),
            Action::ToggleLight => is_key_down(KeyCode::Space),
            Action::SkipLevel => {
                is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift)
            }
        }
    }

    /// Check if action was just pressed this frame
    pub fn action_pressed(&self, action: Action) -> bool {
        match action {
            Action::MoveUp => is_key_pressed(KeyCode::Up) || is_key_pressed(KeyCode::W),
            Action::MoveDown => is_key_pressed(KeyCode::Down) || is_key_pressed(KeyCode::S),
            Action::MoveLeft => is_key_pressed(KeyCode::Left) || is_key_pressed(KeyCode::A),
            Action::MoveRight => is_key_pressed(KeyCode::Right) || is_key_pressed(KeyCode::D),
            Action::ToggleLight => is_key_pressed(KeyCode::Space),
            Action::SkipLevel => {
                is_key_pressed(KeyCode::LeftShift) || is_key_pressed(KeyCode::RightShift)
            }
        }
    }

    /// The held movement keys as one snapshot for the player systems
    pub fn move_intent(&self) -> MoveIntent {
        MoveIntent {
            up: self.action_down(Action::MoveUp),
            down: self.action_down(Action::MoveDown),
            left: self.action_down(Action::MoveLeft),
            right: self.action_down(Action::MoveRight),
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
