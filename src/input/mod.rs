//! Input handling
//!
//! Action-based keyboard input: game code asks about actions, not keys,
//! so the bindings live in one place.

mod actions;
mod state;

pub use actions::Action;
pub use state::InputState;
