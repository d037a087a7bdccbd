//! Game action definitions

/// All game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Movement (held - arrows / WASD)
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,

    // Toggles (edge-triggered)
    ToggleLight,

    // Debug: count the level as finished
    SkipLevel,
}
