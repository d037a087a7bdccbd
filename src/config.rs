//! Game configuration
//!
//! Uses RON (Rusty Object Notation) for a human-editable tuning file.
//! Every field has a default matching the shipped game, so a partial (or
//! missing) config file is fine: unset fields keep their defaults.
//!
//! Movement values are in pixels per frame at the 60 Hz reference rate;
//! the physics step rescales them by the real frame time.

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};

/// Default location of the config file, relative to the working directory
pub const CONFIG_PATH: &str = "assets/config.ron";

/// Error type for config loading
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    ValidationError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::ParseError(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(e) => write!(f, "Parse error: {}", e),
            ConfigError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

/// Window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: i32,
    pub height: i32,
    pub title: String,
    /// Window clear color, used until a map supplies its own background
    pub background: [u8; 4],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            title: "Sam's Platformer".to_string(),
            background: [255, 255, 240, 255], // ivory
        }
    }
}

/// Player tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal (and ladder) speed, px/frame
    pub movement_speed: f32,
    /// Initial upward speed of a jump, px/frame
    pub jump_speed: f32,
    /// Sprite scale factor
    pub scaling: f32,
    /// Fallback spawn X when the map has no Player spawn object
    pub spawn_x: f32,
    /// Fallback spawn height above the bottom edge of the map
    pub spawn_height: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            movement_speed: 5.0,
            jump_speed: 20.0,
            scaling: 0.8,
            spawn_x: 64.0,
            spawn_height: 128.0,
        }
    }
}

/// Physics tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration, px/frame^2
    pub gravity: f32,
    /// Max fall speed, px/frame
    pub terminal_velocity: f32,
    /// How far below the feet the ground probe reaches for jumps, px
    pub jump_probe: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 1.0,
            terminal_velocity: 30.0,
            jump_probe: 10.0,
        }
    }
}

/// Sprite scaling for map content
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    pub tile_scaling: f32,
    pub coin_scaling: f32,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            tile_scaling: 0.5,
            coin_scaling: 0.5,
        }
    }
}

/// Level progression rules
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Coins needed to finish a level
    pub coins_per_level: u32,
    pub starting_level: u32,
    /// Number of bundled map files (level_1.json .. level_N.json)
    pub level_count: u32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            coins_per_level: 3,
            starting_level: 1,
            level_count: 2,
        }
    }
}

/// Light layer tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Light level of unlit areas
    pub ambient: [u8; 3],
    pub player_light_radius: f32,
    /// Soft (smooth falloff) vs hard (sharp-edged) player light
    pub soft: bool,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient: [10, 10, 10],
            player_light_radius: 150.0,
            soft: true,
        }
    }
}

/// Top-level game configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub player: PlayerConfig,
    pub physics: PhysicsConfig,
    pub tiles: TileConfig,
    pub rules: RuleConfig,
    pub lighting: LightingConfig,
}

impl GameConfig {
    /// Load a config file, or return defaults when the file does not exist.
    /// A file that exists but fails to parse is an error: silently ignoring
    /// a broken config hides typos from the person tuning the game.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<GameConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(GameConfig::default());
        }
        let text = fs::read_to_string(path)?;
        let config: GameConfig = ron::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width <= 0 || self.window.height <= 0 {
            return Err(ConfigError::ValidationError(format!(
                "window size must be positive, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.tiles.tile_scaling <= 0.0 || self.player.scaling <= 0.0 {
            return Err(ConfigError::ValidationError(
                "scaling factors must be positive".to_string(),
            ));
        }
        if self.rules.level_count == 0 || self.rules.starting_level == 0 {
            return Err(ConfigError::ValidationError(
                "level numbers are 1-based and level_count must be at least 1".to_string(),
            ));
        }
        if !self.physics.gravity.is_finite() || self.physics.gravity < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "gravity must be a non-negative number, got {}",
                self.physics.gravity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_tuning() {
        let config = GameConfig::default();
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 480);
        assert_eq!(config.player.movement_speed, 5.0);
        assert_eq!(config.player.jump_speed, 20.0);
        assert_eq!(config.physics.gravity, 1.0);
        assert_eq!(config.rules.coins_per_level, 3);
        assert_eq!(config.lighting.ambient, [10, 10, 10]);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: GameConfig = ron::from_str("(player: (jump_speed: 25.0))").unwrap();
        assert_eq!(config.player.jump_speed, 25.0);
        // Untouched sections keep their defaults
        assert_eq!(config.player.movement_speed, 5.0);
        assert_eq!(config.window.title, "Sam's Platformer");
    }

    #[test]
    fn test_missing_file_is_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig::load(dir.path().join("nope.ron")).unwrap();
        assert_eq!(config.rules.starting_level, 1);
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ron");

        let mut config = GameConfig::default();
        config.rules.coins_per_level = 5;
        let text = ron::ser::to_string_pretty(&config, Default::default()).unwrap();
        std::fs::write(&path, text).unwrap();

        let loaded = GameConfig::load(&path).unwrap();
        assert_eq!(loaded.rules.coins_per_level, 5);
    }

    #[test]
    fn test_broken_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ron");
        std::fs::write(&path, "(window: (width: \"wide\"))").unwrap();
        assert!(matches!(
            GameConfig::load(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_validation_rejects_zero_levels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ron");
        std::fs::write(&path, "(rules: (level_count: 0))").unwrap();
        assert!(matches!(
            GameConfig::load(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
