//! Application state
//!
//! Owns everything that outlives a single level (config, input, global
//! textures, sounds, the light layer) plus the current level's GameState,
//! and wires the frame steps together: input → update → draw.
//!
//! Level loads are async (textures come through the engine's loader), so a
//! finished level only records the next index; `process_pending_level`
//! performs the load between frames.

use macroquad::prelude::*;
use crate::assets::{LevelAssets, PlayerTextures, MAPS_DIR};
use crate::audio::SoundBank;
use crate::config::GameConfig;
use crate::game::{scene, GameState};
use crate::input::{Action, InputState};
use crate::lighting::{Light, LightLayer, LightMode};
use crate::map::{builtin_level, load_level};

pub struct AppState {
    pub config: GameConfig,
    pub input: InputState,
    pub player_textures: PlayerTextures,
    pub sounds: SoundBank,
    pub lights: LightLayer,
    /// Is the player's light on? (SPACE toggles)
    pub light_enabled: bool,
    pub game: GameState,
    pub level_assets: LevelAssets,
    pending_level: Option<u32>,
}

impl AppState {
    pub async fn new(config: GameConfig) -> Self {
        let player_textures = PlayerTextures::load().await;
        let sounds = SoundBank::load().await;
        let [r, g, b] = config.lighting.ambient;
        let lights = LightLayer::new(
            config.window.width as u32,
            config.window.height as u32,
            Color::from_rgba(r, g, b, 255),
        );
        let (game, level_assets) =
            Self::load_level_state(&config, config.rules.starting_level).await;

        Self {
            config,
            input: InputState::new(),
            player_textures,
            sounds,
            lights,
            light_enabled: false,
            game,
            level_assets,
            pending_level: None,
        }
    }

    /// Load a level by index, falling back to the built-in level when the
    /// map file is missing or broken
    async fn load_level_state(config: &GameConfig, index: u32) -> (GameState, LevelAssets) {
        let path = format!("{}/level_{}.json", MAPS_DIR, index);
        let level = match load_string(&path).await {
            Ok(json) => match load_level(&path, &json, &config.tiles) {
                Ok(level) => level,
                Err(e) => {
                    error!("Failed to load map {}: {} - using the built-in level", path, e);
                    builtin_level(&config.tiles)
                }
            },
            Err(e) => {
                warn!("Map file {} unavailable ({}) - using the built-in level", path, e);
                builtin_level(&config.tiles)
            }
        };
        let assets = LevelAssets::load(&level).await;
        (GameState::new(config, level, index), assets)
    }

    /// Perform a deferred level load, if the last update finished a level
    pub async fn process_pending_level(&mut self) {
        if let Some(index) = self.pending_level.take() {
            info!(
                "Level {} complete, loading level {}",
                self.game.level_index, index
            );
            let (game, level_assets) = Self::load_level_state(&self.config, index).await;
            self.game = game;
            self.level_assets = level_assets;
        }
    }

    /// Edge-triggered actions
    pub fn handle_input(&mut self) {
        if self.input.action_pressed(Action::ToggleLight) {
            self.light_enabled = !self.light_enabled;
        }
    }

    /// Movement and game logic, running every frame
    pub fn update(&mut self, dt: f32) {
        let intent = self.input.move_intent();
        let skip = self.input.action_pressed(Action::SkipLevel);

        if let Some(next) = self.game.update(intent, skip, dt, &self.config) {
            self.pending_level = Some(next);
        }

        // The player's light follows the player; an off light is simply
        // not in the layer
        self.lights.lights.clear();
        if self.light_enabled {
            self.lights.lights.push(Light {
                position: self.game.player.body.position,
                radius: self.config.lighting.player_light_radius,
                color: WHITE,
                mode: if self.config.lighting.soft {
                    LightMode::Soft
                } else {
                    LightMode::Hard
                },
            });
        }

        self.sounds.play_for_events(&self.game.events);
        self.game.events.clear_all();
    }

    /// Clears and re-renders the scene every frame
    pub fn draw(&mut self) {
        let [r, g, b, a] = self.config.window.background;
        let clear = self
            .game
            .level
            .background_color
            .unwrap_or(Color::from_rgba(r, g, b, a));

        self.lights.begin(&self.game.camera, clear);
        scene::draw_scene(
            &self.game.level,
            &self.level_assets,
            &self.game.player,
            &self.player_textures,
            self.game.camera.view_rect(),
        );
        self.lights.finish(&self.game.camera);

        self.game.draw_hud(&self.config);
    }
}
