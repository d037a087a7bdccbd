//! Sam's Platformer
//!
//! A tile-map platformer on macroquad: Tiled JSON levels, coins, ladders,
//! moving platforms, a follow camera and a toggleable character light.
//! Collect the level's diamonds to move on to the next map.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod assets;
mod audio;
mod config;
mod game;
mod input;
mod lighting;
mod map;

use macroquad::prelude::*;
use app::AppState;
use config::{GameConfig, CONFIG_PATH};

fn window_conf() -> Conf {
    // The window is created before main runs, so the config loads here too;
    // a broken file falls back to defaults and main reports the error
    let config = GameConfig::load(CONFIG_PATH).unwrap_or_default();
    Conf {
        window_title: format!("{} v{}", config.window.title, VERSION),
        window_width: config.window.width,
        window_height: config.window.height,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let config = match GameConfig::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            error!("Ignoring config {}: {}", CONFIG_PATH, e);
            GameConfig::default()
        }
    };

    let mut app = AppState::new(config).await;

    loop {
        app.process_pending_level().await;
        app.handle_input();
        app.update(get_frame_time());
        app.draw();
        next_frame().await;
    }
}
