//! Sound effects
//!
//! Loads the two effect sounds once at startup and plays them in response
//! to the frame's queued events. A missing sound file logs a warning and
//! that effect stays silent.

use macroquad::audio::{load_sound, play_sound_once, Sound};
use macroquad::prelude::*;
use crate::game::Events;

pub const COIN_SOUND_PATH: &str = "assets/sounds/coin1.wav";
pub const JUMP_SOUND_PATH: &str = "assets/sounds/jump1.wav";

async fn load_optional(path: &str) -> Option<Sound> {
    match load_sound(path).await {
        Ok(sound) => Some(sound),
        Err(e) => {
            warn!("Missing sound {}: {} - staying silent", path, e);
            None
        }
    }
}

fn play(sound: &Option<Sound>) {
    if let Some(sound) = sound {
        play_sound_once(sound);
    }
}

pub struct SoundBank {
    collect_coin: Option<Sound>,
    jump: Option<Sound>,
}

impl SoundBank {
    pub async fn load() -> Self {
        Self {
            collect_coin: load_optional(COIN_SOUND_PATH).await,
            jump: load_optional(JUMP_SOUND_PATH).await,
        }
    }

    /// Play sounds for this frame's events. Call after update, before the
    /// queues are cleared.
    pub fn play_for_events(&self, events: &Events) {
        for _ in events.jumped.iter() {
            play(&self.jump);
        }
        for _ in events.coin_collected.iter() {
            play(&self.collect_coin);
        }
    }
}
