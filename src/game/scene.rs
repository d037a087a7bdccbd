//! Scene rendering
//!
//! Draws the level's tile layers in authored order with the dynamic
//! sprites (moving platforms, coins, player) slotted in just before the
//! Foreground layer, so foreground tiles overlap the player. Tiles outside
//! the view are culled by index range.

use macroquad::prelude::*;
use crate::assets::{LevelAssets, PlayerTextures};
use crate::map::{layer_names, Level, TileLayer};
use super::player::PlayerCharacter;

/// Draw the whole scene with the world camera already set
pub fn draw_scene(
    level: &Level,
    assets: &LevelAssets,
    player: &PlayerCharacter,
    player_textures: &PlayerTextures,
    view: Rect,
) {
    let mut sprites_drawn = false;
    for layer in &level.layers {
        if layer.name == layer_names::FOREGROUND && !sprites_drawn {
            draw_sprites(level, assets, player, player_textures);
            sprites_drawn = true;
        }
        draw_tile_layer(layer, level, assets, view);
    }
    if !sprites_drawn {
        draw_sprites(level, assets, player, player_textures);
    }
}

fn draw_tile_layer(layer: &TileLayer, level: &Level, assets: &LevelAssets, view: Rect) {
    let ts = level.tile_size;
    let x0 = ((view.x / ts).floor().max(0.0)) as usize;
    let y0 = ((view.y / ts).floor().max(0.0)) as usize;
    let x1 = (((view.x + view.w) / ts).ceil().max(0.0) as usize).min(layer.width);
    let y1 = (((view.y + view.h) / ts).ceil().max(0.0) as usize).min(layer.height);

    for ty in y0..y1 {
        for tx in x0..x1 {
            let gid = layer.gid_at(tx, ty);
            if gid == 0 {
                continue;
            }
            assets.draw_tile(gid, Rect::new(tx as f32 * ts, ty as f32 * ts, ts, ts));
        }
    }
}

fn draw_sprites(
    level: &Level,
    assets: &LevelAssets,
    player: &PlayerCharacter,
    player_textures: &PlayerTextures,
) {
    for platform in &level.moving_platforms {
        if let Some(gid) = platform.gid {
            assets.draw_tile(gid, platform.rect);
        }
    }

    for coin in &level.coins {
        assets.draw_tile(coin.gid, coin.rect);
    }

    draw_player(player, player_textures);
}

fn draw_player(player: &PlayerCharacter, textures: &PlayerTextures) {
    let texture = textures.frame(player.animation());
    let rect = player.body.rect();
    draw_texture_ex(
        texture,
        rect.x,
        rect.y,
        WHITE,
        DrawTextureParams {
            dest_size: Some(vec2(rect.w, rect.h)),
            flip_x: player.flip_x(),
            ..Default::default()
        },
    );
}
