//! Texture loading
//!
//! Player frames load once at startup; each level's tileset atlas loads
//! with the level. A missing image logs a warning and falls back to a
//! generated placeholder texture so the game stays runnable with no art
//! on disk.

use macroquad::prelude::*;
use crate::game::player::{AnimationFrame, WALK_FRAMES};
use crate::map::{Level, TiledTileset};

/// Directory with the character frames
pub const PLAYER_IMAGE_DIR: &str = "assets/images/player";
/// Character frame filename prefix (Kenney's male adventurer)
pub const PLAYER_IMAGE_BASE: &str = "maleAdventurer";
/// Directory the map files (and their tileset images) live in
pub const MAPS_DIR: &str = "assets/maps";

async fn load_or_placeholder(path: &str, fallback: Color) -> Texture2D {
    match load_texture(path).await {
        Ok(texture) => {
            texture.set_filter(FilterMode::Nearest);
            texture
        }
        Err(e) => {
            warn!("Missing texture {}: {} - using placeholder", path, e);
            placeholder_texture(fallback)
        }
    }
}

/// A flat-colored stand-in for a missing image
fn placeholder_texture(color: Color) -> Texture2D {
    let image = Image::gen_image_color(2, 2, color);
    let texture = Texture2D::from_image(&image);
    texture.set_filter(FilterMode::Nearest);
    texture
}

/// Checkerboard stand-in for a missing tileset atlas, sized so every tile
/// samples a visible pattern
fn placeholder_atlas(layout: &AtlasLayout) -> Texture2D {
    let width = (layout.margin * 2.0
        + layout.columns as f32 * (layout.tile_width + layout.spacing)) as u16;
    let rows = layout.tile_count.div_ceil(layout.columns);
    let height =
        (layout.margin * 2.0 + rows as f32 * (layout.tile_height + layout.spacing)) as u16;
    let mut image = Image::gen_image_color(width.max(2), height.max(2), DARKPURPLE);
    for y in 0..image.height() as u32 {
        for x in 0..image.width() as u32 {
            if (x / 8 + y / 8) % 2 == 0 {
                image.set_pixel(x, y, PURPLE);
            }
        }
    }
    let texture = Texture2D::from_image(&image);
    texture.set_filter(FilterMode::Nearest);
    texture
}

/// All frames of the player character
pub struct PlayerTextures {
    pub idle: Texture2D,
    pub jump: Texture2D,
    pub fall: Texture2D,
    pub walk: Vec<Texture2D>,
    pub climb: [Texture2D; 2],
}

impl PlayerTextures {
    pub async fn load() -> Self {
        let base = format!("{}/{}", PLAYER_IMAGE_DIR, PLAYER_IMAGE_BASE);
        let mut walk = Vec::with_capacity(WALK_FRAMES);
        for i in 0..WALK_FRAMES {
            walk.push(load_or_placeholder(&format!("{}_walk{}.png", base, i), ORANGE).await);
        }
        Self {
            idle: load_or_placeholder(&format!("{}_idle.png", base), ORANGE).await,
            jump: load_or_placeholder(&format!("{}_jump.png", base), ORANGE).await,
            fall: load_or_placeholder(&format!("{}_fall.png", base), ORANGE).await,
            walk,
            climb: [
                load_or_placeholder(&format!("{}_climb0.png", base), ORANGE).await,
                load_or_placeholder(&format!("{}_climb1.png", base), ORANGE).await,
            ],
        }
    }

    /// The texture for an animation frame
    pub fn frame(&self, animation: AnimationFrame) -> &Texture2D {
        match animation {
            AnimationFrame::Idle => &self.idle,
            AnimationFrame::Jump => &self.jump,
            AnimationFrame::Fall => &self.fall,
            AnimationFrame::Walk(i) => &self.walk[i % self.walk.len()],
            AnimationFrame::Climb(i) => &self.climb[i % self.climb.len()],
        }
    }
}

/// Grid geometry of a tileset atlas, kept separate from the texture so the
/// source-rect math stays testable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasLayout {
    pub first_gid: u32,
    pub tile_width: f32,
    pub tile_height: f32,
    pub columns: u32,
    pub tile_count: u32,
    pub margin: f32,
    pub spacing: f32,
}

impl AtlasLayout {
    pub fn from_tileset(tileset: &TiledTileset) -> Self {
        Self {
            first_gid: tileset.firstgid,
            tile_width: tileset.tilewidth as f32,
            tile_height: tileset.tileheight as f32,
            columns: tileset.columns.max(1),
            tile_count: tileset.tilecount,
            margin: tileset.margin as f32,
            spacing: tileset.spacing as f32,
        }
    }

    pub fn contains(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid < self.first_gid + self.tile_count
    }

    /// Source rect of a GID within the atlas image
    pub fn source_rect(&self, gid: u32) -> Rect {
        let index = gid - self.first_gid;
        let col = (index % self.columns) as f32;
        let row = (index / self.columns) as f32;
        Rect::new(
            self.margin + col * (self.tile_width + self.spacing),
            self.margin + row * (self.tile_height + self.spacing),
            self.tile_width,
            self.tile_height,
        )
    }
}

/// A tileset atlas ready to draw from
pub struct TileAtlas {
    pub layout: AtlasLayout,
    pub texture: Texture2D,
}

impl TileAtlas {
    pub async fn load(tileset: &TiledTileset, maps_dir: &str) -> Self {
        let layout = AtlasLayout::from_tileset(tileset);
        let texture = match tileset.image.as_deref() {
            Some(image) => {
                let path = format!("{}/{}", maps_dir, image);
                match load_texture(&path).await {
                    Ok(texture) => {
                        texture.set_filter(FilterMode::Nearest);
                        texture
                    }
                    Err(e) => {
                        warn!("Missing tileset image {}: {} - using placeholder", path, e);
                        placeholder_atlas(&layout)
                    }
                }
            }
            None => placeholder_atlas(&layout),
        };
        Self { layout, texture }
    }

    pub fn draw_tile(&self, gid: u32, dest: Rect) {
        draw_texture_ex(
            &self.texture,
            dest.x,
            dest.y,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(dest.w, dest.h)),
                source: Some(self.layout.source_rect(gid)),
                ..Default::default()
            },
        );
    }
}

/// The atlases for one loaded level
pub struct LevelAssets {
    pub atlases: Vec<TileAtlas>,
}

impl LevelAssets {
    pub async fn load(level: &Level) -> Self {
        let mut atlases = Vec::new();
        for tileset in &level.tilesets {
            atlases.push(TileAtlas::load(tileset, MAPS_DIR).await);
        }
        Self { atlases }
    }

    /// Draw a tile by GID through whichever atlas owns it
    pub fn draw_tile(&self, gid: u32, dest: Rect) {
        if let Some(atlas) = self.atlases.iter().find(|a| a.layout.contains(gid)) {
            atlas.draw_tile(gid, dest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> AtlasLayout {
        AtlasLayout {
            first_gid: 1,
            tile_width: 128.0,
            tile_height: 128.0,
            columns: 4,
            tile_count: 8,
            margin: 0.0,
            spacing: 0.0,
        }
    }

    #[test]
    fn test_source_rect_grid() {
        let layout = layout();
        assert_eq!(layout.source_rect(1), Rect::new(0.0, 0.0, 128.0, 128.0));
        assert_eq!(layout.source_rect(4), Rect::new(384.0, 0.0, 128.0, 128.0));
        // Second row
        assert_eq!(layout.source_rect(5), Rect::new(0.0, 128.0, 128.0, 128.0));
    }

    #[test]
    fn test_source_rect_with_margin_and_spacing() {
        let mut layout = layout();
        layout.margin = 2.0;
        layout.spacing = 4.0;
        assert_eq!(layout.source_rect(1), Rect::new(2.0, 2.0, 128.0, 128.0));
        assert_eq!(layout.source_rect(2), Rect::new(134.0, 2.0, 128.0, 128.0));
        assert_eq!(layout.source_rect(5), Rect::new(2.0, 134.0, 128.0, 128.0));
    }

    #[test]
    fn test_gid_range() {
        let layout = layout();
        assert!(!layout.contains(0));
        assert!(layout.contains(1));
        assert!(layout.contains(8));
        assert!(!layout.contains(9));
    }
}
