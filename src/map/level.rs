//! Runtime level geometry
//!
//! Built once per level from a parsed Tiled map: tile layers kept in
//! authored draw order, boolean collision grids for the physics step, coins
//! and moving platforms lifted out of their layers as live sprites, and the
//! player spawn point.
//!
//! All positions are in scaled world pixels, y growing downward (screen
//! convention, matching the map editor).

use macroquad::prelude::{vec2, Color, Rect, Vec2};
use crate::config::TileConfig;
use super::tiled::{parse_map, LayerKind, MapError, TiledMap, TiledTileset};

/// Layer names the game looks for in a map
pub mod layer_names {
    pub const BACKGROUND: &str = "Background";
    pub const PLATFORMS: &str = "Platforms";
    pub const MOVING_PLATFORMS: &str = "Moving Platforms";
    pub const COINS: &str = "Coins";
    pub const LADDERS: &str = "Ladders";
    pub const DANGERS: &str = "Dangers";
    pub const FOREGROUND: &str = "Foreground";
    pub const PLAYER: &str = "Player";
}

/// GIDs used by the bundled tileset (and the built-in fallback level)
#[allow(dead_code)]
pub mod gids {
    pub const GRASS: u32 = 1;
    pub const CRATE: u32 = 2;
    pub const COIN: u32 = 3;
    pub const LADDER: u32 = 4;
    pub const SPIKE: u32 = 5;
    pub const PLATFORM: u32 = 6;
}

/// A drawable tile layer (GIDs in row-major order)
#[derive(Debug, Clone)]
pub struct TileLayer {
    pub name: String,
    pub width: usize,
    pub height: usize,
    pub gids: Vec<u32>,
}

impl TileLayer {
    pub fn gid_at(&self, x: usize, y: usize) -> u32 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.gids[y * self.width + x]
    }
}

/// A boolean tile grid used for collision queries.
///
/// Overlap tests are strict: a rect exactly touching a tile edge does not
/// count as overlapping, so a body resting flush against geometry is stable.
#[derive(Debug, Clone)]
pub struct CollisionGrid {
    pub width: usize,
    pub height: usize,
    pub tile_size: f32,
    cells: Vec<bool>,
}

impl CollisionGrid {
    pub fn empty(width: usize, height: usize, tile_size: f32) -> Self {
        Self {
            width,
            height,
            tile_size,
            cells: vec![false; width * height],
        }
    }

    pub fn from_gids(gids: &[u32], width: usize, height: usize, tile_size: f32) -> Self {
        Self {
            width,
            height,
            tile_size,
            cells: gids.iter().map(|&gid| gid != 0).collect(),
        }
    }

    #[allow(dead_code)]
    pub fn set(&mut self, x: usize, y: usize, solid: bool) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = solid;
        }
    }

    /// Out-of-range tiles are open (falling off the map is handled by the
    /// respawn check, not by invisible walls)
    pub fn solid_at_tile(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        self.cells[y as usize * self.width + x as usize]
    }

    /// World-space rect of a tile cell
    pub fn tile_rect(&self, x: i32, y: i32) -> Rect {
        Rect::new(
            x as f32 * self.tile_size,
            y as f32 * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }

    /// Tile index range strictly overlapped by a world-space span
    fn tile_span(&self, start: f32, end: f32) -> (i32, i32) {
        let first = (start / self.tile_size).floor() as i32;
        let last = (end / self.tile_size).ceil() as i32 - 1;
        (first, last)
    }

    /// Does the rect strictly overlap any solid tile?
    pub fn overlaps(&self, rect: Rect) -> bool {
        let (x0, x1) = self.tile_span(rect.x, rect.x + rect.w);
        let (y0, y1) = self.tile_span(rect.y, rect.y + rect.h);
        for ty in y0..=y1 {
            for tx in x0..=x1 {
                if self.solid_at_tile(tx, ty) {
                    return true;
                }
            }
        }
        false
    }

    /// Solid tile rects strictly overlapping the given rect
    pub fn overlapping_tiles(&self, rect: Rect) -> Vec<Rect> {
        let (x0, x1) = self.tile_span(rect.x, rect.x + rect.w);
        let (y0, y1) = self.tile_span(rect.y, rect.y + rect.h);
        let mut tiles = Vec::new();
        for ty in y0..=y1 {
            for tx in x0..=x1 {
                if self.solid_at_tile(tx, ty) {
                    tiles.push(self.tile_rect(tx, ty));
                }
            }
        }
        tiles
    }
}

/// A collectible coin
#[derive(Debug, Clone)]
pub struct Coin {
    pub rect: Rect,
    pub gid: u32,
}

/// A platform that patrols between boundaries, carrying the player
#[derive(Debug, Clone)]
pub struct MovingPlatform {
    pub rect: Rect,
    pub gid: Option<u32>,
    /// px/frame, same units as player movement
    pub velocity: Vec2,
    pub boundary_left: Option<f32>,
    pub boundary_right: Option<f32>,
    pub boundary_top: Option<f32>,
    pub boundary_bottom: Option<f32>,
}

/// A fully-built level
#[derive(Debug, Clone)]
pub struct Level {
    pub name: String,
    pub tile_size: f32,
    pub width: usize,
    pub height: usize,
    pub background_color: Option<Color>,
    /// Tile layers in authored draw order
    pub layers: Vec<TileLayer>,
    pub solids: CollisionGrid,
    pub ladders: CollisionGrid,
    pub dangers: CollisionGrid,
    pub coins: Vec<Coin>,
    pub moving_platforms: Vec<MovingPlatform>,
    /// Spawn point from the map's Player layer, if authored
    pub spawn: Option<Vec2>,
    /// Tileset descriptions for atlas building and source-rect lookup
    pub tilesets: Vec<TiledTileset>,
}

impl Level {
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * self.tile_size
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.pixel_width(), self.pixel_height())
    }

    /// Build a level from a parsed map.
    ///
    /// The Platforms layer is required; everything else is optional.
    pub fn from_map(map: &TiledMap, name: &str, tiles: &TileConfig) -> Result<Level, MapError> {
        let scale = tiles.tile_scaling;
        let tile_size = map.tilewidth as f32 * scale;
        let width = map.width as usize;
        let height = map.height as usize;

        if map.layer(layer_names::PLATFORMS).is_none() {
            return Err(MapError::ValidationError(format!(
                "map '{}' has no '{}' layer",
                name,
                layer_names::PLATFORMS
            )));
        }

        let mut layers = Vec::new();
        let mut solids = CollisionGrid::empty(width, height, tile_size);
        let mut ladders = CollisionGrid::empty(width, height, tile_size);
        let mut dangers = CollisionGrid::empty(width, height, tile_size);
        let mut coins = Vec::new();
        let mut moving_platforms = Vec::new();
        let mut spawn = None;

        let coin_size = map.tilewidth as f32 * tiles.coin_scaling;

        for layer in &map.layers {
            match layer.kind() {
                LayerKind::Tiles => {
                    let layer_gids = layer.gids()?;
                    if let Some(&bad) = layer_gids
                        .iter()
                        .find(|&&gid| gid != 0 && !map.tilesets.iter().any(|ts| ts.contains(gid)))
                    {
                        return Err(MapError::ValidationError(format!(
                            "layer '{}' references gid {} outside every tileset",
                            layer.name, bad
                        )));
                    }
                    match layer.name.as_str() {
                        layer_names::PLATFORMS => {
                            solids = CollisionGrid::from_gids(&layer_gids, width, height, tile_size);
                        }
                        layer_names::LADDERS => {
                            ladders =
                                CollisionGrid::from_gids(&layer_gids, width, height, tile_size);
                        }
                        layer_names::DANGERS => {
                            dangers =
                                CollisionGrid::from_gids(&layer_gids, width, height, tile_size);
                        }
                        layer_names::COINS => {
                            // Coins leave the draw layers; they live as
                            // removable sprites instead
                            for (i, &gid) in layer_gids.iter().enumerate() {
                                if gid == 0 {
                                    continue;
                                }
                                let tx = (i % width) as f32;
                                let ty = (i / width) as f32;
                                let cell = Rect::new(
                                    tx * tile_size,
                                    ty * tile_size,
                                    tile_size,
                                    tile_size,
                                );
                                coins.push(Coin {
                                    rect: Rect::new(
                                        cell.x + (cell.w - coin_size) / 2.0,
                                        cell.y + (cell.h - coin_size) / 2.0,
                                        coin_size,
                                        coin_size,
                                    ),
                                    gid,
                                });
                            }
                            continue;
                        }
                        _ => {}
                    }
                    if layer.visible {
                        layers.push(TileLayer {
                            name: layer.name.clone(),
                            width,
                            height,
                            gids: layer_gids,
                        });
                    }
                }
                LayerKind::Objects => match layer.name.as_str() {
                    layer_names::MOVING_PLATFORMS => {
                        for object in &layer.objects {
                            // Tile objects anchor at their bottom-left corner
                            let rect = Rect::new(
                                object.x * scale,
                                (object.y - object.height) * scale,
                                object.width * scale,
                                object.height * scale,
                            );
                            moving_platforms.push(MovingPlatform {
                                rect,
                                gid: object.gid,
                                velocity: vec2(
                                    object.property_f32("change_x").unwrap_or(0.0),
                                    // Map-author convention is y-up; world is y-down
                                    -object.property_f32("change_y").unwrap_or(0.0),
                                ),
                                boundary_left: object.property_f32("boundary_left").map(|v| v * scale),
                                boundary_right: object.property_f32("boundary_right").map(|v| v * scale),
                                boundary_top: object.property_f32("boundary_top").map(|v| v * scale),
                                boundary_bottom: object.property_f32("boundary_bottom").map(|v| v * scale),
                            });
                        }
                    }
                    layer_names::PLAYER => {
                        if let Some(object) = layer.objects.first() {
                            let center = if object.gid.is_some() {
                                vec2(
                                    object.x + object.width / 2.0,
                                    object.y - object.height / 2.0,
                                )
                            } else {
                                vec2(object.x, object.y)
                            };
                            spawn = Some(center * scale);
                        }
                    }
                    _ => {}
                },
                LayerKind::Other => {}
            }
        }

        Ok(Level {
            name: name.to_string(),
            tile_size,
            width,
            height,
            background_color: map.background_color(),
            layers,
            solids,
            ladders,
            dangers,
            coins,
            moving_platforms,
            spawn,
            tilesets: map.tilesets.clone(),
        })
    }
}

/// Load and build a level from a Tiled JSON file
pub fn load_level(path: &str, json: &str, tiles: &TileConfig) -> Result<Level, MapError> {
    let map = parse_map(json)?;
    Level::from_map(&map, path, tiles)
}

/// The hand-placed level from the first tutorial iteration: a grass floor,
/// a few crate boxes, and three coins. Used when no map file can be loaded.
pub fn builtin_level(tiles: &TileConfig) -> Level {
    const WIDTH: usize = 20;
    const HEIGHT: usize = 15;
    let tile_size = 128.0 * tiles.tile_scaling;

    let mut platform_gids = vec![0u32; WIDTH * HEIGHT];
    // Ground row along the bottom
    for x in 0..WIDTH {
        platform_gids[(HEIGHT - 1) * WIDTH + x] = gids::GRASS;
    }
    // Crate boxes (columns, rows from the original coordinate list)
    for &(x, y) in &[
        (8, 13),
        (4, 13),
        (12, 13),
        (9, 11),
        (10, 11),
        (11, 11),
        (12, 11),
    ] {
        platform_gids[y * WIDTH + x] = gids::CRATE;
    }

    let solids = CollisionGrid::from_gids(&platform_gids, WIDTH, HEIGHT, tile_size);
    let coin_size = 128.0 * tiles.coin_scaling;
    let coins = [(5usize, 12usize), (10, 10), (15, 13)]
        .iter()
        .map(|&(tx, ty)| {
            let cell = Rect::new(
                tx as f32 * tile_size,
                ty as f32 * tile_size,
                tile_size,
                tile_size,
            );
            Coin {
                rect: Rect::new(
                    cell.x + (cell.w - coin_size) / 2.0,
                    cell.y + (cell.h - coin_size) / 2.0,
                    coin_size,
                    coin_size,
                ),
                gid: gids::COIN,
            }
        })
        .collect();

    Level {
        name: "builtin".to_string(),
        tile_size,
        width: WIDTH,
        height: HEIGHT,
        background_color: None,
        layers: vec![TileLayer {
            name: layer_names::PLATFORMS.to_string(),
            width: WIDTH,
            height: HEIGHT,
            gids: platform_gids,
        }],
        ladders: CollisionGrid::empty(WIDTH, HEIGHT, tile_size),
        dangers: CollisionGrid::empty(WIDTH, HEIGHT, tile_size),
        solids,
        coins,
        moving_platforms: Vec::new(),
        spawn: None,
        tilesets: vec![TiledTileset {
            firstgid: 1,
            name: "tiles".to_string(),
            image: Some("tiles.png".to_string()),
            source: None,
            tilewidth: 128,
            tileheight: 128,
            tilecount: 8,
            columns: 4,
            margin: 0,
            spacing: 0,
        }],
    }
}
