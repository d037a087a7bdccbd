//! Tile-map loading
//!
//! `tiled` is the serde model of the Tiled editor's JSON export (the
//! engine-standard map format); `level` turns a parsed map into the game's
//! runtime geometry: draw layers, collision grids, coins, moving platforms.

mod tiled;
mod level;

pub use tiled::{
    TiledMap, TiledLayer, TiledObject, TiledTileset, LayerKind, MapError, parse_map,
};
pub use level::{
    Level, TileLayer, CollisionGrid, Coin, MovingPlatform, layer_names, load_level, builtin_level,
};
