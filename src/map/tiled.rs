//! Tiled JSON map model
//!
//! serde structs for the subset of the Tiled JSON export this game uses:
//! fixed-size orthogonal maps, embedded single-image tilesets, tile layers
//! (raw GID arrays or uncompressed base64) and object groups.
//!
//! Tile GIDs carry flip/rotation flags in the top bits; they are masked off
//! on decode since the game never places flipped tiles.

use base64::Engine;
use macroquad::prelude::Color;
use serde::{Serialize, Deserialize};

/// Bits 28-31 of a GID encode horizontal/vertical/diagonal flips and
/// hex rotation.
pub const GID_FLAG_MASK: u32 = 0xF000_0000;

/// Validation limits to keep a malformed map from exhausting memory
pub mod limits {
    /// Maximum map dimension (width or height) in tiles
    pub const MAX_MAP_SIZE: u32 = 1024;
    /// Maximum tile dimension in pixels
    pub const MAX_TILE_SIZE: u32 = 512;
    /// Maximum number of layers
    pub const MAX_LAYERS: usize = 32;
    /// Maximum number of objects in one object group
    pub const MAX_OBJECTS: usize = 1024;
    /// Maximum number of tilesets
    pub const MAX_TILESETS: usize = 8;
}

/// Error type for map loading
#[derive(Debug)]
pub enum MapError {
    IoError(std::io::Error),
    ParseError(serde_json::Error),
    DecodeError(String),
    ValidationError(String),
}

impl From<std::io::Error> for MapError {
    fn from(e: std::io::Error) -> Self {
        MapError::IoError(e)
    }
}

impl From<serde_json::Error> for MapError {
    fn from(e: serde_json::Error) -> Self {
        MapError::ParseError(e)
    }
}

impl From<base64::DecodeError> for MapError {
    fn from(e: base64::DecodeError) -> Self {
        MapError::DecodeError(format!("bad base64 tile data: {}", e))
    }
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::IoError(e) => write!(f, "IO error: {}", e),
            MapError::ParseError(e) => write!(f, "Parse error: {}", e),
            MapError::DecodeError(e) => write!(f, "Decode error: {}", e),
            MapError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

/// A custom property on a layer or object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiledProperty {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub value: serde_json::Value,
}

/// An object in an object group. Tile objects (those with a `gid`) are
/// anchored at their bottom-left corner in Tiled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiledObject {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub gid: Option<u32>,
    #[serde(default)]
    pub properties: Vec<TiledProperty>,
}

impl TiledObject {
    pub fn property_f32(&self, name: &str) -> Option<f32> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.value.as_f64())
            .map(|v| v as f32)
    }
}

/// Tile layer data: either a plain GID array or a base64 string
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayerData {
    Gids(Vec<u32>),
    Encoded(String),
}

/// The layer kinds this game understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Tiles,
    Objects,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiledLayer {
    pub name: String,
    #[serde(rename = "type")]
    pub layer_type: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub data: Option<LayerData>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub compression: Option<String>,
    #[serde(default)]
    pub objects: Vec<TiledObject>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

impl TiledLayer {
    pub fn kind(&self) -> LayerKind {
        match self.layer_type.as_str() {
            "tilelayer" => LayerKind::Tiles,
            "objectgroup" => LayerKind::Objects,
            _ => LayerKind::Other,
        }
    }

    /// Decode this tile layer's GIDs with flip flags masked off.
    /// Row-major, `width * height` entries, 0 meaning "no tile".
    pub fn gids(&self) -> Result<Vec<u32>, MapError> {
        let data = self.data.as_ref().ok_or_else(|| {
            MapError::ValidationError(format!("tile layer '{}' has no data", self.name))
        })?;

        let raw = match data {
            LayerData::Gids(gids) => gids.clone(),
            LayerData::Encoded(text) => {
                if let Some(compression) = self.compression.as_deref() {
                    if !compression.is_empty() {
                        return Err(MapError::DecodeError(format!(
                            "layer '{}' uses unsupported compression '{}'",
                            self.name, compression
                        )));
                    }
                }
                let bytes =
                    base64::engine::general_purpose::STANDARD.decode(text.trim().as_bytes())?;
                if bytes.len() % 4 != 0 {
                    return Err(MapError::DecodeError(format!(
                        "layer '{}' tile data length {} is not a multiple of 4",
                        self.name,
                        bytes.len()
                    )));
                }
                bytes
                    .chunks_exact(4)
                    .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                    .collect()
            }
        };

        let expected = (self.width as usize) * (self.height as usize);
        if raw.len() != expected {
            return Err(MapError::ValidationError(format!(
                "layer '{}' has {} tiles, expected {}x{}={}",
                self.name,
                raw.len(),
                self.width,
                self.height,
                expected
            )));
        }

        Ok(raw.into_iter().map(|gid| gid & !GID_FLAG_MASK).collect())
    }
}

/// An embedded single-image tileset (a texture atlas with a regular grid)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiledTileset {
    pub firstgid: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    /// External .tsx reference - not supported, maps must embed tilesets
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub tilewidth: u32,
    #[serde(default)]
    pub tileheight: u32,
    #[serde(default)]
    pub tilecount: u32,
    #[serde(default)]
    pub columns: u32,
    #[serde(default)]
    pub margin: u32,
    #[serde(default)]
    pub spacing: u32,
}

impl TiledTileset {
    /// Does a (flag-masked) GID belong to this tileset?
    pub fn contains(&self, gid: u32) -> bool {
        gid >= self.firstgid && gid < self.firstgid + self.tilecount
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiledMap {
    pub width: u32,
    pub height: u32,
    pub tilewidth: u32,
    pub tileheight: u32,
    pub layers: Vec<TiledLayer>,
    pub tilesets: Vec<TiledTileset>,
    #[serde(default)]
    pub backgroundcolor: Option<String>,
    #[serde(default)]
    pub infinite: bool,
}

impl TiledMap {
    pub fn layer(&self, name: &str) -> Option<&TiledLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Map background color, parsed from Tiled's "#RRGGBB" / "#AARRGGBB"
    pub fn background_color(&self) -> Option<Color> {
        parse_hex_color(self.backgroundcolor.as_deref()?)
    }

}

fn parse_hex_color(text: &str) -> Option<Color> {
    let hex = text.strip_prefix('#')?;
    let (a, rgb) = match hex.len() {
        6 => (255u8, hex),
        8 => (u8::from_str_radix(&hex[0..2], 16).ok()?, &hex[2..]),
        _ => return None,
    };
    let r = u8::from_str_radix(&rgb[0..2], 16).ok()?;
    let g = u8::from_str_radix(&rgb[2..4], 16).ok()?;
    let b = u8::from_str_radix(&rgb[4..6], 16).ok()?;
    Some(Color::from_rgba(r, g, b, a))
}

/// Parse and validate a Tiled JSON map
pub fn parse_map(json: &str) -> Result<TiledMap, MapError> {
    let map: TiledMap = serde_json::from_str(json)?;
    validate_map(&map)?;
    Ok(map)
}

fn validate_map(map: &TiledMap) -> Result<(), MapError> {
    if map.infinite {
        return Err(MapError::ValidationError(
            "infinite maps are not supported".to_string(),
        ));
    }
    if map.width == 0
        || map.height == 0
        || map.width > limits::MAX_MAP_SIZE
        || map.height > limits::MAX_MAP_SIZE
    {
        return Err(MapError::ValidationError(format!(
            "map size {}x{} outside 1..{}",
            map.width,
            map.height,
            limits::MAX_MAP_SIZE
        )));
    }
    if map.tilewidth == 0
        || map.tileheight == 0
        || map.tilewidth > limits::MAX_TILE_SIZE
        || map.tileheight > limits::MAX_TILE_SIZE
    {
        return Err(MapError::ValidationError(format!(
            "tile size {}x{} outside 1..{}",
            map.tilewidth,
            map.tileheight,
            limits::MAX_TILE_SIZE
        )));
    }
    if map.layers.len() > limits::MAX_LAYERS {
        return Err(MapError::ValidationError(format!(
            "{} layers exceeds limit of {}",
            map.layers.len(),
            limits::MAX_LAYERS
        )));
    }
    if map.tilesets.is_empty() || map.tilesets.len() > limits::MAX_TILESETS {
        return Err(MapError::ValidationError(format!(
            "{} tilesets outside 1..{}",
            map.tilesets.len(),
            limits::MAX_TILESETS
        )));
    }
    for tileset in &map.tilesets {
        if tileset.source.is_some() {
            return Err(MapError::ValidationError(format!(
                "tileset '{}' is external (.tsx); embed tilesets when exporting",
                tileset.name
            )));
        }
        if tileset.image.is_none() || tileset.columns == 0 || tileset.tilecount == 0 {
            return Err(MapError::ValidationError(format!(
                "tileset '{}' is missing image/columns/tilecount",
                tileset.name
            )));
        }
    }
    for layer in &map.layers {
        if layer.kind() == LayerKind::Objects && layer.objects.len() > limits::MAX_OBJECTS {
            return Err(MapError::ValidationError(format!(
                "layer '{}' has {} objects, limit is {}",
                layer.name,
                layer.objects.len(),
                limits::MAX_OBJECTS
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_map(data: &str) -> String {
        format!(
            r##"{{
                "width": 2, "height": 2, "tilewidth": 64, "tileheight": 64,
                "backgroundcolor": "#6185f8",
                "layers": [
                    {{ "name": "Platforms", "type": "tilelayer",
                      "width": 2, "height": 2, "data": {data} }}
                ],
                "tilesets": [
                    {{ "firstgid": 1, "name": "tiles", "image": "tiles.png",
                      "tilewidth": 64, "tileheight": 64,
                      "tilecount": 8, "columns": 4 }}
                ]
            }}"##
        )
    }

    #[test]
    fn test_parse_raw_gids() {
        let map = parse_map(&tiny_map("[1, 0, 2, 1]")).unwrap();
        let layer = map.layer("Platforms").unwrap();
        assert_eq!(layer.gids().unwrap(), vec![1, 0, 2, 1]);
    }

    #[test]
    fn test_parse_base64_gids() {
        // [1, 0, 2, 1] as little-endian u32s
        let mut bytes = Vec::new();
        for gid in [1u32, 0, 2, 1] {
            bytes.extend_from_slice(&gid.to_le_bytes());
        }
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let map = parse_map(&tiny_map(&format!("\"{}\"", encoded))).unwrap();
        assert_eq!(map.layer("Platforms").unwrap().gids().unwrap(), vec![1, 0, 2, 1]);
    }

    #[test]
    fn test_flip_flags_are_masked() {
        // GID 2 with the horizontal-flip bit set
        let flipped = 2u32 | 0x8000_0000;
        let map = parse_map(&tiny_map(&format!("[1, 0, {}, 1]", flipped))).unwrap();
        assert_eq!(map.layer("Platforms").unwrap().gids().unwrap(), vec![1, 0, 2, 1]);
    }

    #[test]
    fn test_wrong_tile_count_rejected() {
        let map = parse_map(&tiny_map("[1, 0, 2]")).unwrap();
        assert!(matches!(
            map.layer("Platforms").unwrap().gids(),
            Err(MapError::ValidationError(_))
        ));
    }

    #[test]
    fn test_background_color() {
        let map = parse_map(&tiny_map("[0, 0, 0, 0]")).unwrap();
        let color = map.background_color().unwrap();
        assert_eq!((color.r * 255.0).round() as u8, 0x61);
        assert_eq!((color.g * 255.0).round() as u8, 0x85);
        assert_eq!((color.b * 255.0).round() as u8, 0xf8);
    }

    #[test]
    fn test_external_tileset_rejected() {
        let json = r#"{
            "width": 1, "height": 1, "tilewidth": 64, "tileheight": 64,
            "layers": [],
            "tilesets": [ { "firstgid": 1, "source": "tiles.tsx" } ]
        }"#;
        assert!(matches!(parse_map(json), Err(MapError::ValidationError(_))));
    }

    #[test]
    fn test_tileset_gid_range() {
        let map = parse_map(&tiny_map("[0, 0, 0, 0]")).unwrap();
        let tileset = &map.tilesets[0];
        assert!(!tileset.contains(0));
        assert!(tileset.contains(1));
        assert!(tileset.contains(8));
        assert!(!tileset.contains(9));
    }

    #[test]
    fn test_object_properties() {
        let object: TiledObject = serde_json::from_str(
            r#"{ "id": 1, "x": 128.0, "y": 256.0, "width": 128.0, "height": 64.0,
                 "gid": 6,
                 "properties": [
                     { "name": "change_x", "type": "float", "value": 2.0 },
                     { "name": "boundary_left", "type": "float", "value": 64.0 }
                 ] }"#,
        )
        .unwrap();
        assert_eq!(object.property_f32("change_x"), Some(2.0));
        assert_eq!(object.property_f32("boundary_left"), Some(64.0));
        assert_eq!(object.property_f32("missing"), None);
    }
}
