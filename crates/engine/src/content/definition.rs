use std::collections::BTreeMap;

use serde::Deserialize;

pub const DEFAULT_CELL_SIZE: f32 = 48.0;
pub const DEFAULT_MAP_ORIGIN: DefVec2 = DefVec2 {
    x: -735.0,
    y: -650.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DefVec2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DefSize {
    pub width: f32,
    pub height: f32,
}

/// On-disk world description (`assets/base/world.json`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldDef {
    pub map: MapSourceDef,
    #[serde(default = "default_origin")]
    pub origin: DefVec2,
    /// Overrides the tile size reported by the map.
    #[serde(default)]
    pub cell_size: Option<f32>,
    #[serde(default)]
    pub settings: WorldSettingsDef,
    pub player: PlayerDef,
    #[serde(default)]
    pub npcs: Vec<NpcDef>,
    #[serde(default)]
    pub building_types: BTreeMap<String, BuildingTypeDef>,
    #[serde(default)]
    pub buildings: Vec<BuildingDef>,
    #[serde(default)]
    pub decorations: DecorationsDef,
    #[serde(default)]
    pub scenery: Vec<SceneryDef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapSourceDef {
    Tiled {
        path: String,
        collision_layer: String,
        #[serde(default)]
        placement_layer: Option<String>,
    },
    Inline {
        width: u32,
        collisions: Vec<u32>,
        #[serde(default)]
        placements: Option<Vec<u32>>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldSettingsDef {
    #[serde(default)]
    pub move_speed: Option<f32>,
    #[serde(default)]
    pub proximity_threshold: Option<f32>,
    #[serde(default)]
    pub camera_smoothing: Option<f32>,
    #[serde(default)]
    pub viewport: Option<DefSize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerDef {
    /// Screen anchor; centered in the viewport when omitted.
    #[serde(default)]
    pub position: Option<DefVec2>,
    #[serde(default)]
    pub size: Option<DefSize>,
    #[serde(default)]
    pub sprite: Option<SpriteDef>,
}

/// Sprite sheet reference. Only used to probe the visual footprint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpriteDef {
    pub path: String,
    #[serde(default = "default_frames")]
    pub frames: u32,
    #[serde(default = "default_scale")]
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NpcDef {
    pub id: String,
    pub symbol: u32,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub dialogue: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub scenarios: Vec<String>,
    #[serde(default)]
    pub size: Option<DefSize>,
    #[serde(default)]
    pub sprite: Option<SpriteDef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildingTypeDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub scenarios: Vec<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub learning_contexts: Vec<String>,
    #[serde(default)]
    pub proximity_threshold: Option<f32>,
    #[serde(default)]
    pub interaction_area: Option<DefSize>,
    #[serde(default)]
    pub size: Option<DefSize>,
    #[serde(default)]
    pub sprite: Option<SpriteDef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildingDef {
    pub id: String,
    #[serde(rename = "type")]
    pub building_type: String,
    pub position: DefVec2,
    /// Multiplies the type's sprite scale.
    #[serde(default)]
    pub scale: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecorationsDef {
    #[serde(default)]
    pub assets: Vec<DecorationAssetDef>,
    #[serde(default)]
    pub placements: Vec<DecorationPlacementDef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecorationAssetDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub collidable: bool,
    #[serde(default)]
    pub size: Option<DefSize>,
    #[serde(default)]
    pub sprite: Option<SpriteDef>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecorationPlacementDef {
    pub asset: String,
    pub cell: [u32; 2],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneryDef {
    pub name: String,
    pub position: DefVec2,
    #[serde(default)]
    pub size: Option<DefSize>,
    #[serde(default)]
    pub sprite: Option<SpriteDef>,
}

fn default_origin() -> DefVec2 {
    DEFAULT_MAP_ORIGIN
}

fn default_frames() -> u32 {
    1
}

fn default_scale() -> f32 {
    1.0
}
