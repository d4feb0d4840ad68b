mod assets;
mod definition;
mod loader;
mod tiled;

pub use assets::{frame_size, probe_sprite_size, resolve_size};
pub use definition::{
    BuildingDef, BuildingTypeDef, DecorationAssetDef, DecorationPlacementDef, DecorationsDef,
    DefSize, DefVec2, MapSourceDef, NpcDef, PlayerDef, SceneryDef, SpriteDef, WorldDef,
    WorldSettingsDef, DEFAULT_CELL_SIZE, DEFAULT_MAP_ORIGIN,
};
pub use loader::{
    load_world_blueprint, parse_world_def, resolve_world_def, ContentError, FALLBACK_PLAYER_SIZE,
};
pub use tiled::{parse_tmx, SourceLocation, TiledError, TiledLayer, TiledMap};
