use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::world::builder::{
    BuildWarning, BuildingSpawn, DecorationSpawn, NpcTemplate, WarningSink, WorldBlueprint,
};
use crate::world::geometry::{Rect, Size, Vec2};
use crate::world::interaction::{BuildingProfile, NpcProfile, ZoneOverride};
use crate::world::scroll::SceneryLayer;
use crate::world::tilemap::{GridGeometry, Tilemap, TilemapError};
use crate::world::WorldConfig;

use super::assets::resolve_size;
use super::definition::{MapSourceDef, PlayerDef, WorldDef, WorldSettingsDef, DEFAULT_CELL_SIZE};
use super::tiled::{parse_tmx, TiledError};

/// Used when the player has neither an explicit size nor a readable sprite.
pub const FALLBACK_PLAYER_SIZE: Size = Size::new(48.0, 68.0);

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid world definition {} at {json_path}", path.display())]
    Json {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid Tiled map {}", path.display())]
    Tiled {
        path: PathBuf,
        #[source]
        source: TiledError,
    },
    #[error("map {} has no layer named '{layer}'", path.display())]
    MissingLayer { path: PathBuf, layer: String },
    #[error("inline {layer} map has the wrong shape")]
    InlineMap {
        layer: &'static str,
        #[source]
        source: TilemapError,
    },
    #[error("map path '{path}' must stay inside the content directory")]
    InvalidMapPath { path: String },
    #[error("cell size must be positive, got {value}")]
    InvalidCellSize { value: f32 },
}

/// Reads `world_file` under `base_dir` and resolves it into a blueprint.
/// Problems with individual placements are reported through `warnings`;
/// only unreadable or malformed files fail the load.
pub fn load_world_blueprint(
    base_dir: &Path,
    world_file: &str,
    warnings: &mut dyn WarningSink,
) -> Result<WorldBlueprint, ContentError> {
    let path = base_dir.join(world_file);
    let raw = read_file(&path)?;
    let def = parse_world_def(&path, &raw)?;
    let blueprint = resolve_world_def(base_dir, def, warnings)?;
    info!(
        path = %path.display(),
        npc_templates = blueprint.npcs.len(),
        buildings = blueprint.buildings.len(),
        decorations = blueprint.decorations.len(),
        "world_content_loaded"
    );
    Ok(blueprint)
}

pub fn parse_world_def(path: &Path, raw: &str) -> Result<WorldDef, ContentError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, WorldDef>(&mut deserializer).map_err(|error| {
        let json_path = error.path().to_string();
        ContentError::Json {
            path: path.to_path_buf(),
            json_path,
            source: error.into_inner(),
        }
    })
}

pub fn resolve_world_def(
    base_dir: &Path,
    def: WorldDef,
    warnings: &mut dyn WarningSink,
) -> Result<WorldBlueprint, ContentError> {
    let (collisions, placements, map_cell_size) = load_maps(base_dir, &def.map)?;
    let cell_size = def.cell_size.unwrap_or(map_cell_size);
    if !(cell_size.is_finite() && cell_size > 0.0) {
        return Err(ContentError::InvalidCellSize { value: cell_size });
    }
    let geometry = GridGeometry {
        origin: Vec2::new(def.origin.x, def.origin.y),
        cell_width: cell_size,
        cell_height: cell_size,
    };
    let config = world_config(&def.settings);
    let player = player_rect(base_dir, &def.player, &config, warnings);

    let npcs = def
        .npcs
        .into_iter()
        .map(|npc| {
            let size = resolve_size(base_dir, &npc.id, npc.size, npc.sprite.as_ref(), 1.0, warnings);
            NpcTemplate {
                id: npc.id,
                symbol: npc.symbol,
                profile: NpcProfile {
                    name: npc.name,
                    role: npc.role,
                    personality: npc.personality,
                    dialogue: npc.dialogue,
                    topics: npc.topics,
                    scenarios: npc.scenarios,
                },
                size,
            }
        })
        .collect::<Vec<_>>();

    let mut buildings = Vec::with_capacity(def.buildings.len());
    for building in def.buildings {
        let Some(kind) = def.building_types.get(&building.building_type) else {
            warnings.warn(BuildWarning::UnknownBuildingType {
                id: building.id,
                building_type: building.building_type,
            });
            continue;
        };
        let scale = building.scale.unwrap_or(1.0);
        let size = resolve_size(
            base_dir,
            &building.id,
            kind.size,
            kind.sprite.as_ref(),
            scale,
            warnings,
        );
        let zone = match (kind.proximity_threshold, kind.interaction_area) {
            (None, None) => None,
            (threshold, area) => Some(ZoneOverride {
                proximity_threshold: threshold.unwrap_or(config.proximity_threshold),
                area: area.map(|area| Size::new(area.width, area.height)),
            }),
        };
        buildings.push(BuildingSpawn {
            id: building.id,
            position: Vec2::new(building.position.x, building.position.y),
            profile: BuildingProfile {
                building_type: building.building_type,
                name: kind.name.clone(),
                description: kind.description.clone(),
                scenarios: kind.scenarios.clone(),
                prompt: kind.prompt.clone(),
                learning_contexts: kind.learning_contexts.clone(),
            },
            size,
            zone,
        });
    }

    let mut decoration_sizes = HashMap::new();
    let mut decorations = Vec::with_capacity(def.decorations.placements.len());
    for placement in def.decorations.placements {
        let Some(asset) = def
            .decorations
            .assets
            .iter()
            .find(|asset| asset.id == placement.asset)
        else {
            warnings.warn(BuildWarning::UnknownDecoration {
                id: format!("{}@{},{}", placement.asset, placement.cell[0], placement.cell[1]),
                asset: placement.asset,
            });
            continue;
        };
        // Probe each asset once so a broken sprite warns once.
        let size = *decoration_sizes.entry(asset.id.clone()).or_insert_with(|| {
            resolve_size(base_dir, &asset.id, asset.size, asset.sprite.as_ref(), 1.0, warnings)
        });
        decorations.push(DecorationSpawn {
            id: asset.id.clone(),
            name: asset.name.clone(),
            cell: (placement.cell[0], placement.cell[1]),
            size,
            collidable: asset.collidable,
        });
    }

    let mut scenery = Vec::with_capacity(def.scenery.len());
    for layer in def.scenery {
        let Some(size) = resolve_size(
            base_dir,
            &layer.name,
            layer.size,
            layer.sprite.as_ref(),
            1.0,
            warnings,
        ) else {
            continue;
        };
        scenery.push(SceneryLayer {
            rect: Rect::from_position_size(Vec2::new(layer.position.x, layer.position.y), size),
            name: layer.name,
        });
    }

    Ok(WorldBlueprint {
        config,
        geometry,
        collisions,
        placements,
        npcs,
        buildings,
        decorations,
        scenery,
        player,
    })
}

fn load_maps(
    base_dir: &Path,
    source: &MapSourceDef,
) -> Result<(Tilemap, Option<Tilemap>, f32), ContentError> {
    match source {
        MapSourceDef::Inline {
            width,
            collisions,
            placements,
        } => {
            let collisions = Tilemap::from_flat(collisions.clone(), *width).map_err(|source| {
                ContentError::InlineMap {
                    layer: "collision",
                    source,
                }
            })?;
            let placements = placements
                .as_ref()
                .map(|cells| {
                    Tilemap::from_flat(cells.clone(), *width).map_err(|source| {
                        ContentError::InlineMap {
                            layer: "placement",
                            source,
                        }
                    })
                })
                .transpose()?;
            Ok((collisions, placements, DEFAULT_CELL_SIZE))
        }
        MapSourceDef::Tiled {
            path,
            collision_layer,
            placement_layer,
        } => {
            if Path::new(path).is_absolute() || path.split(['/', '\\']).any(|part| part == "..") {
                return Err(ContentError::InvalidMapPath { path: path.clone() });
            }
            let map_path = base_dir.join(path);
            let raw = read_file(&map_path)?;
            let map = parse_tmx(&raw).map_err(|source| ContentError::Tiled {
                path: map_path.clone(),
                source,
            })?;
            let layer = |name: &str| {
                map.layer(name)
                    .cloned()
                    .ok_or_else(|| ContentError::MissingLayer {
                        path: map_path.clone(),
                        layer: name.to_string(),
                    })
            };
            let collisions = layer(collision_layer.as_str())?;
            let placements = placement_layer.as_deref().map(layer).transpose()?;
            Ok((collisions, placements, map.tile_width as f32))
        }
    }
}

fn world_config(settings: &WorldSettingsDef) -> WorldConfig {
    let defaults = WorldConfig::default();
    WorldConfig {
        move_speed: settings.move_speed.unwrap_or(defaults.move_speed),
        proximity_threshold: settings
            .proximity_threshold
            .unwrap_or(defaults.proximity_threshold),
        camera_smoothing: settings
            .camera_smoothing
            .unwrap_or(defaults.camera_smoothing),
        viewport: settings
            .viewport
            .map(|viewport| Size::new(viewport.width, viewport.height))
            .unwrap_or(defaults.viewport),
    }
}

fn player_rect(
    base_dir: &Path,
    player: &PlayerDef,
    config: &WorldConfig,
    warnings: &mut dyn WarningSink,
) -> Rect {
    let size = resolve_size(
        base_dir,
        "player",
        player.size,
        player.sprite.as_ref(),
        1.0,
        warnings,
    )
    .unwrap_or(FALLBACK_PLAYER_SIZE);
    let position = match player.position {
        Some(position) => Vec2::new(position.x, position.y),
        None => Vec2::new(
            (config.viewport.width - size.width) / 2.0,
            (config.viewport.height - size.height) / 2.0,
        ),
    };
    Rect::from_position_size(position, size)
}

fn read_file(path: &Path) -> Result<String, ContentError> {
    fs::read_to_string(path).map_err(|source| ContentError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}
