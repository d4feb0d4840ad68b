use std::collections::HashMap;

use thiserror::Error;
use tracing::{info, warn};

use super::collision::{CollisionField, SolidRule};
use super::geometry::{Rect, Size, Vec2};
use super::interaction::{
    BuildingProfile, EntityRole, InteractionRegistry, InteractiveEntity, NpcProfile, ZoneOverride,
};
use super::scroll::SceneryLayer;
use super::tilemap::{GridGeometry, Tilemap};
use super::{World, WorldConfig};

/// Non-fatal problem found while assembling a world. The offending item is
/// skipped and the build continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildWarning {
    #[error("unknown placement symbol {symbol} at cell ({x}, {y})")]
    UnknownSymbol { symbol: u32, x: u32, y: u32 },
    #[error("building '{id}' references unknown building type '{building_type}'")]
    UnknownBuildingType { id: String, building_type: String },
    #[error("decoration placement '{id}' references unknown asset '{asset}'")]
    UnknownDecoration { id: String, asset: String },
    #[error("asset for '{id}' unavailable at {path}: {reason}")]
    AssetUnavailable {
        id: String,
        path: String,
        reason: String,
    },
    #[error("entity id '{id}' is already registered")]
    DuplicateEntityId { id: String },
    #[error(
        "placement map is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}"
    )]
    PlacementShapeMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

/// Receives build warnings.
pub trait WarningSink {
    fn warn(&mut self, warning: BuildWarning);
}

impl WarningSink for Vec<BuildWarning> {
    fn warn(&mut self, warning: BuildWarning) {
        self.push(warning);
    }
}

/// Forwards warnings to the log and counts them.
#[derive(Debug, Default)]
pub struct TracingWarnings {
    count: usize,
}

impl TracingWarnings {
    pub fn count(&self) -> usize {
        self.count
    }
}

impl WarningSink for TracingWarnings {
    fn warn(&mut self, warning: BuildWarning) {
        self.count += 1;
        warn!(warning = %warning, "world_build_warning");
    }
}

struct CountingSink<'a> {
    inner: &'a mut dyn WarningSink,
    count: usize,
}

impl WarningSink for CountingSink<'_> {
    fn warn(&mut self, warning: BuildWarning) {
        self.count += 1;
        self.inner.warn(warning);
    }
}

/// NPC definition spawned wherever its symbol appears in the placement map.
#[derive(Debug, Clone, PartialEq)]
pub struct NpcTemplate {
    pub id: String,
    pub symbol: u32,
    pub profile: NpcProfile,
    pub size: Option<Size>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildingSpawn {
    pub id: String,
    /// Absolute canvas position.
    pub position: Vec2,
    pub profile: BuildingProfile,
    pub size: Option<Size>,
    pub zone: Option<ZoneOverride>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecorationSpawn {
    pub id: String,
    pub name: String,
    pub cell: (u32, u32),
    pub size: Option<Size>,
    pub collidable: bool,
}

/// Decoded content, ready to be assembled into a [`World`].
#[derive(Debug, Clone, PartialEq)]
pub struct WorldBlueprint {
    pub config: WorldConfig,
    pub geometry: GridGeometry,
    pub collisions: Tilemap,
    pub placements: Option<Tilemap>,
    pub npcs: Vec<NpcTemplate>,
    pub buildings: Vec<BuildingSpawn>,
    pub decorations: Vec<DecorationSpawn>,
    pub scenery: Vec<SceneryLayer>,
    pub player: Rect,
}

pub fn build_world(blueprint: WorldBlueprint, warnings: &mut dyn WarningSink) -> World {
    let WorldBlueprint {
        config,
        geometry,
        collisions,
        placements,
        npcs,
        buildings,
        decorations,
        mut scenery,
        player,
    } = blueprint;

    let spawn_symbols = npcs.iter().map(|npc| npc.symbol).collect::<Vec<_>>();
    let mut obstacles = CollisionField::build(
        &collisions,
        geometry,
        &SolidRule::NonZero {
            exempt: spawn_symbols,
        },
    );
    let mut entities = InteractionRegistry::new(config.proximity_threshold);
    let mut warnings = CountingSink {
        inner: warnings,
        count: 0,
    };

    let placements = placements.filter(|placements| {
        let matches = placements.width() == collisions.width()
            && placements.height() == collisions.height();
        if !matches {
            warnings.warn(BuildWarning::PlacementShapeMismatch {
                expected_width: collisions.width(),
                expected_height: collisions.height(),
                actual_width: placements.width(),
                actual_height: placements.height(),
            });
        }
        matches
    });

    let mut npc_count = 0usize;
    if let Some(placements) = placements.as_ref() {
        obstacles.add_layer(
            placements,
            geometry,
            &SolidRule::NonZero { exempt: Vec::new() },
        );

        let templates = npcs
            .iter()
            .map(|template| (template.symbol, template))
            .collect::<HashMap<_, _>>();
        let mut spawn_counts: HashMap<u32, usize> = HashMap::new();
        for (x, y, symbol) in placements.occupied_cells() {
            let Some(template) = templates.get(&symbol) else {
                warnings.warn(BuildWarning::UnknownSymbol { symbol, x, y });
                continue;
            };
            let ordinal = spawn_counts.entry(symbol).or_insert(0);
            *ordinal += 1;
            let id = if *ordinal == 1 {
                template.id.clone()
            } else {
                format!("{}_{}", template.id, ordinal)
            };
            if entities.handle_of(&id).is_some() {
                warnings.warn(BuildWarning::DuplicateEntityId { id });
                continue;
            }
            entities.register(
                InteractiveEntity {
                    id,
                    position: geometry.cell_position(x, y),
                    size: template.size,
                    role: EntityRole::Npc(template.profile.clone()),
                },
                None,
            );
            npc_count += 1;
        }
    }

    let mut building_count = 0usize;
    for building in buildings {
        if entities.handle_of(&building.id).is_some() {
            warnings.warn(BuildWarning::DuplicateEntityId { id: building.id });
            continue;
        }
        entities.register(
            InteractiveEntity {
                id: building.id,
                position: building.position,
                size: building.size,
                role: EntityRole::Building(building.profile),
            },
            building.zone,
        );
        building_count += 1;
    }

    for decoration in &decorations {
        let (x, y) = decoration.cell;
        let position = geometry.cell_position(x, y);
        if decoration.collidable {
            obstacles.push_obstacle(geometry.cell_rect(x, y));
        }
        if let Some(size) = decoration.size {
            scenery.push(SceneryLayer {
                name: decoration.name.clone(),
                rect: Rect::from_position_size(position, size),
            });
        }
    }

    info!(
        obstacles = obstacles.len(),
        npcs = npc_count,
        buildings = building_count,
        decorations = decorations.len(),
        warnings = warnings.count,
        "world_built"
    );

    World::new(config, obstacles, entities, scenery, player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::interaction::EntityKind;

    fn geometry() -> GridGeometry {
        GridGeometry {
            origin: Vec2::new(-10.0, -10.0),
            cell_width: 10.0,
            cell_height: 10.0,
        }
    }

    fn villager(symbol: u32) -> NpcTemplate {
        NpcTemplate {
            id: "villager".to_string(),
            symbol,
            profile: NpcProfile {
                name: "Villager".to_string(),
                ..NpcProfile::default()
            },
            size: Some(Size::new(8.0, 8.0)),
        }
    }

    fn blueprint(collisions: Vec<u32>, placements: Option<Vec<u32>>) -> WorldBlueprint {
        WorldBlueprint {
            config: WorldConfig::default(),
            geometry: geometry(),
            collisions: Tilemap::from_flat(collisions, 3).expect("collisions"),
            placements: placements.map(|cells| Tilemap::from_flat(cells, 3).expect("placements")),
            npcs: vec![villager(1026)],
            buildings: Vec::new(),
            decorations: Vec::new(),
            scenery: Vec::new(),
            player: Rect::new(100.0, 100.0, 8.0, 8.0),
        }
    }

    #[test]
    fn spawns_npcs_from_placement_symbols() {
        let mut warnings = Vec::new();
        let world = build_world(
            blueprint(
                vec![1025, 0, 0, 0, 0, 0],
                Some(vec![0, 1026, 0, 0, 0, 1026]),
            ),
            &mut warnings,
        );

        assert!(warnings.is_empty());
        let ids = world
            .entities()
            .all()
            .map(|entry| entry.entity().id.clone())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["villager".to_string(), "villager_2".to_string()]);
        let first = world.entities().all().next().expect("first");
        assert_eq!(first.entity().position, Vec2::new(0.0, -10.0));
        // One solid collision cell plus two occupied placement cells.
        assert_eq!(world.obstacles().len(), 3);
    }

    #[test]
    fn unknown_symbols_warn_but_still_block() {
        let mut warnings = Vec::new();
        let world = build_world(
            blueprint(vec![0; 6], Some(vec![0, 0, 4242, 0, 0, 0])),
            &mut warnings,
        );

        assert_eq!(
            warnings,
            vec![BuildWarning::UnknownSymbol {
                symbol: 4242,
                x: 2,
                y: 0
            }]
        );
        assert!(world.entities().is_empty());
        assert_eq!(world.obstacles().len(), 1);
    }

    #[test]
    fn spawn_symbols_in_collision_layer_are_not_solid() {
        let mut warnings = Vec::new();
        let world = build_world(blueprint(vec![1026, 1025, 7, 0, 0, 0], None), &mut warnings);
        assert_eq!(world.obstacles().len(), 2);
    }

    #[test]
    fn mismatched_placement_map_is_ignored() {
        let mut warnings = Vec::new();
        let mut plan = blueprint(vec![0; 6], None);
        plan.placements = Some(Tilemap::from_flat(vec![1026, 0], 2).expect("placements"));
        let world = build_world(plan, &mut warnings);

        assert!(matches!(
            warnings.as_slice(),
            [BuildWarning::PlacementShapeMismatch { .. }]
        ));
        assert!(world.entities().is_empty());
    }

    #[test]
    fn buildings_use_zone_override_and_reject_duplicates() {
        let mut warnings = Vec::new();
        let mut plan = blueprint(vec![0; 6], None);
        let hospital = BuildingSpawn {
            id: "hospital_main".to_string(),
            position: Vec2::new(200.0, 150.0),
            profile: BuildingProfile {
                building_type: "hospital".to_string(),
                name: "Hospital".to_string(),
                ..BuildingProfile::default()
            },
            size: Some(Size::new(64.0, 64.0)),
            zone: Some(ZoneOverride {
                proximity_threshold: 60.0,
                area: Some(Size::new(120.0, 120.0)),
            }),
        };
        plan.buildings = vec![hospital.clone(), hospital];
        let world = build_world(plan, &mut warnings);

        assert_eq!(
            warnings,
            vec![BuildWarning::DuplicateEntityId {
                id: "hospital_main".to_string()
            }]
        );
        let entry = world
            .entities()
            .by_kind(EntityKind::Building)
            .next()
            .expect("building");
        assert_eq!(entry.zone(), Some(Rect::new(170.0, 120.0, 120.0, 120.0)));
    }

    #[test]
    fn collidable_decorations_add_cell_obstacles() {
        let mut warnings = Vec::new();
        let mut plan = blueprint(vec![0; 6], None);
        plan.decorations = vec![
            DecorationSpawn {
                id: "fountain".to_string(),
                name: "City Fountain".to_string(),
                cell: (1, 1),
                size: Some(Size::new(20.0, 20.0)),
                collidable: true,
            },
            DecorationSpawn {
                id: "garden".to_string(),
                name: "Garden Area".to_string(),
                cell: (2, 0),
                size: None,
                collidable: false,
            },
        ];
        let world = build_world(plan, &mut warnings);

        assert_eq!(world.obstacles().len(), 1);
        assert_eq!(
            world.obstacles().obstacles()[0].rect,
            Rect::new(0.0, 0.0, 10.0, 10.0)
        );
        assert_eq!(world.scenery().len(), 1);
        assert_eq!(world.scenery()[0].name, "City Fountain");
    }

    #[test]
    fn tracing_sink_counts_warnings() {
        let mut sink = TracingWarnings::default();
        sink.warn(BuildWarning::DuplicateEntityId {
            id: "x".to_string(),
        });
        assert_eq!(sink.count(), 1);
    }
}
