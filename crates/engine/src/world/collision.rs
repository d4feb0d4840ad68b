use std::collections::HashSet;

use super::geometry::{Rect, Vec2};
use super::tilemap::{GridGeometry, Tilemap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleSource {
    Cell { x: u32, y: u32 },
    Placement,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub rect: Rect,
    pub source: ObstacleSource,
}

/// Which map symbols block movement when a layer is folded into the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolidRule {
    /// Only cells holding exactly this symbol are solid.
    Symbol(u32),
    /// Every non-zero cell is solid except the listed symbols.
    NonZero { exempt: Vec<u32> },
}

impl SolidRule {
    pub fn is_solid(&self, symbol: u32) -> bool {
        match self {
            Self::Symbol(solid) => symbol == *solid,
            Self::NonZero { exempt } => symbol != 0 && !exempt.contains(&symbol),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CollisionField {
    obstacles: Vec<Obstacle>,
    occupied_cells: HashSet<(u32, u32)>,
}

impl CollisionField {
    pub fn build(tilemap: &Tilemap, geometry: GridGeometry, rule: &SolidRule) -> Self {
        let mut field = Self::default();
        field.add_layer(tilemap, geometry, rule);
        field
    }

    /// Folds another layer of the same grid into the field. A cell that is
    /// already solid never produces a second obstacle. Returns the number of
    /// obstacles added.
    pub fn add_layer(&mut self, tilemap: &Tilemap, geometry: GridGeometry, rule: &SolidRule) -> usize {
        let before = self.obstacles.len();
        for (x, y, symbol) in tilemap.occupied_cells() {
            if !rule.is_solid(symbol) || !self.occupied_cells.insert((x, y)) {
                continue;
            }
            self.obstacles.push(Obstacle {
                rect: geometry.cell_rect(x, y),
                source: ObstacleSource::Cell { x, y },
            });
        }
        self.obstacles.len() - before
    }

    /// Appends an ad-hoc obstacle such as a collidable decoration. Exact
    /// duplicates of an existing obstacle are ignored.
    pub fn push_obstacle(&mut self, rect: Rect) -> bool {
        if self.obstacles.iter().any(|obstacle| obstacle.rect == rect) {
            return false;
        }
        self.obstacles.push(Obstacle {
            rect,
            source: ObstacleSource::Placement,
        });
        true
    }

    /// Translates `moving` by `delta` and reports whether it would overlap any
    /// obstacle (inclusive edges).
    pub fn would_collide(&self, moving: &Rect, delta: Vec2) -> bool {
        let probe = moving.translated(delta);
        self.obstacles
            .iter()
            .any(|obstacle| probe.overlaps(&obstacle.rect))
    }

    pub(crate) fn translate_all(&mut self, delta: Vec2) {
        for obstacle in &mut self.obstacles {
            obstacle.rect = obstacle.rect.translated(delta);
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }
}
