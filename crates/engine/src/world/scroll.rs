use super::collision::CollisionField;
use super::geometry::{Rect, Vec2};
use super::interaction::InteractionRegistry;
use super::player::{Direction, Player};

pub const DEFAULT_MOVE_SPEED: f32 = 3.0;

/// Non-colliding world art (background, foreground) that scrolls with the map.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneryLayer {
    pub name: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Blocked,
    Locked,
}

impl MoveOutcome {
    pub fn moved(self) -> bool {
        self == Self::Moved
    }
}

/// Everything that shifts when the world scrolls.
pub struct Movables<'a> {
    pub obstacles: &'a mut CollisionField,
    pub entities: &'a mut InteractionRegistry,
    pub scenery: &'a mut [SceneryLayer],
    pub offset: &'a mut Vec2,
}

impl Movables<'_> {
    fn translate(&mut self, delta: Vec2) {
        self.obstacles.translate_all(delta);
        self.entities.translate_all(delta);
        for layer in self.scenery.iter_mut() {
            layer.rect = layer.rect.translated(delta);
        }
        *self.offset += delta;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WorldScrollController {
    move_speed: f32,
}

impl Default for WorldScrollController {
    fn default() -> Self {
        Self::new(DEFAULT_MOVE_SPEED)
    }
}

impl WorldScrollController {
    pub fn new(move_speed: f32) -> Self {
        let move_speed = if move_speed.is_finite() && move_speed > 0.0 {
            move_speed
        } else {
            DEFAULT_MOVE_SPEED
        };
        Self { move_speed }
    }

    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    /// World offset for one step. The world moves opposite to the player's
    /// nominal direction.
    pub fn world_delta(&self, direction: Direction) -> Vec2 {
        let speed = self.move_speed;
        match direction {
            Direction::Up => Vec2::new(0.0, speed),
            Direction::Down => Vec2::new(0.0, -speed),
            Direction::Left => Vec2::new(speed, 0.0),
            Direction::Right => Vec2::new(-speed, 0.0),
        }
    }

    /// Attempts one step. Facing and animation update even when blocked; a
    /// locked player is left untouched.
    pub fn try_move(
        &self,
        direction: Direction,
        player: &mut Player,
        mut movables: Movables<'_>,
    ) -> MoveOutcome {
        if !player.can_move() {
            return MoveOutcome::Locked;
        }
        player.face(direction);

        let delta = self.world_delta(direction);
        // Checking the fixed player against `obstacle + delta` is the same as
        // moving the player by `-delta` against the current obstacles.
        if movables.obstacles.would_collide(&player.rect(), -delta) {
            return MoveOutcome::Blocked;
        }
        movables.translate(delta);
        MoveOutcome::Moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::collision::SolidRule;
    use crate::world::geometry::Size;
    use crate::world::interaction::{EntityRole, InteractiveEntity, NpcProfile};
    use crate::world::tilemap::{GridGeometry, Tilemap};

    struct Fixture {
        obstacles: CollisionField,
        entities: InteractionRegistry,
        scenery: Vec<SceneryLayer>,
        offset: Vec2,
        player: Player,
    }

    impl Fixture {
        /// 3x3 grid of 10px cells with a single obstacle in the middle; the
        /// player sits inside the middle-left cell, clear of the obstacle.
        fn three_by_three() -> Self {
            let tilemap = Tilemap::from_flat(vec![0, 0, 0, 0, 1025, 0, 0, 0, 0], 3)
                .expect("tilemap");
            let geometry = GridGeometry {
                origin: Vec2::ZERO,
                cell_width: 10.0,
                cell_height: 10.0,
            };
            let mut entities = InteractionRegistry::default();
            entities.register(
                InteractiveEntity {
                    id: "npc".to_string(),
                    position: Vec2::new(20.0, 20.0),
                    size: Some(Size::new(10.0, 10.0)),
                    role: EntityRole::Npc(NpcProfile::default()),
                },
                None,
            );
            Self {
                obstacles: CollisionField::build(&tilemap, geometry, &SolidRule::Symbol(1025)),
                entities,
                scenery: vec![SceneryLayer {
                    name: "background".to_string(),
                    rect: Rect::new(0.0, 0.0, 30.0, 30.0),
                }],
                offset: Vec2::ZERO,
                player: Player::new(Rect::new(1.0, 11.0, 6.0, 6.0)),
            }
        }

        fn movable_rects(&self) -> (Vec<Rect>, Vec<(Vec2, Option<Rect>)>, Vec<Rect>) {
            (
                self.obstacles.obstacles().iter().map(|obstacle| obstacle.rect).collect(),
                self.entities
                    .all()
                    .map(|entry| (entry.entity().position, entry.zone()))
                    .collect(),
                self.scenery.iter().map(|layer| layer.rect).collect(),
            )
        }

        fn step(&mut self, controller: &WorldScrollController, direction: Direction) -> MoveOutcome {
            controller.try_move(
                direction,
                &mut self.player,
                Movables {
                    obstacles: &mut self.obstacles,
                    entities: &mut self.entities,
                    scenery: &mut self.scenery,
                    offset: &mut self.offset,
                },
            )
        }
    }

    #[test]
    fn deltas_oppose_nominal_direction() {
        let controller = WorldScrollController::default();
        assert_eq!(controller.world_delta(Direction::Up), Vec2::new(0.0, 3.0));
        assert_eq!(controller.world_delta(Direction::Down), Vec2::new(0.0, -3.0));
        assert_eq!(controller.world_delta(Direction::Left), Vec2::new(3.0, 0.0));
        assert_eq!(controller.world_delta(Direction::Right), Vec2::new(-3.0, 0.0));
    }

    #[test]
    fn obstacle_blocks_only_the_direction_into_it() {
        // Player right edge at 7; the obstacle starts at 10 and one step is 3.
        let controller = WorldScrollController::new(3.0);

        let mut fixture = Fixture::three_by_three();
        let before = fixture.movable_rects();
        assert_eq!(fixture.step(&controller, Direction::Right), MoveOutcome::Blocked);
        assert_eq!(fixture.offset, Vec2::ZERO);
        assert_eq!(fixture.movable_rects(), before);
        assert_eq!(fixture.player.rect(), Rect::new(1.0, 11.0, 6.0, 6.0));
        assert_eq!(fixture.player.facing(), Direction::Right);
        assert!(fixture.player.is_animating());

        let mut fixture = Fixture::three_by_three();
        assert_eq!(fixture.step(&controller, Direction::Down), MoveOutcome::Moved);

        let mut fixture = Fixture::three_by_three();
        assert_eq!(fixture.step(&controller, Direction::Left), MoveOutcome::Moved);

        let mut fixture = Fixture::three_by_three();
        assert_eq!(fixture.step(&controller, Direction::Up), MoveOutcome::Moved);
    }

    #[test]
    fn moving_shifts_every_movable_uniformly() {
        let controller = WorldScrollController::default();
        let mut fixture = Fixture::three_by_three();
        let before_obstacle = fixture.obstacles.obstacles()[0].rect;

        assert!(fixture.step(&controller, Direction::Up).moved());

        let delta = Vec2::new(0.0, 3.0);
        assert_eq!(fixture.offset, delta);
        assert_eq!(
            fixture.obstacles.obstacles()[0].rect,
            before_obstacle.translated(delta)
        );
        assert_eq!(fixture.scenery[0].rect, Rect::new(0.0, 3.0, 30.0, 30.0));
        let npc = fixture.entities.all().next().expect("npc");
        assert_eq!(npc.entity().position, Vec2::new(20.0, 23.0));
        assert_eq!(fixture.player.rect(), Rect::new(1.0, 11.0, 6.0, 6.0));
    }

    #[test]
    fn locked_player_does_not_move_or_turn() {
        let controller = WorldScrollController::default();
        let mut fixture = Fixture::three_by_three();
        fixture.player.set_movement_enabled(false);

        assert_eq!(fixture.step(&controller, Direction::Left), MoveOutcome::Locked);
        assert_eq!(fixture.offset, Vec2::ZERO);
        assert_eq!(fixture.player.facing(), Direction::Down);
        assert!(!fixture.player.is_animating());
    }

    #[test]
    fn invalid_speed_falls_back_to_default() {
        assert_eq!(WorldScrollController::new(0.0).move_speed(), DEFAULT_MOVE_SPEED);
        assert_eq!(WorldScrollController::new(f32::NAN).move_speed(), DEFAULT_MOVE_SPEED);
    }
}
