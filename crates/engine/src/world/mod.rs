//! Movement resolution and proximity interaction for a screen-fixed player in
//! a scrolling tile world.

pub mod builder;
pub mod camera;
pub mod collision;
pub mod geometry;
pub mod interaction;
pub mod player;
pub mod proximity;
pub mod scroll;
pub mod tilemap;

use tracing::{debug, info};

use camera::{CameraController, CameraTarget, DEFAULT_CAMERA_SMOOTHING};
use collision::CollisionField;
use geometry::{Rect, Size, Vec2};
use interaction::{
    EntityHandle, EntityKind, InteractionRegistry, RegisteredEntity, DEFAULT_PROXIMITY_THRESHOLD,
};
use player::{Direction, Player, TargetChange};
use proximity::{ProximityReport, ProximityResolver};
use scroll::{MoveOutcome, Movables, SceneryLayer, WorldScrollController, DEFAULT_MOVE_SPEED};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldConfig {
    pub move_speed: f32,
    pub proximity_threshold: f32,
    pub camera_smoothing: f32,
    pub viewport: Size,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            move_speed: DEFAULT_MOVE_SPEED,
            proximity_threshold: DEFAULT_PROXIMITY_THRESHOLD,
            camera_smoothing: DEFAULT_CAMERA_SMOOTHING,
            viewport: Size::new(1024.0, 576.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationEnd {
    DialogueExhausted,
    Cancelled,
}

impl ConversationEnd {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::DialogueExhausted => "dialogue_exhausted",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Identity of the entity an event refers to, copied out so consumers do not
/// need to hold the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub handle: EntityHandle,
    pub id: String,
    pub kind: EntityKind,
}

impl EntityRef {
    fn from_entry(entry: &RegisteredEntity) -> Self {
        Self {
            handle: entry.handle(),
            id: entry.entity().id.clone(),
            kind: entry.kind(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEvent {
    TargetAcquired(EntityRef),
    TargetLost(EntityRef),
    ConversationOpened(EntityRef),
    ConversationClosed {
        entity: EntityRef,
        reason: ConversationEnd,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub movement: Option<MoveOutcome>,
    pub proximity: ProximityReport,
}

/// Owns every collection the tick touches. Built once by
/// [`builder::build_world`] or directly from parts in tests.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    obstacles: CollisionField,
    entities: InteractionRegistry,
    scenery: Vec<SceneryLayer>,
    player: Player,
    scroll: WorldScrollController,
    resolver: ProximityResolver,
    camera: CameraController,
    offset: Vec2,
    events: Vec<InteractionEvent>,
    /// Identity of the current target or conversation partner, kept so its
    /// loss can be reported after it leaves the registry.
    target_ref: Option<EntityRef>,
    tick_count: u64,
    last_tick: Option<TickReport>,
}

impl World {
    pub fn new(
        config: WorldConfig,
        obstacles: CollisionField,
        entities: InteractionRegistry,
        scenery: Vec<SceneryLayer>,
        player_rect: Rect,
    ) -> Self {
        let mut camera = CameraController::new(config.viewport, config.camera_smoothing);
        camera.follow(Some(CameraTarget::Player));
        Self {
            config,
            obstacles,
            entities,
            scenery,
            player: Player::new(player_rect),
            scroll: WorldScrollController::new(config.move_speed),
            resolver: ProximityResolver::new(),
            camera,
            offset: Vec2::ZERO,
            events: Vec::new(),
            target_ref: None,
            tick_count: 0,
            last_tick: None,
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn obstacles(&self) -> &CollisionField {
        &self.obstacles
    }

    pub fn entities(&self) -> &InteractionRegistry {
        &self.entities
    }

    /// Mutable registry access for late registration or size updates.
    pub fn entities_mut(&mut self) -> &mut InteractionRegistry {
        &mut self.entities
    }

    pub fn scenery(&self) -> &[SceneryLayer] {
        &self.scenery
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    /// Accumulated world scroll since construction.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn last_tick(&self) -> Option<&TickReport> {
        self.last_tick.as_ref()
    }

    pub fn target(&self) -> Option<&RegisteredEntity> {
        self.player
            .target()
            .and_then(|handle| self.entities.get(handle))
    }

    pub fn try_move(&mut self, direction: Direction) -> MoveOutcome {
        self.scroll.try_move(
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

    pub fn resolve_proximity(&mut self) -> ProximityReport {
        let report = self
            .resolver
            .resolve(&self.player.rect(), &mut self.entities);
        match self.player.set_interaction_target(report.target) {
            TargetChange::Unchanged => {}
            TargetChange::Acquired(to) => self.emit_target_acquired(to, report.distance),
            TargetChange::Switched { from, to } => {
                self.emit_target_lost(from);
                self.emit_target_acquired(to, report.distance);
            }
            TargetChange::Lost(from) => self.emit_target_lost(from),
        }
        report
    }

    /// Opens a conversation with the current target. A no-op without one.
    pub fn interact(&mut self) -> Option<EntityHandle> {
        let handle = self.player.target()?;
        let Some(entity) = self.entities.get(handle).map(EntityRef::from_entry) else {
            // Target was unregistered since the last resolve.
            if let TargetChange::Lost(from) = self.player.set_interaction_target(None) {
                self.emit_target_lost(from);
            }
            return None;
        };
        self.player.begin_conversation()?;
        info!(
            entity = %entity.id,
            kind = entity.kind.as_token(),
            "conversation_opened"
        );
        self.events.push(InteractionEvent::ConversationOpened(entity));
        Some(handle)
    }

    pub fn end_conversation(&mut self, reason: ConversationEnd) -> Option<EntityHandle> {
        let handle = self.player.end_conversation()?;
        let Some(entity) = self.take_target_ref(handle) else {
            debug!(handle = handle.0, "conversation_closed_without_partner");
            return Some(handle);
        };
        info!(
            entity = %entity.id,
            reason = reason.as_token(),
            "conversation_closed"
        );
        self.events
            .push(InteractionEvent::ConversationClosed { entity, reason });
        Some(handle)
    }

    /// One simulation step: move (if asked), resolve proximity, ease the camera.
    pub fn tick(&mut self, intent: Option<Direction>) -> TickReport {
        self.tick_count = self.tick_count.saturating_add(1);
        let movement = match intent {
            Some(direction) => Some(self.try_move(direction)),
            None => {
                self.player.stop_animating();
                None
            }
        };
        let proximity = self.resolve_proximity();
        let player_position = self.player.rect().position();
        self.camera.update(player_position, &self.entities);
        let report = TickReport {
            movement,
            proximity,
        };
        self.last_tick = Some(report);
        report
    }

    pub fn drain_events(&mut self) -> Vec<InteractionEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit_target_acquired(&mut self, handle: EntityHandle, distance: Option<f32>) {
        let Some(entry) = self.entities.get(handle) else {
            return;
        };
        let entity = EntityRef::from_entry(entry);
        debug!(
            entity = %entity.id,
            kind = entity.kind.as_token(),
            distance = distance.unwrap_or_default(),
            "target_acquired"
        );
        self.target_ref = Some(entity.clone());
        self.events.push(InteractionEvent::TargetAcquired(entity));
    }

    fn emit_target_lost(&mut self, handle: EntityHandle) {
        let Some(entity) = self.take_target_ref(handle) else {
            return;
        };
        debug!(entity = %entity.id, "target_lost");
        self.events.push(InteractionEvent::TargetLost(entity));
    }

    /// The remembered identity for `handle`, falling back to the registry.
    fn take_target_ref(&mut self, handle: EntityHandle) -> Option<EntityRef> {
        self.target_ref
            .take()
            .filter(|entity| entity.handle == handle)
            .or_else(|| self.entities.get(handle).map(EntityRef::from_entry))
    }
}
