use super::geometry::{Size, Vec2};
use super::interaction::{EntityHandle, InteractionRegistry};

pub const DEFAULT_CAMERA_SMOOTHING: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraTarget {
    Player,
    Entity(EntityHandle),
}

/// Smoothed virtual camera. Its offset is independent of the world scroll;
/// the tracked position is resolved fresh on every update.
#[derive(Debug, Clone)]
pub struct CameraController {
    position: Vec2,
    smoothing: f32,
    viewport: Size,
    target: Option<CameraTarget>,
}

impl CameraController {
    pub fn new(viewport: Size, smoothing: f32) -> Self {
        let smoothing = if smoothing.is_finite() && smoothing > 0.0 && smoothing <= 1.0 {
            smoothing
        } else {
            DEFAULT_CAMERA_SMOOTHING
        };
        Self {
            position: Vec2::ZERO,
            smoothing,
            viewport,
            target: None,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn target(&self) -> Option<CameraTarget> {
        self.target
    }

    pub fn follow(&mut self, target: Option<CameraTarget>) {
        self.target = target;
    }

    /// Offset that centers `tracked` in the viewport.
    pub fn centered_offset(&self, tracked: Vec2) -> Vec2 {
        Vec2::new(
            self.viewport.width / 2.0 - tracked.x,
            self.viewport.height / 2.0 - tracked.y,
        )
    }

    /// Eases toward the tracked position. Returns `false` when there is
    /// nothing to track.
    pub fn update(&mut self, player_position: Vec2, registry: &InteractionRegistry) -> bool {
        let tracked = match self.target {
            None => return false,
            Some(CameraTarget::Player) => player_position,
            Some(CameraTarget::Entity(handle)) => match registry.get(handle) {
                Some(entry) => entry.entity().position,
                None => return false,
            },
        };
        let goal = self.centered_offset(tracked);
        self.position += Vec2::new(
            (goal.x - self.position.x) * self.smoothing,
            (goal.y - self.position.y) * self.smoothing,
        );
        true
    }
}
