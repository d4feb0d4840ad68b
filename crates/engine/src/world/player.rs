use super::geometry::Rect;
use super::interaction::EntityHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    pub fn as_token(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionPhase {
    Exploring,
    Approaching,
    Conversing,
}

impl InteractionPhase {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Exploring => "exploring",
            Self::Approaching => "approaching",
            Self::Conversing => "conversing",
        }
    }
}

/// What a target update did to the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetChange {
    Unchanged,
    Acquired(EntityHandle),
    Switched {
        from: EntityHandle,
        to: EntityHandle,
    },
    Lost(EntityHandle),
}

/// Screen-fixed player. Holds the interaction target as a handle only; the
/// registry owns the entity.
#[derive(Debug, Clone)]
pub struct Player {
    rect: Rect,
    phase: InteractionPhase,
    target: Option<EntityHandle>,
    movement_enabled: bool,
    facing: Direction,
    animating: bool,
}

impl Player {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            phase: InteractionPhase::Exploring,
            target: None,
            movement_enabled: true,
            facing: Direction::Down,
            animating: false,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn phase(&self) -> InteractionPhase {
        self.phase
    }

    pub fn target(&self) -> Option<EntityHandle> {
        self.target
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn is_conversing(&self) -> bool {
        self.phase == InteractionPhase::Conversing
    }

    pub fn can_move(&self) -> bool {
        self.movement_enabled && !self.is_conversing()
    }

    pub fn set_movement_enabled(&mut self, enabled: bool) {
        self.movement_enabled = enabled;
    }

    pub fn face(&mut self, direction: Direction) {
        self.facing = direction;
        self.animating = true;
    }

    pub fn stop_animating(&mut self) {
        self.animating = false;
    }

    /// Applies the resolver's pick. Ignored while conversing.
    pub fn set_interaction_target(&mut self, target: Option<EntityHandle>) -> TargetChange {
        if self.is_conversing() {
            return TargetChange::Unchanged;
        }
        let previous = self.target;
        self.target = target;
        self.phase = if target.is_some() {
            InteractionPhase::Approaching
        } else {
            InteractionPhase::Exploring
        };
        match (previous, target) {
            (None, Some(to)) => TargetChange::Acquired(to),
            (Some(from), Some(to)) if from != to => TargetChange::Switched { from, to },
            (Some(from), None) => TargetChange::Lost(from),
            _ => TargetChange::Unchanged,
        }
    }

    /// Enters CONVERSING with the current target. Returns the partner, or
    /// `None` when there is nothing to talk to.
    pub fn begin_conversation(&mut self) -> Option<EntityHandle> {
        if self.phase != InteractionPhase::Approaching {
            return None;
        }
        let partner = self.target?;
        self.phase = InteractionPhase::Conversing;
        self.movement_enabled = false;
        self.animating = false;
        Some(partner)
    }

    /// Leaves CONVERSING. Returns the former partner.
    pub fn end_conversation(&mut self) -> Option<EntityHandle> {
        if !self.is_conversing() {
            return None;
        }
        self.phase = InteractionPhase::Exploring;
        self.movement_enabled = true;
        self.target.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(Rect::new(0.0, 0.0, 10.0, 10.0))
    }

    #[test]
    fn target_drives_exploring_and_approaching() {
        let mut player = player();
        assert_eq!(
            player.set_interaction_target(Some(EntityHandle(3))),
            TargetChange::Acquired(EntityHandle(3))
        );
        assert_eq!(player.phase(), InteractionPhase::Approaching);

        assert_eq!(
            player.set_interaction_target(Some(EntityHandle(4))),
            TargetChange::Switched {
                from: EntityHandle(3),
                to: EntityHandle(4)
            }
        );
        assert_eq!(
            player.set_interaction_target(None),
            TargetChange::Lost(EntityHandle(4))
        );
        assert_eq!(player.phase(), InteractionPhase::Exploring);
    }

    #[test]
    fn conversation_locks_movement_and_target() {
        let mut player = player();
        player.face(Direction::Left);
        player.set_interaction_target(Some(EntityHandle(1)));

        assert_eq!(player.begin_conversation(), Some(EntityHandle(1)));
        assert!(!player.can_move());
        assert!(!player.is_animating());
        assert_eq!(
            player.set_interaction_target(None),
            TargetChange::Unchanged
        );
        assert_eq!(player.target(), Some(EntityHandle(1)));

        assert_eq!(player.end_conversation(), Some(EntityHandle(1)));
        assert!(player.can_move());
        assert_eq!(player.target(), None);
        assert_eq!(player.phase(), InteractionPhase::Exploring);
    }

    #[test]
    fn begin_without_target_is_noop() {
        let mut player = player();
        assert_eq!(player.begin_conversation(), None);
        assert_eq!(player.phase(), InteractionPhase::Exploring);
        assert!(player.can_move());
        assert_eq!(player.end_conversation(), None);
    }

    #[test]
    fn disabled_movement_blocks_without_conversation() {
        let mut player = player();
        player.set_movement_enabled(false);
        assert!(!player.can_move());
        player.set_movement_enabled(true);
        assert!(player.can_move());
    }
}
