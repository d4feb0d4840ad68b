use crate::world::player::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Interact,
    Cancel,
}

const ACTION_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Interact => 4,
            InputAction::Cancel => 5,
        }
    }

    pub const fn direction(self) -> Option<Direction> {
        match self {
            InputAction::MoveUp => Some(Direction::Up),
            InputAction::MoveDown => Some(Direction::Down),
            InputAction::MoveLeft => Some(Direction::Left),
            InputAction::MoveRight => Some(Direction::Right),
            InputAction::Interact | InputAction::Cancel => None,
        }
    }
}

/// Held movement directions in press order. The most recent press that is
/// still held wins.
#[derive(Debug, Clone, Default)]
pub(crate) struct HeldDirections {
    order: Vec<Direction>,
}

impl HeldDirections {
    pub(crate) fn press(&mut self, direction: Direction) {
        self.order.retain(|held| *held != direction);
        self.order.push(direction);
    }

    pub(crate) fn release(&mut self, direction: Direction) {
        self.order.retain(|held| *held != direction);
    }

    pub(crate) fn current(&self) -> Option<Direction> {
        self.order.last().copied()
    }
}
