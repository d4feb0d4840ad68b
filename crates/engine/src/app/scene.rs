use crate::world::player::Direction;
use crate::world::World;

use super::input::ActionStates;
use super::InputAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// Input state sampled once per simulation tick. Press flags are edges: they
/// are set for exactly one tick per physical press.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    movement_intent: Option<Direction>,
    interact_pressed: bool,
    cancel_pressed: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        movement_intent: Option<Direction>,
        interact_pressed: bool,
        cancel_pressed: bool,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            movement_intent,
            interact_pressed,
            cancel_pressed,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn movement_intent(&self) -> Option<Direction> {
        self.movement_intent
    }

    pub fn interact_pressed(&self) -> bool {
        self.interact_pressed
    }

    pub fn cancel_pressed(&self) -> bool {
        self.cancel_pressed
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_movement_intent(mut self, movement_intent: Option<Direction>) -> Self {
        self.movement_intent = movement_intent;
        self
    }

    pub fn with_interact_pressed(mut self, interact_pressed: bool) -> Self {
        self.interact_pressed = interact_pressed;
        self
    }

    pub fn with_cancel_pressed(mut self, cancel_pressed: bool) -> Self {
        self.cancel_pressed = cancel_pressed;
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut World);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut World,
    ) -> SceneCommand;
    fn render(&mut self, _world: &World) {}
    fn unload(&mut self, world: &mut World);
    fn debug_title(&self, _world: &World) -> Option<String> {
        None
    }
}
