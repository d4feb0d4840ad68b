use std::collections::HashMap;

use plaza_engine::world::interaction::{EntityHandle, EntityKind, EntityRole};
use plaza_engine::world::player::InteractionPhase;
use plaza_engine::{
    ConversationEnd, InputSnapshot, InteractionEvent, Scene, SceneCommand, World,
};
use tracing::{debug, info};

const TITLE_PREFIX: &str = "Plaza";
const DIALOGUE_HINT: &str = "SPACE next, ESC leave";
const SILENT_NPC_LINE: &str = "...";

include!("dialogue.rs");
include!("scene_impl.rs");

pub(crate) fn build_town_scene() -> Box<dyn Scene> {
    Box::new(TownScene::new())
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
