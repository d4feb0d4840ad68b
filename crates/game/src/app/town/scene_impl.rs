/// Walk-around scene: scrolls the town, tracks the nearest interactive entity
/// and runs offline dialogue sessions with it.
struct TownScene {
    dialogue: Option<DialogueSession>,
    /// Prompt of the current target while not conversing.
    prompt: Option<String>,
    visits: HashMap<String, usize>,
}

impl TownScene {
    fn new() -> Self {
        Self {
            dialogue: None,
            prompt: None,
            visits: HashMap::new(),
        }
    }

    fn step_conversation(&mut self, input: &InputSnapshot, world: &mut World) {
        if input.cancel_pressed() {
            world.end_conversation(ConversationEnd::Cancelled);
            return;
        }
        if !input.interact_pressed() {
            return;
        }
        let step = match self.dialogue.as_mut() {
            Some(session) => session.advance(),
            None => DialogueStep::Exhausted,
        };
        match step {
            DialogueStep::Continue => {
                if let Some(session) = &self.dialogue {
                    debug!(
                        entity = %session.entity_id,
                        page = session.index + 1,
                        pages = session.pages.len(),
                        "dialogue_advanced"
                    );
                }
            }
            DialogueStep::Exhausted => {
                world.end_conversation(ConversationEnd::DialogueExhausted);
            }
        }
    }

    fn handle_events(&mut self, world: &mut World) {
        for event in world.drain_events() {
            self.handle_event(event, world);
        }
    }

    fn handle_event(&mut self, event: InteractionEvent, world: &World) {
        match event {
            InteractionEvent::TargetAcquired(entity) => {
                self.prompt = world
                    .entities()
                    .get(entity.handle)
                    .map(|entry| prompt_text(&entry.entity().role));
            }
            InteractionEvent::TargetLost(_) => {
                self.prompt = None;
            }
            InteractionEvent::ConversationOpened(entity) => {
                let Some(entry) = world.entities().get(entity.handle) else {
                    return;
                };
                let visits = self.visits.entry(entity.id.clone()).or_insert(0);
                let session = DialogueSession::for_role(
                    entity.handle,
                    &entity.id,
                    &entry.entity().role,
                    *visits,
                );
                *visits += 1;
                info!(
                    entity = %entity.id,
                    kind = entity.kind.as_token(),
                    speaker = %session.speaker,
                    pages = session.pages.len(),
                    "dialogue_started"
                );
                self.dialogue = Some(session);
            }
            InteractionEvent::ConversationClosed { entity, reason } => {
                if self
                    .dialogue
                    .as_ref()
                    .is_some_and(|session| session.handle == entity.handle)
                {
                    self.dialogue = None;
                }
                self.prompt = None;
                debug!(entity = %entity.id, reason = reason.as_token(), "dialogue_ended");
            }
        }
    }
}

impl Scene for TownScene {
    fn load(&mut self, world: &mut World) {
        self.dialogue = None;
        self.prompt = None;
        world.resolve_proximity();
        self.handle_events(world);
        info!(
            npcs = world.entities().by_kind(EntityKind::Npc).count(),
            buildings = world.entities().by_kind(EntityKind::Building).count(),
            "town_loaded"
        );
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut World,
    ) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }

        if world.player().is_conversing() {
            self.step_conversation(input, world);
            world.tick(None);
        } else {
            if input.cancel_pressed() {
                return SceneCommand::Quit;
            }
            world.tick(input.movement_intent());
            if input.interact_pressed() {
                world.interact();
            }
        }

        self.handle_events(world);
        SceneCommand::None
    }

    fn unload(&mut self, world: &mut World) {
        if world.player().is_conversing() {
            world.end_conversation(ConversationEnd::Cancelled);
        }
        self.dialogue = None;
        self.prompt = None;
        info!(visited = self.visits.len(), "town_unloaded");
    }

    fn debug_title(&self, world: &World) -> Option<String> {
        let detail = match (world.player().phase(), &self.dialogue, &self.prompt) {
            (InteractionPhase::Conversing, Some(session), _) => {
                format!("{} | {DIALOGUE_HINT}", session.title_text())
            }
            (InteractionPhase::Approaching, _, Some(prompt)) => prompt.clone(),
            _ => return Some(TITLE_PREFIX.to_string()),
        };
        Some(format!("{TITLE_PREFIX} | {detail}"))
    }
}

fn prompt_text(role: &EntityRole) -> String {
    format!("{} - {}", role.display_name(), role.prompt())
}
