/// Result of pressing the interact key during a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogueStep {
    Continue,
    Exhausted,
}

/// Offline conversation with one entity: a fixed list of pages stepped
/// through with the interact key.
#[derive(Debug, Clone, PartialEq)]
struct DialogueSession {
    handle: EntityHandle,
    entity_id: String,
    speaker: String,
    pages: Vec<String>,
    index: usize,
}

impl DialogueSession {
    /// `visit` picks which of a building's scenarios is offered this time.
    fn for_role(handle: EntityHandle, entity_id: &str, role: &EntityRole, visit: usize) -> Self {
        let (speaker, pages) = match role {
            EntityRole::Npc(profile) => {
                let mut pages = profile.dialogue.clone();
                if pages.is_empty() {
                    pages.push(SILENT_NPC_LINE.to_string());
                }
                (profile.name.clone(), pages)
            }
            EntityRole::Building(profile) => {
                let mut pages = Vec::new();
                let greeting = if profile.description.is_empty() {
                    format!("Welcome to the {}.", profile.name)
                } else {
                    profile.description.clone()
                };
                pages.push(greeting);
                if !profile.scenarios.is_empty() {
                    let scenario = &profile.scenarios[visit % profile.scenarios.len()];
                    pages.push(format!("Scenario: {scenario}"));
                }
                if !profile.learning_contexts.is_empty() {
                    pages.push(format!(
                        "Practice: {}",
                        profile.learning_contexts.join(", ")
                    ));
                }
                (profile.name.clone(), pages)
            }
        };
        Self {
            handle,
            entity_id: entity_id.to_string(),
            speaker,
            pages,
            index: 0,
        }
    }

    fn current_page(&self) -> &str {
        self.pages
            .get(self.index)
            .map(String::as_str)
            .unwrap_or_default()
    }

    fn advance(&mut self) -> DialogueStep {
        if self.index + 1 < self.pages.len() {
            self.index += 1;
            DialogueStep::Continue
        } else {
            DialogueStep::Exhausted
        }
    }

    fn title_text(&self) -> String {
        format!(
            "{}: {} ({}/{})",
            self.speaker,
            self.current_page(),
            self.index + 1,
            self.pages.len()
        )
    }
}
