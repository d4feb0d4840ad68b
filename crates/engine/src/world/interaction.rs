use super::geometry::{Rect, Size, Vec2};

pub const DEFAULT_PROXIMITY_THRESHOLD: f32 = 60.0;
pub const NPC_PROMPT: &str = "Press SPACE to talk";
pub const BUILDING_PROMPT: &str = "Press SPACE to enter";

/// Registry-issued identity of an interactive entity. Handles are allocated in
/// registration order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Npc,
    Building,
}

impl EntityKind {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Npc => "npc",
            Self::Building => "building",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NpcProfile {
    pub name: String,
    pub role: String,
    pub personality: String,
    pub dialogue: Vec<String>,
    pub topics: Vec<String>,
    pub scenarios: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingProfile {
    pub building_type: String,
    pub name: String,
    pub description: String,
    pub scenarios: Vec<String>,
    pub prompt: Option<String>,
    pub learning_contexts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityRole {
    Npc(NpcProfile),
    Building(BuildingProfile),
}

impl EntityRole {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Npc(_) => EntityKind::Npc,
            Self::Building(_) => EntityKind::Building,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Npc(profile) => &profile.name,
            Self::Building(profile) => &profile.name,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            Self::Npc(_) => NPC_PROMPT,
            Self::Building(profile) => profile.prompt.as_deref().unwrap_or(BUILDING_PROMPT),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InteractiveEntity {
    pub id: String,
    pub position: Vec2,
    /// Visual footprint; `None` until the sprite dimensions are known.
    pub size: Option<Size>,
    pub role: EntityRole,
}

impl InteractiveEntity {
    pub fn kind(&self) -> EntityKind {
        self.role.kind()
    }

    pub fn rect(&self) -> Option<Rect> {
        self.size
            .map(|size| Rect::from_position_size(self.position, size))
    }
}

/// Per-entity replacement for the registry's default zone policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneOverride {
    pub proximity_threshold: f32,
    /// Explicit zone size. Grown as needed so the zone still covers the entity.
    pub area: Option<Size>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractionState {
    pub is_active: bool,
    pub show_indicator: bool,
}

#[derive(Debug, Clone)]
pub struct RegisteredEntity {
    handle: EntityHandle,
    entity: InteractiveEntity,
    proximity_threshold: f32,
    area: Option<Size>,
    zone: Option<Rect>,
    pub(crate) state: InteractionState,
}

impl RegisteredEntity {
    pub fn handle(&self) -> EntityHandle {
        self.handle
    }

    pub fn entity(&self) -> &InteractiveEntity {
        &self.entity
    }

    pub fn kind(&self) -> EntityKind {
        self.entity.kind()
    }

    pub fn proximity_threshold(&self) -> f32 {
        self.proximity_threshold
    }

    /// Zone as of the last refresh; `None` while the entity size is unknown.
    pub fn zone(&self) -> Option<Rect> {
        self.zone
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub(crate) fn refresh_zone(&mut self) {
        self.zone = self
            .entity
            .rect()
            .map(|rect| derive_zone(rect, self.proximity_threshold, self.area));
    }
}

/// Zone anchored `threshold / 2` above and left of the entity. Without an
/// explicit area it pads the entity by the same amount on every side.
fn derive_zone(entity_rect: Rect, threshold: f32, area: Option<Size>) -> Rect {
    let margin = threshold.max(0.0) / 2.0;
    match area {
        None => entity_rect.expanded(margin),
        Some(area) => Rect::new(
            entity_rect.x - margin,
            entity_rect.y - margin,
            area.width.max(entity_rect.width + margin),
            area.height.max(entity_rect.height + margin),
        ),
    }
}

#[derive(Debug, Clone)]
pub struct InteractionRegistry {
    default_threshold: f32,
    next_handle: u64,
    entries: Vec<RegisteredEntity>,
}

impl Default for InteractionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_PROXIMITY_THRESHOLD)
    }
}

impl InteractionRegistry {
    pub fn new(default_threshold: f32) -> Self {
        Self {
            default_threshold: sanitize_threshold(default_threshold),
            next_handle: 0,
            entries: Vec::new(),
        }
    }

    pub fn default_threshold(&self) -> f32 {
        self.default_threshold
    }

    pub fn register(
        &mut self,
        entity: InteractiveEntity,
        zone_override: Option<ZoneOverride>,
    ) -> EntityHandle {
        let handle = EntityHandle(self.next_handle);
        self.next_handle = self.next_handle.saturating_add(1);
        let (proximity_threshold, area) = match zone_override {
            Some(zone) => (sanitize_threshold(zone.proximity_threshold), zone.area),
            None => (self.default_threshold, None),
        };
        let mut entry = RegisteredEntity {
            handle,
            entity,
            proximity_threshold,
            area,
            zone: None,
            state: InteractionState::default(),
        };
        entry.refresh_zone();
        self.entries.push(entry);
        handle
    }

    pub fn unregister(&mut self, handle: EntityHandle) -> Option<InteractiveEntity> {
        let index = self.entries.iter().position(|entry| entry.handle == handle)?;
        Some(self.entries.remove(index).entity)
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&RegisteredEntity> {
        self.entries.iter().find(|entry| entry.handle == handle)
    }

    pub fn handle_of(&self, id: &str) -> Option<EntityHandle> {
        self.entries
            .iter()
            .find(|entry| entry.entity.id == id)
            .map(|entry| entry.handle)
    }

    /// Fills in the visual size once it is known, e.g. after a sprite loads.
    pub fn set_entity_size(&mut self, handle: EntityHandle, size: Size) -> bool {
        let Some(entry) = self.get_mut(handle) else {
            return false;
        };
        entry.entity.size = Some(size);
        entry.refresh_zone();
        true
    }

    pub fn set_zone_override(&mut self, handle: EntityHandle, zone_override: ZoneOverride) -> bool {
        let Some(entry) = self.get_mut(handle) else {
            return false;
        };
        entry.proximity_threshold = sanitize_threshold(zone_override.proximity_threshold);
        entry.area = zone_override.area;
        entry.refresh_zone();
        true
    }

    /// Entries in registration order.
    pub fn all(&self) -> impl Iterator<Item = &RegisteredEntity> + '_ {
        self.entries.iter()
    }

    pub fn by_kind(&self, kind: EntityKind) -> impl Iterator<Item = &RegisteredEntity> + '_ {
        self.entries.iter().filter(move |entry| entry.kind() == kind)
    }

    pub fn active(&self) -> impl Iterator<Item = &RegisteredEntity> + '_ {
        self.entries.iter().filter(|entry| entry.state.is_active)
    }

    pub fn indicated(&self) -> impl Iterator<Item = &RegisteredEntity> + '_ {
        self.entries.iter().filter(|entry| entry.state.show_indicator)
    }

    /// First registered building of `building_type`.
    pub fn building_by_type<'a>(
        &'a self,
        building_type: &'a str,
    ) -> Option<&'a RegisteredEntity> {
        self.buildings_by_type(building_type).next()
    }

    /// Every building of `building_type`, in registration order.
    pub fn buildings_by_type<'a>(
        &'a self,
        building_type: &'a str,
    ) -> impl Iterator<Item = &'a RegisteredEntity> + 'a {
        self.entries.iter().filter(move |entry| {
            matches!(&entry.entity.role, EntityRole::Building(profile) if profile.building_type == building_type)
        })
    }

    /// Buildings whose anchor position lies within `radius` of `point`.
    pub fn buildings_near(
        &self,
        point: Vec2,
        radius: f32,
    ) -> impl Iterator<Item = &RegisteredEntity> + '_ {
        self.by_kind(EntityKind::Building)
            .filter(move |entry| entry.entity.position.distance(point) <= radius)
    }

    pub fn nearest_building(&self, point: Vec2) -> Option<&RegisteredEntity> {
        let mut best: Option<(f32, &RegisteredEntity)> = None;
        for entry in self.by_kind(EntityKind::Building) {
            let distance = entry.entity.position.distance(point);
            match best {
                Some((best_distance, _)) if best_distance <= distance => {}
                _ => best = Some((distance, entry)),
            }
        }
        best.map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut RegisteredEntity> {
        self.entries.iter_mut().find(|entry| entry.handle == handle)
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [RegisteredEntity] {
        &mut self.entries
    }

    pub(crate) fn translate_all(&mut self, delta: Vec2) {
        for entry in &mut self.entries {
            entry.entity.position += delta;
            if let Some(zone) = entry.zone.as_mut() {
                *zone = zone.translated(delta);
            }
        }
    }
}

fn sanitize_threshold(threshold: f32) -> f32 {
    if threshold.is_finite() && threshold >= 0.0 {
        threshold
    } else {
        DEFAULT_PROXIMITY_THRESHOLD
    }
}
