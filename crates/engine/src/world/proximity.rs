use super::geometry::Rect;
use super::interaction::{EntityHandle, InteractionRegistry, InteractionState};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProximityReport {
    pub target: Option<EntityHandle>,
    /// Center distance to the chosen target.
    pub distance: Option<f32>,
    pub in_zone: usize,
    pub indicated: usize,
    pub skipped: usize,
}

/// Picks the single in-zone entity nearest to the player and refreshes every
/// entity's cosmetic interaction state.
#[derive(Debug, Default, Clone)]
pub struct ProximityResolver {
    last_target: Option<EntityHandle>,
}

impl ProximityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_target(&self) -> Option<EntityHandle> {
        self.last_target
    }

    pub fn resolve(&mut self, player: &Rect, registry: &mut InteractionRegistry) -> ProximityReport {
        let player_center = player.center();
        let mut report = ProximityReport::default();
        let mut best: Option<(f32, EntityHandle)> = None;

        for entry in registry.entries_mut() {
            entry.refresh_zone();
            let (Some(rect), Some(zone)) = (entry.entity().rect(), entry.zone()) else {
                entry.state = InteractionState::default();
                report.skipped += 1;
                continue;
            };

            let distance = player_center.distance(rect.center());
            let in_zone = player.overlaps(&zone);
            entry.state = InteractionState {
                is_active: in_zone,
                show_indicator: distance <= entry.proximity_threshold(),
            };
            if entry.state.show_indicator {
                report.indicated += 1;
            }
            if !in_zone {
                continue;
            }
            report.in_zone += 1;
            // Strict comparison keeps the earliest registered entity on ties.
            if best.map_or(true, |(best_distance, _)| distance < best_distance) {
                best = Some((distance, entry.handle()));
            }
        }

        report.target = best.map(|(_, handle)| handle);
        report.distance = best.map(|(distance, _)| distance);
        self.last_target = report.target;
        report
    }
}
