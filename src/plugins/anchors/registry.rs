use bevy::{prelude::*, utils::HashMap};

use super::anchor::{Anchor, AnchorId};

#[derive(Debug, Default, Resource)]
/// Every anchor of the current level, in registration order.
///
/// Mutations that change what an anchor looks like are queued so that the presentation system
/// can refresh only the anchors that changed during the tick.
pub struct AnchorRegistry {
    anchors: Vec<Anchor>,
    by_name: HashMap<String, AnchorId>,
    visual_updates: Vec<AnchorId>,
}

impl AnchorRegistry {
    pub fn new() -> AnchorRegistry {
        AnchorRegistry::default()
    }

    pub fn register(&mut self, anchor: Anchor) -> AnchorId {
        let id = AnchorId(self.anchors.len());
        self.by_name.insert(anchor.name().to_owned(), id);
        self.anchors.push(anchor);
        // Make sure the initial look gets applied once the anchor is spawned
        self.visual_updates.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn get(&self, id: AnchorId) -> Option<&Anchor> {
        self.anchors.get(id.0)
    }

    pub fn find_by_name(&self, name: &str) -> Option<AnchorId> {
        self.by_name.get(name).copied()
    }

    /// Iterate over the anchors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (AnchorId, &Anchor)> {
        self.anchors
            .iter()
            .enumerate()
            .map(|(index, anchor)| (AnchorId(index), anchor))
    }

    pub fn lit_anchors(&self) -> impl Iterator<Item = (AnchorId, &Anchor)> {
        self.iter().filter(|(_, anchor)| anchor.is_lit())
    }

    /// The first lit anchor the player stands in. Registration order breaks ties when trigger
    /// volumes overlap.
    pub fn find_occupied_lit_anchor(&self) -> Option<AnchorId> {
        self.iter()
            .find(|(_, anchor)| anchor.is_lit() && anchor.player_inside())
            .map(|(id, _)| id)
    }

    /// The first unlit anchor the player stands in. With a positive `radius`, unlit anchors placed
    /// within that distance of the player also qualify.
    pub fn find_unlit_anchor_near_player(&self, player_position: Vec3, radius: f32) -> Option<AnchorId> {
        self.iter()
            .find(|(_, anchor)| {
                !anchor.is_lit()
                    && (anchor.player_inside()
                        || (radius > 0.
                            && anchor.placement().translation.distance(player_position) <= radius))
            })
            .map(|(id, _)| id)
    }

    pub fn on_volume_enter(&mut self, id: AnchorId) {
        if let Some(anchor) = self.get_mut(id) {
            debug!("Player entered anchor {}", anchor.name());
            anchor.set_player_inside(true);
        }
    }

    pub fn on_volume_exit(&mut self, id: AnchorId) {
        if let Some(anchor) = self.get_mut(id) {
            debug!("Player left anchor {}", anchor.name());
            anchor.set_player_inside(false);
        }
    }

    /// Returns `true` if the anchor went from unlit to lit.
    pub fn light_up(&mut self, id: AnchorId) -> bool {
        let lit = match self.get_mut(id) {
            Some(anchor) => anchor.light_up(),
            None => false,
        };
        if lit {
            self.visual_updates.push(id);
        }
        lit
    }

    pub fn extinguish(&mut self, id: AnchorId) {
        if let Some(anchor) = self.get_mut(id) {
            anchor.extinguish();
            self.visual_updates.push(id);
        }
    }

    pub fn set_selected(&mut self, id: AnchorId, selected: bool) {
        if let Some(anchor) = self.get_mut(id) {
            if anchor.is_selected() != selected {
                anchor.set_selected(selected);
                self.visual_updates.push(id);
            }
        }
    }

    pub fn light_all(&mut self) {
        for index in 0..self.anchors.len() {
            self.light_up(AnchorId(index));
        }
    }

    pub fn extinguish_all(&mut self) {
        for index in 0..self.anchors.len() {
            let id = AnchorId(index);
            if self.anchors[index].is_lit() {
                self.extinguish(id);
            }
        }
    }

    /// Take the anchors whose look changed since the last call. Each anchor is reported once.
    pub fn drain_visual_updates(&mut self) -> Vec<AnchorId> {
        let mut updates = std::mem::take(&mut self.visual_updates);
        updates.sort_unstable();
        updates.dedup();
        updates
    }

    fn get_mut(&mut self, id: AnchorId) -> Option<&mut Anchor> {
        let anchor = self.anchors.get_mut(id.0);
        if anchor.is_none() {
            warn!("Unknown anchor handle {:?}", id);
        }
        anchor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::anchors::bounds::Bounds;

    fn anchor_at(name: &str, x: f32) -> Anchor {
        Anchor::new(
            name,
            Transform::from_xyz(x, 0., 0.),
            Bounds::from_center_half_extents(Vec3::new(x, 1., 0.), Vec3::ONE),
        )
    }

    fn registry(names: &[&str]) -> AnchorRegistry {
        let mut registry = AnchorRegistry::new();
        for (i, name) in names.iter().enumerate() {
            registry.register(anchor_at(name, i as f32 * 10.));
        }
        registry.drain_visual_updates();
        registry
    }

    #[test]
    fn test_register_assigns_sequential_handles() {
        let registry = registry(&["a", "b", "c"]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.find_by_name("b"), Some(AnchorId(1)));
        assert_eq!(registry.get(AnchorId(2)).unwrap().name(), "c");
        assert!(registry.find_by_name("nope").is_none());
    }

    #[test]
    fn test_occupied_lit_anchor_requires_both_flags() {
        let mut registry = registry(&["a", "b"]);
        registry.on_volume_enter(AnchorId(0));
        assert_eq!(registry.find_occupied_lit_anchor(), None);

        registry.light_up(AnchorId(1));
        assert_eq!(registry.find_occupied_lit_anchor(), None);

        registry.light_up(AnchorId(0));
        assert_eq!(registry.find_occupied_lit_anchor(), Some(AnchorId(0)));

        registry.on_volume_exit(AnchorId(0));
        assert_eq!(registry.find_occupied_lit_anchor(), None);
    }

    #[test]
    fn test_occupied_lit_anchor_ties_break_in_registration_order() {
        let mut registry = registry(&["a", "b", "c"]);
        for id in [AnchorId(2), AnchorId(1)] {
            registry.light_up(id);
            registry.on_volume_enter(id);
        }
        assert_eq!(registry.find_occupied_lit_anchor(), Some(AnchorId(1)));
    }

    #[test]
    fn test_unlit_anchor_near_player_by_containment() {
        let mut registry = registry(&["a", "b"]);
        assert_eq!(registry.find_unlit_anchor_near_player(Vec3::ZERO, 0.), None);

        registry.on_volume_enter(AnchorId(1));
        assert_eq!(
            registry.find_unlit_anchor_near_player(Vec3::ZERO, 0.),
            Some(AnchorId(1))
        );

        registry.light_up(AnchorId(1));
        assert_eq!(registry.find_unlit_anchor_near_player(Vec3::ZERO, 0.), None);
    }

    #[test]
    fn test_unlit_anchor_near_player_by_radius() {
        let registry = registry(&["a", "b"]);
        let player = Vec3::new(9., 0., 0.);
        assert_eq!(registry.find_unlit_anchor_near_player(player, 0.), None);
        assert_eq!(registry.find_unlit_anchor_near_player(player, 0.5), None);
        assert_eq!(
            registry.find_unlit_anchor_near_player(player, 2.),
            Some(AnchorId(1))
        );
    }

    #[test]
    fn test_light_up_twice_queues_one_visual_update() {
        let mut registry = registry(&["a"]);
        assert!(registry.light_up(AnchorId(0)));
        assert!(!registry.light_up(AnchorId(0)));
        assert_eq!(registry.drain_visual_updates(), vec![AnchorId(0)]);
        assert!(registry.drain_visual_updates().is_empty());
    }

    #[test]
    fn test_extinguish_unlit_anchor_leaves_state_unchanged() {
        let mut registry = registry(&["a"]);
        registry.extinguish(AnchorId(0));
        assert!(!registry.get(AnchorId(0)).unwrap().is_lit());
    }

    #[test]
    fn test_selection_changes_are_queued_once() {
        let mut registry = registry(&["a", "b"]);
        registry.set_selected(AnchorId(1), true);
        registry.set_selected(AnchorId(1), true);
        assert!(registry.get(AnchorId(1)).unwrap().is_selected());
        assert_eq!(registry.drain_visual_updates(), vec![AnchorId(1)]);

        registry.set_selected(AnchorId(1), false);
        assert_eq!(registry.drain_visual_updates(), vec![AnchorId(1)]);
    }

    #[test]
    fn test_unknown_handles_are_ignored() {
        let mut registry = registry(&["a"]);
        assert!(!registry.light_up(AnchorId(7)));
        registry.extinguish(AnchorId(7));
        registry.on_volume_enter(AnchorId(7));
        registry.set_selected(AnchorId(7), true);
        assert!(registry.drain_visual_updates().is_empty());
        assert!(registry.get(AnchorId(7)).is_none());
    }

    #[test]
    fn test_light_all_and_extinguish_all() {
        let mut registry = registry(&["a", "b", "c"]);
        registry.light_up(AnchorId(1));
        registry.drain_visual_updates();

        registry.light_all();
        assert_eq!(registry.lit_anchors().count(), 3);
        assert_eq!(
            registry.drain_visual_updates(),
            vec![AnchorId(0), AnchorId(2)]
        );

        registry.extinguish_all();
        assert_eq!(registry.lit_anchors().count(), 0);
        assert_eq!(registry.drain_visual_updates().len(), 3);
    }
}
