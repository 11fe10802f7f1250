use bevy::{prelude::*, reflect::FromReflect};

use super::bounds::Bounds;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Reflect, FromReflect,
)]
/// Stable handle of an anchor inside the [`AnchorRegistry`](super::AnchorRegistry). This is the
/// registration index, so iterating handles in increasing order is registration order.
pub struct AnchorId(pub usize);

#[derive(Debug, Clone, PartialEq)]
/// A light anchor placed in the level.
pub struct Anchor {
    name: String,
    lit: bool,
    player_inside: bool,
    selected: bool,
    placement: Transform,
    view_point: Transform,
    exit_point: Option<Transform>,
    trigger: Bounds,
    selection_zone: Option<Bounds>,
}

impl Anchor {
    /// Create an unlit anchor. The view point defaults to the placement pose.
    pub fn new(name: impl Into<String>, placement: Transform, trigger: Bounds) -> Anchor {
        Anchor {
            name: name.into(),
            lit: false,
            player_inside: false,
            selected: false,
            placement,
            view_point: placement,
            exit_point: None,
            trigger,
            selection_zone: None,
        }
    }

    pub fn with_view_point(mut self, view_point: Transform) -> Anchor {
        self.view_point = view_point;
        self
    }

    pub fn with_exit_point(mut self, exit_point: Transform) -> Anchor {
        self.exit_point = Some(exit_point);
        self
    }

    pub fn with_selection_zone(mut self, zone: Bounds) -> Anchor {
        self.selection_zone = Some(zone);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn player_inside(&self) -> bool {
        self.player_inside
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn placement(&self) -> Transform {
        self.placement
    }

    pub fn view_point(&self) -> Transform {
        self.view_point
    }

    pub fn exit_point(&self) -> Option<Transform> {
        self.exit_point
    }

    /// Bounds of the trigger volume.
    pub fn bounds(&self) -> Bounds {
        self.trigger
    }

    pub fn selection_zone(&self) -> Option<Bounds> {
        self.selection_zone
    }

    /// Where a player arriving at this anchor is placed: the exit point, or the anchor itself.
    pub fn teleport_point(&self) -> Transform {
        self.exit_point.unwrap_or(self.placement)
    }

    /// Returns `true` if the anchor was unlit.
    pub fn light_up(&mut self) -> bool {
        if self.lit {
            return false;
        }
        self.lit = true;
        true
    }

    pub fn extinguish(&mut self) {
        self.lit = false;
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(super) fn set_player_inside(&mut self, inside: bool) {
        self.player_inside = inside;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lamp() -> Anchor {
        Anchor::new(
            "lamp",
            Transform::from_xyz(4.0, 0.0, 2.0),
            Bounds::from_center_half_extents(Vec3::new(4.0, 1.0, 2.0), Vec3::ONE),
        )
    }

    #[test]
    fn test_new_anchor_is_unlit() {
        let anchor = lamp();
        assert!(!anchor.is_lit());
        assert!(!anchor.player_inside());
        assert!(!anchor.is_selected());
        assert!(anchor.selection_zone().is_none());
    }

    #[test]
    fn test_light_up_is_idempotent() {
        let mut anchor = lamp();
        assert!(anchor.light_up());
        assert!(!anchor.light_up());
        assert!(anchor.is_lit());
    }

    #[test]
    fn test_extinguish_unlit_anchor_keeps_state() {
        let mut anchor = lamp();
        anchor.extinguish();
        assert!(!anchor.is_lit());

        anchor.light_up();
        anchor.extinguish();
        anchor.extinguish();
        assert!(!anchor.is_lit());
    }

    #[test]
    fn test_selection_is_cosmetic() {
        let mut anchor = lamp();
        anchor.set_player_inside(true);
        anchor.set_selected(true);
        assert!(anchor.is_selected());
        assert!(!anchor.is_lit());
        assert!(anchor.player_inside());
    }

    #[test]
    fn test_teleport_point_falls_back_to_placement() {
        let anchor = lamp();
        assert_eq!(anchor.teleport_point(), Transform::from_xyz(4.0, 0.0, 2.0));

        let exit = Transform::from_xyz(5.0, 0.0, 3.0);
        let anchor = anchor.with_exit_point(exit);
        assert_eq!(anchor.teleport_point(), exit);
    }

    #[test]
    fn test_view_point_defaults_to_placement() {
        let anchor = lamp();
        assert_eq!(anchor.view_point(), anchor.placement());

        let view = Transform::from_xyz(4.0, 1.6, 2.0);
        assert_eq!(anchor.with_view_point(view).view_point(), view);
    }
}
