use super::{anchor::AnchorId, registry::AnchorRegistry};

/// Lit anchors whose bounds intersect the selection zone of `source`, in registration order.
///
/// The order is what the player cycles through, so it must not depend on distances or on the
/// camera position.
pub fn collect_candidates(registry: &AnchorRegistry, source: AnchorId) -> Vec<AnchorId> {
    let zone = match registry.get(source).and_then(|anchor| anchor.selection_zone()) {
        Some(zone) => zone,
        None => return Vec::new(),
    };

    registry
        .lit_anchors()
        .filter(|(id, anchor)| *id != source && anchor.bounds().intersects(&zone))
        .map(|(id, _)| id)
        .collect()
}

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::*;
    use crate::plugins::anchors::{anchor::Anchor, bounds::Bounds};

    fn anchor(name: &str, position: Vec3, zone_half_extents: Option<f32>) -> Anchor {
        let anchor = Anchor::new(
            name,
            Transform::from_translation(position),
            Bounds::from_center_half_extents(position, Vec3::splat(0.5)),
        );
        match zone_half_extents {
            Some(half) => anchor.with_selection_zone(Bounds::from_center_half_extents(
                position,
                Vec3::splat(half),
            )),
            None => anchor,
        }
    }

    #[test]
    fn test_unlit_anchors_are_not_candidates() {
        let mut registry = AnchorRegistry::new();
        let a = registry.register(anchor("a", Vec3::ZERO, Some(10.)));
        let b = registry.register(anchor("b", Vec3::new(3., 0., 0.), None));
        let c = registry.register(anchor("c", Vec3::new(-3., 0., 0.), None));
        registry.light_up(a);
        registry.light_up(b);

        assert_eq!(collect_candidates(&registry, a), vec![b]);
        assert!(!collect_candidates(&registry, a).contains(&c));
    }

    #[test]
    fn test_source_is_never_its_own_candidate() {
        let mut registry = AnchorRegistry::new();
        let a = registry.register(anchor("a", Vec3::ZERO, Some(10.)));
        registry.light_up(a);
        assert!(collect_candidates(&registry, a).is_empty());
    }

    #[test]
    fn test_missing_selection_zone_yields_no_candidates() {
        let mut registry = AnchorRegistry::new();
        let a = registry.register(anchor("a", Vec3::ZERO, None));
        let b = registry.register(anchor("b", Vec3::X, None));
        registry.light_all();
        assert!(collect_candidates(&registry, a).is_empty());
        assert!(collect_candidates(&registry, b).is_empty());
    }

    #[test]
    fn test_out_of_range_anchors_are_excluded() {
        let mut registry = AnchorRegistry::new();
        let a = registry.register(anchor("a", Vec3::ZERO, Some(5.)));
        let near = registry.register(anchor("near", Vec3::new(0., 0., 5.2), None));
        registry.register(anchor("far", Vec3::new(0., 0., 20.), None));
        registry.light_all();
        assert_eq!(collect_candidates(&registry, a), vec![near]);
    }

    #[test]
    fn test_candidates_follow_registration_order() {
        let mut registry = AnchorRegistry::new();
        let far = registry.register(anchor("far", Vec3::new(8., 0., 0.), None));
        let source = registry.register(anchor("source", Vec3::ZERO, Some(10.)));
        let near = registry.register(anchor("near", Vec3::new(1., 0., 0.), None));
        registry.light_all();
        assert_eq!(collect_candidates(&registry, source), vec![far, near]);
    }

    #[test]
    fn test_selection_is_symmetric_for_overlapping_zones() {
        let mut registry = AnchorRegistry::new();
        let a = registry.register(anchor("a", Vec3::ZERO, Some(4.)));
        let b = registry.register(anchor("b", Vec3::new(4., 0., 0.), Some(4.)));
        registry.light_all();
        assert!(collect_candidates(&registry, a).contains(&b));
        assert!(collect_candidates(&registry, b).contains(&a));
    }

    #[test]
    fn test_unknown_source_yields_no_candidates() {
        let registry = AnchorRegistry::new();
        assert!(collect_candidates(&registry, AnchorId(3)).is_empty());
    }
}
