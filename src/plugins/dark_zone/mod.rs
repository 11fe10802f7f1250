use bevy::{prelude::*, reflect::FromReflect};
use bevy_rapier3d::prelude::*;
use iyes_loopless::prelude::*;

use super::{
    anchors::{AnchorId, AnchorRegistry},
    game::GameState,
    level::DarkZoneLayout,
    physics::*,
    render::RenderResources,
    teleport::TeleportLabels,
};

pub struct DarkZonePlugin;

impl Plugin for DarkZonePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<DarkZone>()
            .register_type::<DarkZoneBlocker>()
            .add_system(
                clear_dark_zones
                    .run_in_state(GameState::InGame)
                    .after(TeleportLabels::Drive),
            );
    }
}

#[derive(Debug, Default, Component, Reflect, FromReflect)]
#[reflect(Component)]
/// Darkness blocking the way until the controlling anchor is lit. Once cleared, it stays cleared.
pub struct DarkZone {
    pub controlling_anchor: AnchorId,
    pub cleared: bool,
    pub blockers: Vec<Entity>,
}

impl DarkZone {
    pub fn should_clear(&self, registry: &AnchorRegistry) -> bool {
        !self.cleared
            && registry
                .get(self.controlling_anchor)
                .map_or(false, |anchor| anchor.is_lit())
    }
}

#[derive(Debug, Default, Component, Reflect, FromReflect)]
#[reflect(Component)]
pub struct DarkZoneBlocker;

pub fn spawn_dark_zone(
    commands: &mut Commands,
    render: &RenderResources,
    layout: &DarkZoneLayout,
) -> Entity {
    let blockers = layout
        .blockers
        .iter()
        .enumerate()
        .map(|(i, bounds)| {
            commands
                .spawn(PbrBundle {
                    mesh: render.dark_zone_mesh.clone(),
                    material: render.dark_zone_material.clone(),
                    transform: Transform::from_translation(bounds.center())
                        .with_scale(bounds.half_extents() * 2.),
                    ..default()
                })
                .insert((
                    Name::from(format!("{} blocker {}", layout.name, i)),
                    DarkZoneBlocker,
                    RigidBody::Fixed,
                    // Scaled by the transform
                    Collider::cuboid(0.5, 0.5, 0.5),
                    CollisionGroups::new(DARK_ZONE_BLOCKERS_GROUP, PLAYER_GROUP),
                ))
                .id()
        })
        .collect::<Vec<_>>();

    commands
        .spawn(SpatialBundle::default())
        .insert((
            Name::from(format!("Dark zone {}", layout.name)),
            DarkZone {
                controlling_anchor: layout.controlling_anchor,
                cleared: false,
                blockers: blockers.clone(),
            },
        ))
        .push_children(&blockers)
        .id()
}

fn clear_dark_zones(
    mut commands: Commands,
    registry: Res<AnchorRegistry>,
    mut zones: Query<(&Name, &mut DarkZone)>,
    mut blockers: Query<&mut Visibility, With<DarkZoneBlocker>>,
) {
    for (name, mut zone) in &mut zones {
        if !zone.should_clear(&registry) {
            continue;
        }

        info!("{} cleared", name);
        zone.cleared = true;
        for blocker in &zone.blockers {
            commands.entity(*blocker).remove::<Collider>();
            if let Ok(mut visibility) = blockers.get_mut(*blocker) {
                visibility.is_visible = false;
            }
        }
    }
}
