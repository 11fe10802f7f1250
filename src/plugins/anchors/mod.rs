//! Light anchors: the registry that owns them, the selection index over it, and the systems that
//! connect them to the physics sensors and to their visuals.

use bevy::{prelude::*, reflect::FromReflect, utils::HashSet};
use bevy_rapier3d::prelude::*;
use iyes_loopless::prelude::*;

mod anchor;
mod bounds;
mod registry;
mod selection;

pub use anchor::{Anchor, AnchorId};
pub use bounds::Bounds;
pub use registry::AnchorRegistry;
pub use selection::collect_candidates;

use super::{
    first_person_controller::Player, game::GameState, physics::*, render::RenderResources,
};

const LIT_FLAME_INTENSITY: f32 = 800.;
const FLAME_RANGE: f32 = 12.;
const FLAME_HEIGHT: f32 = 0.8;
const INDICATOR_HEIGHT: f32 = 1.3;

#[derive(Debug)]
pub struct AnchorsPlugin;

impl Plugin for AnchorsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AnchorRegistry>()
            .register_type::<AnchorTrigger>()
            .register_type::<AnchorLamp>()
            .add_system(
                route_anchor_volume_events
                    .run_in_state(GameState::InGame)
                    .label(AnchorLabels::RouteVolumeEvents),
            )
            .add_system(
                sync_anchor_visuals
                    .run_in_state(GameState::InGame)
                    .label(AnchorLabels::SyncVisuals)
                    .after(AnchorLabels::RouteVolumeEvents),
            );
    }
}

#[derive(Debug, Clone, SystemLabel)]
pub enum AnchorLabels {
    RouteVolumeEvents,
    SyncVisuals,
}

#[derive(Debug, Clone, Copy, Default, Component, Reflect, FromReflect)]
#[reflect(Component)]
/// Sensor collider delimiting the volume the player has to stand in to use an anchor.
pub struct AnchorTrigger(pub AnchorId);

#[derive(Debug, Clone, Copy, Default, Component, Reflect, FromReflect)]
#[reflect(Component)]
/// Visual root of an anchor.
pub struct AnchorLamp(pub AnchorId);

#[derive(Debug, Component)]
/// Child entities of an [`AnchorLamp`] updated when the anchor state changes.
pub struct AnchorVisuals {
    pub flame: Entity,
    pub light: Entity,
    pub indicator: Entity,
}

/// Spawn the lamp and the trigger sensor of a registered anchor, returned in that order.
pub fn spawn_anchor(
    commands: &mut Commands,
    render: &RenderResources,
    id: AnchorId,
    anchor: &Anchor,
) -> (Entity, Entity) {
    let flame = commands
        .spawn(PbrBundle {
            mesh: render.flame_mesh.clone(),
            material: render.flame_material.clone(),
            transform: Transform::from_xyz(0., FLAME_HEIGHT, 0.),
            visibility: Visibility { is_visible: false },
            ..default()
        })
        .insert(Name::from("Anchor flame"))
        .id();
    let light = commands
        .spawn(PointLightBundle {
            point_light: PointLight {
                color: Color::rgb(1.0, 0.8, 0.4),
                intensity: 0.,
                range: FLAME_RANGE,
                shadows_enabled: false,
                ..default()
            },
            transform: Transform::from_xyz(0., FLAME_HEIGHT, 0.),
            ..default()
        })
        .insert(Name::from("Anchor light"))
        .id();
    let indicator = commands
        .spawn(PbrBundle {
            mesh: render.indicator_mesh.clone(),
            material: render.indicator_material.clone(),
            transform: Transform::from_xyz(0., INDICATOR_HEIGHT, 0.),
            visibility: Visibility { is_visible: false },
            ..default()
        })
        .insert(Name::from("Anchor selection indicator"))
        .id();

    let lamp = commands
        .spawn(PbrBundle {
            mesh: render.anchor_mesh.clone(),
            material: render.anchor_material(anchor.is_lit()),
            transform: anchor.placement(),
            ..default()
        })
        .insert((
            Name::from(format!("Anchor {}", anchor.name())),
            AnchorLamp(id),
            AnchorVisuals {
                flame,
                light,
                indicator,
            },
        ))
        .push_children(&[flame, light, indicator])
        .id();

    // The sensor is not parented to the lamp so that the lamp rotation does not tilt the box.
    let bounds = anchor.bounds();
    let half_extents = bounds.half_extents();
    let trigger = commands
        .spawn((
            SpatialBundle::from_transform(Transform::from_translation(bounds.center())),
            Name::from(format!("Anchor {} trigger", anchor.name())),
            AnchorTrigger(id),
            Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
            Sensor,
            ActiveEvents::COLLISION_EVENTS,
            CollisionGroups::new(ANCHOR_SENSORS_GROUP, PLAYER_GROUP),
        ))
        .id();

    (lamp, trigger)
}

/// Forward the player enter/exit events of anchor sensors to the registry.
pub fn route_anchor_volume_events(
    mut collisions: EventReader<CollisionEvent>,
    mut registry: ResMut<AnchorRegistry>,
    triggers: Query<&AnchorTrigger>,
    players: Query<(), With<Player>>,
) {
    for collision in collisions.iter() {
        let (collider_a, collider_b, entered) = match collision {
            CollisionEvent::Started(a, b, _flags) => (*a, *b, true),
            CollisionEvent::Stopped(a, b, _flags) => (*a, *b, false),
        };
        let anchor = match (triggers.get(collider_a), triggers.get(collider_b)) {
            (Ok(trigger), _) if players.contains(collider_b) => trigger.0,
            (_, Ok(trigger)) if players.contains(collider_a) => trigger.0,
            _ => continue,
        };
        if entered {
            registry.on_volume_enter(anchor);
        } else {
            registry.on_volume_exit(anchor);
        }
    }
}

/// Apply the lit and selected state of the anchors that changed during this tick.
pub fn sync_anchor_visuals(
    mut registry: ResMut<AnchorRegistry>,
    render: Res<RenderResources>,
    mut lamps: Query<(&AnchorLamp, &AnchorVisuals, &mut Handle<StandardMaterial>)>,
    mut visibilities: Query<&mut Visibility>,
    mut lights: Query<&mut PointLight>,
) {
    let updates: HashSet<AnchorId> = registry.drain_visual_updates().into_iter().collect();
    if updates.is_empty() {
        return;
    }

    for (lamp, visuals, mut material) in &mut lamps {
        if !updates.contains(&lamp.0) {
            continue;
        }
        let anchor = match registry.get(lamp.0) {
            Some(anchor) => anchor,
            None => continue,
        };

        *material = render.anchor_material(anchor.is_lit());
        if let Ok(mut visibility) = visibilities.get_mut(visuals.flame) {
            visibility.is_visible = anchor.is_lit();
        }
        if let Ok(mut light) = lights.get_mut(visuals.light) {
            light.intensity = if anchor.is_lit() {
                LIT_FLAME_INTENSITY
            } else {
                0.
            };
        }
        if let Ok(mut visibility) = visibilities.get_mut(visuals.indicator) {
            visibility.is_visible = anchor.is_selected();
        }
    }
}
