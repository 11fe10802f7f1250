//! First person locomotion of the player: walking, aiming, and the movement lock applied while
//! choosing or flying to an anchor.
//!
//! TODO: jumping, so that low walls between anchors can be crossed on foot.

use bevy::{prelude::*, reflect::FromReflect, render::camera::Projection};
use bevy_rapier3d::prelude::*;
use euclid::Angle;
use leafwing_input_manager::prelude::*;

use crate::plugins::{input::default_input_map, physics::*, render::RenderResources};

use super::input::Actions;

#[derive(Debug)]
/// First person controller plugin, which registers the required systems to use the first person
/// controller also provided by this module.
pub struct FirstPersonControllerPlugin;

impl Plugin for FirstPersonControllerPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Player>()
            .register_type::<PlayerCamera>()
            .register_type::<PlayerVisualRoot>()
            .add_system(spawn_controller.label(FirstPersonLabels::SpawnControllers))
            .add_system(apply_movement_lock.label(FirstPersonLabels::ApplyMovementLock))
            .add_system(
                process_controller_inputs
                    .label(FirstPersonLabels::ProcessInputs)
                    .after(FirstPersonLabels::ApplyMovementLock),
            );
    }
}

#[derive(Debug, Clone, SystemLabel)]
/// Labels for the first person controller systems.
pub enum FirstPersonLabels {
    SpawnControllers,
    ApplyMovementLock,
    ProcessInputs,
}

#[derive(Debug, Component)]
/// First person controller component.
pub struct FirstPersonController {
    pub theta: Angle<f32>,
    pub phi: Angle<f32>,
    pub camera_anchor: Entity,
    movement_enabled: bool,
}

impl FirstPersonController {
    pub fn new(camera_anchor: Entity) -> FirstPersonController {
        FirstPersonController {
            theta: Angle::zero(),
            phi: Angle::zero(),
            camera_anchor,
            movement_enabled: true,
        }
    }

    pub fn movement_enabled(&self) -> bool {
        self.movement_enabled
    }

    /// While disabled the body ignores inputs and gravity, so that it can be placed freely.
    pub fn set_movement_enabled(&mut self, enabled: bool) {
        self.movement_enabled = enabled;
    }
}

#[derive(Debug, Default, Component, Reflect, FromReflect)]
#[reflect(Component)]
/// Marker for the player body, the collider that enters anchor triggers.
pub struct Player;

#[derive(Debug, Default, Component, Reflect, FromReflect)]
#[reflect(Component)]
/// Marker for the camera attached to the player.
pub struct PlayerCamera;

#[derive(Debug, Default, Component, Reflect, FromReflect)]
#[reflect(Component)]
/// Marker for the visible part of the player, hidden while teleporting.
pub struct PlayerVisualRoot;

#[derive(Debug, Component, Default, Reflect, FromReflect)]
#[reflect(Component)]
pub struct FirstPersonControllerSpawner {}

#[derive(Debug, Bundle, Default)]
pub struct FirstPersonControllerBundle {
    #[bundle]
    pub spatial: SpatialBundle,
    pub spawner: FirstPersonControllerSpawner,
}

const PLAYER_HEIGHT: f32 = 1.8;
const PLAYER_RADIUS: f32 = 0.4;
const EYE_HEIGHT: f32 = 1.25;

fn spawn_controller(
    mut commands: Commands,
    render: Res<RenderResources>,
    spawners_query: Query<Entity, With<FirstPersonControllerSpawner>>,
) {
    for id in &spawners_query {
        const CAMERA_OFFSET: Vec3 = Vec3::new(0., EYE_HEIGHT - PLAYER_HEIGHT / 2., 0.);

        commands
            .entity(id)
            .insert(InputManagerBundle {
                action_state: ActionState::default(),
                input_map: default_input_map(),
            })
            .insert((
                RigidBody::Dynamic,
                Collider::capsule_y(PLAYER_HEIGHT / 2. - PLAYER_RADIUS, PLAYER_RADIUS),
                LockedAxes::ROTATION_LOCKED_X | LockedAxes::ROTATION_LOCKED_Z,
                Velocity::default(),
                // Sensors keep reporting the anchor triggers while the body is kinematic
                ActiveCollisionTypes::default() | ActiveCollisionTypes::KINEMATIC_STATIC,
                Name::from("Player"),
                CollisionGroups::new(PLAYER_GROUP, ALL_GROUPS),
                Player,
            ));

        let camera_anchor = commands
            .spawn(SpatialBundle::from(Transform::from_translation(
                CAMERA_OFFSET,
            )))
            .insert(Name::from("Camera anchor"))
            .id();

        let camera = commands
            .spawn(Camera3dBundle {
                projection: Projection::Perspective(PerspectiveProjection {
                    fov: std::f32::consts::FRAC_PI_4,
                    near: 0.1,
                    far: 1000.,
                    ..default()
                }),
                ..default()
            })
            .insert((Name::from("Player camera"), PlayerCamera))
            .id();

        let visual_root = commands
            .spawn(PbrBundle {
                mesh: render.player_mesh.clone(),
                material: render.player_material.clone(),
                ..default()
            })
            .insert((Name::from("Player body"), PlayerVisualRoot))
            .id();

        commands.entity(camera_anchor).push_children(&[camera]);

        commands
            .entity(id)
            .push_children(&[camera_anchor, visual_root])
            .insert(FirstPersonController::new(camera_anchor));

        commands.entity(id).remove::<FirstPersonControllerSpawner>();
    }
}

/// Freeze the body while its movement is disabled, and hand it back to the physics afterwards.
fn apply_movement_lock(
    mut player_query: Query<
        (&FirstPersonController, &mut RigidBody, &mut Velocity),
        Changed<FirstPersonController>,
    >,
) {
    for (controller, mut body, mut velocity) in &mut player_query {
        let wanted = if controller.movement_enabled() {
            RigidBody::Dynamic
        } else {
            RigidBody::KinematicPositionBased
        };
        if *body != wanted {
            debug!("Player body is now {:?}", wanted);
            *body = wanted;
            *velocity = Velocity::zero();
        }
    }
}

const PLAYER_SPEED: f32 = 3.;
const MOUSE_SENSITIVITY: f32 = 0.004;
const MOUSE_ANGVEL_MULTIPLIER: f32 = -75.;
const SPRINT_MULTIPLIER: f32 = 2.;

/// Signed speed along an axis given the two opposite inputs.
fn axis_speed(positive: bool, negative: bool, sprint: bool) -> f32 {
    let k = if sprint { SPRINT_MULTIPLIER } else { 1. };
    match (positive, negative) {
        (true, false) => PLAYER_SPEED * k,
        (false, true) => -PLAYER_SPEED * k,
        _ => 0.,
    }
}

fn process_controller_inputs(
    mut player_query: Query<(
        &ActionState<Actions>,
        &mut FirstPersonController,
        &mut Velocity,
        &Transform,
    )>,
    mut camera_query: Query<&mut Transform, Without<FirstPersonController>>,
) {
    for (input_state, mut controller, mut velocity, transform) in &mut player_query {
        if !controller.movement_enabled() {
            continue;
        }

        let sprint = input_state.pressed(Actions::Sprint);
        let forward_speed = axis_speed(
            input_state.pressed(Actions::Forward),
            input_state.pressed(Actions::Backwards),
            sprint,
        );
        let left_speed = axis_speed(
            input_state.pressed(Actions::StrafeLeft),
            input_state.pressed(Actions::StrafeRight),
            sprint,
        );
        let forward = transform.forward();
        let left = transform.left();
        // Keep the vertical velocity so that gravity still applies
        velocity.linvel.x = forward_speed * forward.x + left_speed * left.x;
        velocity.linvel.z = forward_speed * forward.z + left_speed * left.z;

        // Process mouse movement. We handle the rotation components separately:
        // * Rotation around the vertical axis (e.g. aiming left or right) is applied to the
        //   player root node.
        // * Rotation around the horizontal axis (e.g. aiming up or down) is applied directly to
        //   the perspective camera in order to keep the vertical orientation neutral on the root
        //   node.
        if let Some(mouse_movement) = input_state.axis_pair(Actions::Aim) {
            // Going through DerefMut here would trigger the movement lock every frame
            let controller = controller.bypass_change_detection();
            controller.theta += Angle::radians(mouse_movement.x()) * MOUSE_SENSITIVITY;
            controller.phi += Angle::radians(mouse_movement.y() * MOUSE_SENSITIVITY);
            controller.phi.radians = controller
                .phi
                .radians
                .clamp(-std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2);

            let v_rotation = Quat::from_axis_angle(Vec3::X, -controller.phi.radians);
            velocity.angvel.y = mouse_movement.x() * MOUSE_SENSITIVITY * MOUSE_ANGVEL_MULTIPLIER;

            if let Ok(mut camera_transform) = camera_query.get_mut(controller.camera_anchor) {
                camera_transform.rotation = v_rotation;
            }
        } else {
            velocity.angvel.y = 0.;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_speed() {
        assert_eq!(axis_speed(true, false, false), PLAYER_SPEED);
        assert_eq!(axis_speed(false, true, true), -PLAYER_SPEED * SPRINT_MULTIPLIER);
        assert_eq!(axis_speed(true, true, false), 0.);
        assert_eq!(axis_speed(false, false, true), 0.);
    }

    #[test]
    fn test_disabled_movement_freezes_the_body() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_system(apply_movement_lock);
        let player = app
            .world
            .spawn((
                FirstPersonController::new(Entity::from_raw(0)),
                RigidBody::Dynamic,
                Velocity::linear(Vec3::new(1., -2., 0.)),
            ))
            .id();

        app.world
            .get_mut::<FirstPersonController>(player)
            .unwrap()
            .set_movement_enabled(false);
        app.update();
        assert_eq!(
            *app.world.get::<RigidBody>(player).unwrap(),
            RigidBody::KinematicPositionBased
        );
        assert_eq!(app.world.get::<Velocity>(player).unwrap().linvel, Vec3::ZERO);

        app.world
            .get_mut::<FirstPersonController>(player)
            .unwrap()
            .set_movement_enabled(true);
        app.update();
        assert_eq!(*app.world.get::<RigidBody>(player).unwrap(), RigidBody::Dynamic);
    }
}
