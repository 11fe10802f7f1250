use bevy::{prelude::*, reflect::FromReflect};

use crate::plugins::first_person_controller::PlayerCamera;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CameraView {
    /// The player camera, attached to the player body.
    #[default]
    FreeRoam,
    /// A standalone camera pinned at the given pose.
    FirstPerson(Transform),
}

#[derive(Debug, Default, Resource)]
/// Selects which of the two game cameras renders. Exactly one view is active at any time.
pub struct CameraRig {
    view: CameraView,
}

impl CameraRig {
    pub fn view(&self) -> CameraView {
        self.view
    }

    pub fn is_first_person(&self) -> bool {
        matches!(self.view, CameraView::FirstPerson(_))
    }

    pub fn activate_free_roam(&mut self) {
        self.view = CameraView::FreeRoam;
    }

    pub fn activate_first_person_at(&mut self, pose: Transform) {
        self.view = CameraView::FirstPerson(pose);
    }
}

#[derive(Debug, Default, Component, Reflect, FromReflect)]
#[reflect(Component)]
/// Marker for the camera used while looking out from an anchor or flying.
pub struct AnchorViewCamera;

pub fn spawn_anchor_view_camera(commands: &mut Commands) -> Entity {
    commands
        .spawn(Camera3dBundle {
            camera: Camera {
                is_active: false,
                priority: 1,
                ..default()
            },
            ..default()
        })
        .insert((Name::from("Anchor view camera"), AnchorViewCamera))
        .id()
}

/// Mirror the rig state onto the cameras.
pub fn sync_camera_rig(
    rig: Res<CameraRig>,
    mut player_cameras: Query<&mut Camera, (With<PlayerCamera>, Without<AnchorViewCamera>)>,
    mut anchor_cameras: Query<(&mut Camera, &mut Transform), With<AnchorViewCamera>>,
) {
    let pinned_pose = match rig.view() {
        CameraView::FreeRoam => None,
        CameraView::FirstPerson(pose) => Some(pose),
    };
    for mut camera in &mut player_cameras {
        camera.is_active = pinned_pose.is_none();
    }
    for (mut camera, mut transform) in &mut anchor_cameras {
        camera.is_active = pinned_pose.is_some();
        if let Some(pose) = pinned_pose {
            *transform = pose;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_views_are_mutually_exclusive() {
        let mut rig = CameraRig::default();
        assert_eq!(rig.view(), CameraView::FreeRoam);
        assert!(!rig.is_first_person());

        let pose = Transform::from_xyz(1., 2., 3.);
        rig.activate_first_person_at(pose);
        assert_eq!(rig.view(), CameraView::FirstPerson(pose));
        assert!(rig.is_first_person());

        rig.activate_free_roam();
        assert_eq!(rig.view(), CameraView::FreeRoam);
    }

    #[test]
    fn test_sync_switches_active_camera() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<CameraRig>()
            .add_system(sync_camera_rig);
        let player_camera = app.world.spawn((Camera::default(), PlayerCamera)).id();
        let anchor_camera = app
            .world
            .spawn((
                Camera {
                    is_active: false,
                    ..default()
                },
                Transform::IDENTITY,
                AnchorViewCamera,
            ))
            .id();

        let pose = Transform::from_xyz(4., 1.5, -2.);
        app.world
            .resource_mut::<CameraRig>()
            .activate_first_person_at(pose);
        app.update();
        assert!(!app.world.get::<Camera>(player_camera).unwrap().is_active);
        assert!(app.world.get::<Camera>(anchor_camera).unwrap().is_active);
        assert_eq!(*app.world.get::<Transform>(anchor_camera).unwrap(), pose);

        app.world.resource_mut::<CameraRig>().activate_free_roam();
        app.update();
        assert!(app.world.get::<Camera>(player_camera).unwrap().is_active);
        assert!(!app.world.get::<Camera>(anchor_camera).unwrap().is_active);
    }
}
