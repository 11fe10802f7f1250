use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use crate::plugins::physics::*;

/// Open air square arena of the given size: a floor and 4 walls with physics colliders.
/// Returns the floor entity, parent of the walls.
pub fn make_arena(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
    length: f32,
    height: f32,
) -> Entity {
    const WALL_THICKNESS: f32 = 1.;

    let wall_material = materials.add(StandardMaterial {
        base_color: Color::rgb(0.32, 0.3, 0.35),
        perceptual_roughness: 0.95,
        ..default()
    });
    let ground_material = materials.add(StandardMaterial {
        base_color: Color::rgb(0.12, 0.14, 0.12),
        perceptual_roughness: 1.,
        ..default()
    });

    let half_len = length / 2.;
    let ground_half_len = half_len + WALL_THICKNESS;
    let wall_mesh = meshes.add(
        shape::Box::new(length + 2. * WALL_THICKNESS, height, WALL_THICKNESS).into(),
    );
    let ground_mesh = meshes.add(
        shape::Box::new(2. * ground_half_len, WALL_THICKNESS, 2. * ground_half_len).into(),
    );

    let mut ground = commands.spawn(PbrBundle {
        mesh: ground_mesh,
        material: ground_material,
        transform: Transform::from_xyz(0., -WALL_THICKNESS / 2., 0.),
        ..default()
    });
    ground.insert((
        Name::from("Ground"),
        RigidBody::Fixed,
        Collider::cuboid(ground_half_len, WALL_THICKNESS / 2., ground_half_len),
        CollisionGroups::new(GROUND_GROUP, ALL_GROUPS),
    ));

    ground.with_children(|parent| {
        // Children of the floor, whose center sits half a wall thickness below the ground level
        let wall_y = (height + WALL_THICKNESS) / 2.;
        let offset = half_len + WALL_THICKNESS / 2.;
        let walls = [
            ("North wall", Vec3::new(0., wall_y, -offset), 0.),
            ("East wall", Vec3::new(offset, wall_y, 0.), FRAC_PI_2),
            ("South wall", Vec3::new(0., wall_y, offset), 0.),
            ("West wall", Vec3::new(-offset, wall_y, 0.), FRAC_PI_2),
        ];
        for (name, position, yaw) in walls {
            parent
                .spawn(PbrBundle {
                    mesh: wall_mesh.clone(),
                    material: wall_material.clone(),
                    transform: Transform::from_translation(position)
                        .with_rotation(Quat::from_rotation_y(yaw)),
                    ..default()
                })
                .insert((
                    Name::from(name),
                    RigidBody::Fixed,
                    Collider::cuboid(half_len + WALL_THICKNESS, height / 2., WALL_THICKNESS / 2.),
                    CollisionGroups::new(WALLS_GROUP, ALL_GROUPS),
                ));
        }
    });
    ground.id()
}
