//! Meshes and materials shared by the level entities: anchors, dark zones and the player model.

use bevy::prelude::*;

#[derive(Debug, Default, Resource)]
pub struct RenderResources {
    pub anchor_mesh: Handle<Mesh>,
    pub flame_mesh: Handle<Mesh>,
    pub indicator_mesh: Handle<Mesh>,
    pub player_mesh: Handle<Mesh>,
    /// Unit cube, scaled to the size of each blocker.
    pub dark_zone_mesh: Handle<Mesh>,
    pub unlit_anchor_material: Handle<StandardMaterial>,
    pub lit_anchor_material: Handle<StandardMaterial>,
    pub flame_material: Handle<StandardMaterial>,
    pub indicator_material: Handle<StandardMaterial>,
    pub dark_zone_material: Handle<StandardMaterial>,
    pub player_material: Handle<StandardMaterial>,
}

impl RenderResources {
    pub fn anchor_material(&self, lit: bool) -> Handle<StandardMaterial> {
        if lit {
            self.lit_anchor_material.clone()
        } else {
            self.unlit_anchor_material.clone()
        }
    }
}

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_startup_system(load_render_resources);
    }
}

fn load_render_resources(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let anchor_mesh = meshes.add(
        shape::Capsule {
            radius: 0.15,
            depth: 1.2,
            ..default()
        }
        .into(),
    );
    let flame_mesh = meshes.add(
        shape::UVSphere {
            radius: 0.12,
            sectors: 12,
            stacks: 12,
        }
        .into(),
    );
    let indicator_mesh = meshes.add(
        shape::Torus {
            radius: 0.45,
            ring_radius: 0.04,
            ..default()
        }
        .into(),
    );
    let player_mesh = meshes.add(
        shape::Capsule {
            radius: 0.4,
            depth: 1.0,
            ..default()
        }
        .into(),
    );
    let dark_zone_mesh = meshes.add(shape::Cube { size: 1. }.into());

    let flame_material = materials.add(StandardMaterial {
        base_color: Color::ORANGE,
        emissive: Color::rgb(1.0, 0.6, 0.1),
        unlit: true,
        ..default()
    });
    let indicator_material = materials.add(StandardMaterial {
        base_color: Color::CYAN,
        emissive: Color::CYAN,
        unlit: true,
        ..default()
    });
    let dark_zone_material = materials.add(StandardMaterial {
        base_color: Color::rgba(0.02, 0.0, 0.05, 0.85),
        alpha_mode: AlphaMode::Blend,
        ..default()
    });

    commands.insert_resource(RenderResources {
        anchor_mesh,
        flame_mesh,
        indicator_mesh,
        player_mesh,
        dark_zone_mesh,
        unlit_anchor_material: materials.add(Color::GRAY.into()),
        lit_anchor_material: materials.add(Color::YELLOW.into()),
        flame_material,
        indicator_material,
        dark_zone_material,
        player_material: materials.add(Color::ANTIQUE_WHITE.into()),
    });
}
