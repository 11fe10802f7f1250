use std::f32::consts::FRAC_PI_4;

use bevy::prelude::*;
use iyes_loopless::prelude::*;

use crate::{
    plugins::{
        anchors::spawn_anchor, dark_zone::spawn_dark_zone, first_person_controller::*,
        game::GameState, render::RenderResources, teleport::spawn_anchor_view_camera,
    },
    util::scenes::make_arena,
};

use super::{LevelData, LevelError, LevelLayout, SpawnState};

const ARENA_WALL_HEIGHT: f32 = 4.;

#[derive(Debug, Clone, PartialEq, Resource)]
pub struct CurrentLevel {
    name: String,
    path: String,
    player_spawn: Transform,
}

impl CurrentLevel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn player_spawn(&self) -> Transform {
        self.player_spawn
    }
}

#[derive(Debug, Resource)]
/// Spawns levels from their level file and tears the previous one down.
pub struct LevelProcessor {
    level_root: Option<Entity>,
    player_entity: Option<Entity>,
    spawn_state: SpawnState,
}

impl LevelProcessor {
    /// The initial level is spawned as soon as the game starts in the loading state.
    pub(crate) fn new(initial_level: &str) -> LevelProcessor {
        LevelProcessor {
            level_root: None,
            player_entity: None,
            spawn_state: SpawnState::Pending(initial_level.to_owned()),
        }
    }

    pub fn player_entity(&self) -> Option<Entity> {
        self.player_entity
    }

    /// Replace the current level with the one stored at `path`.
    pub fn instantiate_level(
        &mut self,
        commands: &mut Commands,
        path: &str,
    ) -> Result<(), LevelError> {
        if self.spawn_state != SpawnState::Idle {
            return Err(LevelError::SpawnInProgress);
        }

        debug!("Level load state transitioned to pending");
        self.spawn_state = SpawnState::Pending(path.to_owned());
        commands.insert_resource(NextState(GameState::Loading));
        commands.remove_resource::<CurrentLevel>();
        Ok(())
    }

    pub(crate) fn init_level_transition(level_processor: Res<LevelProcessor>) {
        match &level_processor.spawn_state {
            SpawnState::Pending(path) => info!("Loading level {}", path),
            state => error!(
                "Level processor in unexpected state {:?} during state transition",
                state
            ),
        }
    }

    /// Read and check a level file, falling back to the built-in demo level.
    fn read_level(path: &str) -> Result<(LevelData, LevelLayout), LevelError> {
        LevelData::load(path)
            .and_then(|data| data.layout().map(|layout| (data, layout)))
            .or_else(|e| {
                error!("{}, falling back to the demo level", e);
                let demo = LevelData::demo();
                demo.layout().map(|layout| (demo, layout))
            })
    }

    pub(crate) fn spawn_level_system(
        mut commands: Commands,
        mut level_processor: ResMut<LevelProcessor>,
        render: Res<RenderResources>,
        mut meshes: ResMut<Assets<Mesh>>,
        mut materials: ResMut<Assets<StandardMaterial>>,
    ) {
        let path = match &level_processor.spawn_state {
            SpawnState::Pending(path) => path.clone(),
            _ => return,
        };
        let (data, layout) = match Self::read_level(&path) {
            Ok(level) => level,
            Err(e) => {
                error!("Could not spawn any level: {}", e);
                level_processor.spawn_state = SpawnState::Idle;
                return;
            }
        };

        if let Some(level_root) = level_processor.level_root.take() {
            commands.entity(level_root).despawn_recursive();
        }
        if let Some(player) = level_processor.player_entity.take() {
            commands.entity(player).despawn_recursive();
        }

        let arena = make_arena(
            &mut commands,
            &mut meshes,
            &mut materials,
            data.arena_size,
            ARENA_WALL_HEIGHT,
        );
        let moonlight = commands
            .spawn(DirectionalLightBundle {
                directional_light: DirectionalLight {
                    color: Color::rgb(0.55, 0.6, 0.85),
                    illuminance: 1_500.,
                    shadows_enabled: true,
                    ..default()
                },
                transform: Transform {
                    translation: Vec3::Y * 10.,
                    rotation: Quat::from_euler(EulerRot::YXZ, FRAC_PI_4, -FRAC_PI_4, 0.),
                    scale: Vec3::ONE,
                },
                ..default()
            })
            .insert(Name::from("Moonlight"))
            .id();

        let mut children = vec![arena, moonlight];
        for (id, anchor) in layout.registry.iter() {
            let (lamp, trigger) = spawn_anchor(&mut commands, &render, id, anchor);
            children.extend([lamp, trigger]);
        }
        for zone in &layout.dark_zones {
            children.push(spawn_dark_zone(&mut commands, &render, zone));
        }
        children.push(spawn_anchor_view_camera(&mut commands));

        let level_root = commands
            .spawn(SpatialBundle::default())
            .insert(Name::from(format!("Level {}", data.name)))
            .push_children(&children)
            .id();

        let player_entity = commands
            .spawn(FirstPersonControllerBundle {
                spatial: SpatialBundle {
                    transform: data.player_spawn.to_transform(),
                    ..default()
                },
                ..default()
            })
            .id();

        info!(
            "Spawned level {} with {} anchors and {} dark zones",
            data.name,
            layout.registry.len(),
            layout.dark_zones.len()
        );
        commands.insert_resource(layout.registry);

        level_processor.level_root = Some(level_root);
        level_processor.player_entity = Some(player_entity);
        level_processor.spawn_state = SpawnState::Finalizing(CurrentLevel {
            name: data.name,
            path,
            player_spawn: data.player_spawn.to_transform(),
        });
        commands.insert_resource(NextState(GameState::InGame));
    }

    pub(crate) fn finalize_level_spawn(
        mut commands: Commands,
        mut level_processor: ResMut<LevelProcessor>,
    ) {
        if let SpawnState::Finalizing(current_level) = &level_processor.spawn_state {
            info!(
                "Marking level {} spawn as complete, transitioning to in game state",
                current_level.name()
            );
            commands.insert_resource(current_level.clone());
            level_processor.spawn_state = SpawnState::Idle;
        }
    }
}
