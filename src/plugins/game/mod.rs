use crate::plugins::*;

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use iyes_loopless::prelude::*;

const WINDOW_TITLE: &str = "Light Anchors";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    /// A level is being spawned.
    Loading,
    InGame,
}

#[derive(Debug)]
/// Main game plugin, responsible for loading the other game plugins and bootstrapping the game.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            window: WindowDescriptor {
                title: WINDOW_TITLE.to_owned(),
                width: 1280.,
                height: 720.,
                ..default()
            },
            ..default()
        }));

        // The level plugin schedules its stage relative to the state transition stage
        app.add_loopless_state(GameState::Loading);

        #[cfg(feature = "devel")]
        {
            app.add_plugins(debug::DeveloperPlugins);
        }

        app.insert_resource(ClearColor(Color::rgb(0.01, 0.01, 0.03)))
            .insert_resource(AmbientLight {
                color: Color::rgb(0.5, 0.55, 0.8),
                brightness: 0.05,
            });

        app.add_plugin(RapierPhysicsPlugin::<NoUserData>::default());
        app.add_plugin(physics::PhysicsPlugin);
        app.add_plugin(render::RenderPlugin);
        app.add_plugin(input::InputPlugin);
        app.add_plugin(first_person_controller::FirstPersonControllerPlugin);
        app.add_plugin(anchors::AnchorsPlugin);
        app.add_plugin(teleport::TeleportPlugin);
        app.add_plugin(dark_zone::DarkZonePlugin);
        app.add_plugin(level::LevelsPlugin);
    }
}
