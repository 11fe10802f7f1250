//! Teleporting between lit anchors: the Normal/Selecting/Flying state machine, the arc flight and
//! the camera handoff, plus the systems plugging them into the game.

use bevy::prelude::*;
use iyes_loopless::prelude::*;
use leafwing_input_manager::prelude::*;

mod camera_rig;
mod config;
mod flight;
mod state_machine;

pub use camera_rig::{spawn_anchor_view_camera, AnchorViewCamera, CameraRig, CameraView};
pub use config::{ConfigError, TeleportConfig, TELEPORT_CONFIG_PATH};
pub use flight::{FlightController, FlightStatus};
pub use state_machine::{
    PlayerRig, TeleportInput, TeleportSession, TeleportState, TeleportStateMachine,
};

use super::{
    anchors::{AnchorLabels, AnchorRegistry},
    first_person_controller::{FirstPersonController, Player, PlayerVisualRoot},
    game::GameState,
    input::{teleport_inputs, Actions},
};

#[derive(Debug)]
pub struct TeleportPlugin;

impl Plugin for TeleportPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraRig>()
            .register_type::<AnchorViewCamera>()
            .add_startup_system(config::load_teleport_config)
            .add_enter_system(GameState::InGame, reset_teleport_state)
            .add_system(
                drive_teleport
                    .run_in_state(GameState::InGame)
                    .label(TeleportLabels::Drive)
                    .after(AnchorLabels::RouteVolumeEvents)
                    .before(AnchorLabels::SyncVisuals),
            )
            .add_system(
                camera_rig::sync_camera_rig
                    .run_in_state(GameState::InGame)
                    .label(TeleportLabels::SyncCameras)
                    .after(TeleportLabels::Drive),
            );
    }
}

#[derive(Debug, Clone, SystemLabel)]
pub enum TeleportLabels {
    Drive,
    SyncCameras,
}

/// The player entity, seen through the components the state machine acts on.
struct PlayerHandle<'a> {
    transform: Mut<'a, Transform>,
    controller: Mut<'a, FirstPersonController>,
    visual_root: Option<Mut<'a, Visibility>>,
}

impl PlayerRig for PlayerHandle<'_> {
    fn set_movement_enabled(&mut self, enabled: bool) {
        self.controller.set_movement_enabled(enabled);
    }

    fn set_visible(&mut self, visible: bool) {
        if let Some(visibility) = &mut self.visual_root {
            visibility.is_visible = visible;
        }
    }

    fn pose(&self) -> Transform {
        *self.transform
    }

    fn place_at(&mut self, pose: Transform) {
        *self.transform = pose;
    }
}

/// Start every level with a fresh state machine and the free roaming camera.
fn reset_teleport_state(
    mut commands: Commands,
    config: Option<Res<TeleportConfig>>,
    mut camera: ResMut<CameraRig>,
) {
    let config = config.map(|config| config.clone()).unwrap_or_default();
    commands.insert_resource(TeleportStateMachine::new(config));
    camera.activate_free_roam();
}

fn drive_teleport(
    time: Res<Time>,
    machine: Option<ResMut<TeleportStateMachine>>,
    mut registry: ResMut<AnchorRegistry>,
    mut camera: ResMut<CameraRig>,
    mut players: Query<
        (
            &ActionState<Actions>,
            &mut Transform,
            &mut FirstPersonController,
        ),
        With<Player>,
    >,
    mut visual_roots: Query<&mut Visibility, With<PlayerVisualRoot>>,
) {
    // The state machine is inserted by a command, so it shows up one frame after entering the level
    let mut machine = match machine {
        Some(machine) => machine,
        None => return,
    };
    let (action_state, transform, controller) = match players.get_single_mut() {
        Ok(player) => player,
        Err(_) => return,
    };

    let inputs = teleport_inputs(action_state);
    let mut player = PlayerHandle {
        transform,
        controller,
        visual_root: visual_roots.get_single_mut().ok(),
    };
    machine.tick(
        time.delta(),
        &inputs,
        &mut registry,
        &mut camera,
        &mut player,
    );
}
