use bevy::{prelude::*, window::CursorGrabMode};
use leafwing_input_manager::prelude::*;

use super::teleport::TeleportInput;

#[derive(Debug)]
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugin(InputManagerPlugin::<Actions>::default())
            .add_startup_system(toggle_on_start)
            .add_system(toggle_mouse_capture);
    }
}

#[derive(Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Actions {
    Forward,
    Backwards,
    StrafeLeft,
    StrafeRight,
    Sprint,
    Aim,
    LightAnchor,
    TeleportMode,
    ConfirmTeleport,
    NextTarget,
    PreviousTarget,
}

pub fn default_input_map() -> InputMap<Actions> {
    let mut input_map = InputMap::new([
        (KeyCode::Z, Actions::Forward),
        (KeyCode::S, Actions::Backwards),
        (KeyCode::Q, Actions::StrafeLeft),
        (KeyCode::D, Actions::StrafeRight),
        (KeyCode::LShift, Actions::Sprint),
        (KeyCode::E, Actions::LightAnchor),
        (KeyCode::F, Actions::TeleportMode),
        (KeyCode::T, Actions::ConfirmTeleport),
        (KeyCode::Right, Actions::NextTarget),
        (KeyCode::Left, Actions::PreviousTarget),
    ]);
    input_map.insert(DualAxis::mouse_motion(), Actions::Aim);
    input_map
}

/// Teleport events triggered this frame, in the order the teleport state machine handles them.
pub fn teleport_inputs(action_state: &ActionState<Actions>) -> Vec<TeleportInput> {
    [
        (Actions::LightAnchor, TeleportInput::LightNearbyAnchor),
        (Actions::TeleportMode, TeleportInput::EnterOrCancelTeleport),
        (Actions::NextTarget, TeleportInput::NextCandidate),
        (Actions::PreviousTarget, TeleportInput::PreviousCandidate),
        (Actions::ConfirmTeleport, TeleportInput::ConfirmTeleport),
    ]
    .into_iter()
    .filter(|(action, _)| action_state.just_pressed(*action))
    .map(|(_, input)| input)
    .collect()
}

fn toggle_on_start(mut windows: ResMut<Windows>) {
    if let Some(window) = windows.get_primary_mut() {
        window.set_cursor_visibility(false);
        window.set_cursor_grab_mode(CursorGrabMode::Locked);
    }
}

fn toggle_mouse_capture(mut windows: ResMut<Windows>, keys: Res<Input<KeyCode>>) {
    if !keys.just_pressed(KeyCode::Tab) {
        return;
    }
    if let Some(window) = windows.get_primary_mut() {
        let locked = window.cursor_grab_mode() != CursorGrabMode::None;
        window.set_cursor_visibility(locked);
        window.set_cursor_grab_mode(if locked {
            CursorGrabMode::None
        } else {
            CursorGrabMode::Locked
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_teleport_inputs_when_idle() {
        let action_state = ActionState::<Actions>::default();
        assert!(teleport_inputs(&action_state).is_empty());
    }

    #[test]
    fn test_teleport_inputs_keep_handling_order() {
        let mut action_state = ActionState::<Actions>::default();
        action_state.press(Actions::ConfirmTeleport);
        action_state.press(Actions::LightAnchor);
        action_state.press(Actions::NextTarget);
        action_state.press(Actions::Forward);
        assert_eq!(
            teleport_inputs(&action_state),
            vec![
                TeleportInput::LightNearbyAnchor,
                TeleportInput::NextCandidate,
                TeleportInput::ConfirmTeleport,
            ]
        );
    }
}
