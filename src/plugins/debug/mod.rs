pub mod draw;

use bevy::{app::PluginGroupBuilder, prelude::*};
use bevy_prototype_debug_lines::DebugLinesPlugin;
use iyes_loopless::prelude::*;

use super::{
    anchors::{AnchorLabels, AnchorRegistry},
    game::GameState,
    level::{CurrentLevel, LevelProcessor, DEFAULT_LEVEL_PATH},
    teleport::TeleportLabels,
};

#[derive(Debug)]
/// Development plugins intended for debug builds use.
pub struct DeveloperPlugins;

impl PluginGroup for DeveloperPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(bevy_editor_pls::prelude::EditorPlugin)
            .add(DebugLinesPlugin::default())
            .add(DebugOverlayPlugin)
    }
}

#[derive(Debug)]
/// Volume and flight path drawing, and the cheat keys.
pub struct DebugOverlayPlugin;

impl Plugin for DebugOverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_system(
            anchor_cheats
                .run_in_state(GameState::InGame)
                .before(TeleportLabels::Drive)
                .before(AnchorLabels::SyncVisuals),
        )
        .add_system(teleport_player_to_spawn.run_in_state(GameState::InGame))
        .add_system(restart_level.run_in_state(GameState::InGame))
        .add_system(draw::draw_anchor_volumes.run_in_state(GameState::InGame))
        .add_system(
            draw::draw_flight_path
                .run_in_state(GameState::InGame)
                .after(TeleportLabels::Drive),
        );
    }
}

const LIGHT_ALL_KEY: KeyCode = KeyCode::F3;
const EXTINGUISH_ALL_KEY: KeyCode = KeyCode::F4;
const TELEPORT_TO_SPAWN_KEY: KeyCode = KeyCode::F1;
const RESTART_LEVEL_KEY: KeyCode = KeyCode::F5;

fn anchor_cheats(keys: Res<Input<KeyCode>>, mut registry: ResMut<AnchorRegistry>) {
    if keys.just_pressed(LIGHT_ALL_KEY) {
        registry.light_all();
        info!("[Cheat] All anchors lit");
    }
    if keys.just_pressed(EXTINGUISH_ALL_KEY) {
        registry.extinguish_all();
        info!("[Cheat] All anchors extinguished");
    }
}

fn teleport_player_to_spawn(
    keys: Res<Input<KeyCode>>,
    current_level: Option<Res<CurrentLevel>>,
    level_processor: Res<LevelProcessor>,
    mut transforms: Query<&mut Transform>,
) {
    if !keys.just_pressed(TELEPORT_TO_SPAWN_KEY) {
        return;
    }
    let (current_level, player) = match (current_level, level_processor.player_entity()) {
        (Some(current_level), Some(player)) => (current_level, player),
        _ => return,
    };
    if let Ok(mut transform) = transforms.get_mut(player) {
        *transform = current_level.player_spawn();
        info!("[Cheat] Teleported player to the level spawn point");
    }
}

fn restart_level(
    mut commands: Commands,
    keys: Res<Input<KeyCode>>,
    current_level: Option<Res<CurrentLevel>>,
    mut level_processor: ResMut<LevelProcessor>,
) {
    if !keys.just_pressed(RESTART_LEVEL_KEY) {
        return;
    }
    let path = current_level
        .as_ref()
        .map_or(DEFAULT_LEVEL_PATH, |level| level.path())
        .to_owned();
    match level_processor.instantiate_level(&mut commands, &path) {
        Ok(()) => info!("[Cheat] Restarting level {}", path),
        Err(e) => warn!("Cannot restart the level: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::anchors::{Anchor, AnchorId, Bounds};

    #[test]
    fn test_cheat_keys_light_and_extinguish_every_anchor() {
        let mut registry = AnchorRegistry::new();
        for name in ["a", "b", "c"] {
            registry.register(Anchor::new(
                name,
                Transform::IDENTITY,
                Bounds::from_center_half_extents(Vec3::ZERO, Vec3::ONE),
            ));
        }
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Input<KeyCode>>()
            .insert_resource(registry)
            .add_system(anchor_cheats);

        app.world.resource_mut::<Input<KeyCode>>().press(LIGHT_ALL_KEY);
        app.update();
        assert_eq!(app.world.resource::<AnchorRegistry>().lit_anchors().count(), 3);

        {
            let mut keys = app.world.resource_mut::<Input<KeyCode>>();
            keys.clear();
            keys.press(EXTINGUISH_ALL_KEY);
        }
        app.update();
        let registry = app.world.resource::<AnchorRegistry>();
        assert_eq!(registry.lit_anchors().count(), 0);
        assert!(!registry.get(AnchorId(0)).unwrap().is_lit());
    }
}
