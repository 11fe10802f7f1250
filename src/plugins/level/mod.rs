use bevy::prelude::*;
use iyes_loopless::{prelude::*, state::StateTransitionStageLabel};

mod level_data;
mod level_processor;

pub use level_data::{
    AnchorRecord, DarkZoneLayout, DarkZoneRecord, LevelData, LevelError, LevelLayout, PoseRecord,
    VolumeRecord, DEFAULT_LEVEL_PATH,
};
pub use level_processor::{CurrentLevel, LevelProcessor};

use super::game::GameState;

#[derive(Debug, Default, PartialEq)]
enum SpawnState {
    #[default]
    Idle,
    /// Path of the level file to spawn.
    Pending(String),
    Finalizing(CurrentLevel),
}

pub struct LevelsPlugin;

impl Plugin for LevelsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(LevelProcessor::new(DEFAULT_LEVEL_PATH));

        app.add_enter_system(GameState::Loading, LevelProcessor::init_level_transition);
        app.add_exit_system(GameState::Loading, LevelProcessor::finalize_level_spawn);

        app.add_stage_after(
            StateTransitionStageLabel::from_type::<GameState>(),
            LevelManagerStages::SpawnLevel,
            SystemStage::single_threaded(),
        );
        app.add_system_to_stage(
            LevelManagerStages::SpawnLevel,
            LevelProcessor::spawn_level_system.run_in_state(GameState::Loading),
        );
    }
}

#[derive(Debug, StageLabel)]
pub enum LevelManagerStages {
    SpawnLevel,
}
