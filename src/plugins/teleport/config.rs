use std::{fs, path::Path, time::Duration};

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

pub const TELEPORT_CONFIG_PATH: &str = "assets/config/teleport.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed teleport configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0} must be a finite, non-negative number")]
    OutOfRange(&'static str),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Resource)]
#[serde(default, deny_unknown_fields)]
/// Tuning of the anchor teleport. Missing keys keep their default value.
pub struct TeleportConfig {
    /// Seconds spent flying between two anchors.
    pub flight_duration: f32,
    /// Height of the arc control point above the middle of the flight.
    pub arc_height: f32,
    /// Seconds during which the teleport mode cannot be re-entered after leaving it.
    pub reentry_cooldown: f32,
    /// Unlit anchors placed this close to the player can be lit without standing in their
    /// trigger. Zero only accepts anchors the player stands in.
    pub interaction_radius: f32,
}

impl Default for TeleportConfig {
    fn default() -> Self {
        TeleportConfig {
            flight_duration: 0.6,
            arc_height: 3.,
            reentry_cooldown: 0.1,
            interaction_radius: 0.,
        }
    }
}

impl TeleportConfig {
    pub fn from_json_str(json: &str) -> Result<TeleportConfig, ConfigError> {
        let config: TeleportConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<TeleportConfig, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn reentry_cooldown(&self) -> Duration {
        Duration::from_secs_f32(self.reentry_cooldown)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("flight_duration", self.flight_duration),
            ("arc_height", self.arc_height),
            ("reentry_cooldown", self.reentry_cooldown),
            ("interaction_radius", self.interaction_radius),
        ] {
            if !value.is_finite() || value < 0. {
                return Err(ConfigError::OutOfRange(name));
            }
        }
        Ok(())
    }
}

/// Load the teleport configuration, keeping the defaults if the file is missing or invalid.
pub(super) fn load_teleport_config(mut commands: Commands) {
    let config = match TeleportConfig::load(TELEPORT_CONFIG_PATH) {
        Ok(config) => {
            info!("Loaded teleport configuration: {:?}", config);
            config
        }
        Err(e) => {
            warn!("{}, using the default teleport configuration", e);
            TeleportConfig::default()
        }
    };
    commands.insert_resource(config);
}
