use std::{fs, path::Path};

use bevy::{prelude::*, utils::HashSet};
use serde::Deserialize;
use thiserror::Error;

use crate::plugins::anchors::{Anchor, AnchorId, AnchorRegistry, Bounds};

pub const DEFAULT_LEVEL_PATH: &str = "assets/levels/level1.json";

const DEFAULT_TRIGGER_HALF_EXTENTS: [f32; 3] = [1., 1.5, 1.];

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed level data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("anchor id {0:?} is used more than once")]
    DuplicateAnchor(String),
    #[error("{context} refers to unknown anchor {anchor:?}")]
    UnknownAnchor { context: String, anchor: String },
    #[error("{0} has a non-positive extent")]
    InvalidVolume(String),
    #[error("a level is already being spawned")]
    SpawnInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoseRecord {
    pub translation: [f32; 3],
    /// Rotation around the vertical axis.
    #[serde(default)]
    pub yaw_degrees: f32,
    /// Rotation around the horizontal axis, positive looks up.
    #[serde(default)]
    pub pitch_degrees: f32,
}

impl PoseRecord {
    pub fn to_transform(self) -> Transform {
        Transform::from_translation(Vec3::from(self.translation)).with_rotation(Quat::from_euler(
            EulerRot::YXZ,
            self.yaw_degrees.to_radians(),
            self.pitch_degrees.to_radians(),
            0.,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VolumeRecord {
    pub center: [f32; 3],
    pub half_extents: [f32; 3],
}

impl VolumeRecord {
    fn to_bounds(self, context: impl FnOnce() -> String) -> Result<Bounds, LevelError> {
        let half_extents = Vec3::from(self.half_extents);
        if !half_extents.cmpgt(Vec3::ZERO).all() {
            return Err(LevelError::InvalidVolume(context()));
        }
        Ok(Bounds::from_center_half_extents(
            Vec3::from(self.center),
            half_extents,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnchorRecord {
    pub id: String,
    pub placement: PoseRecord,
    #[serde(default)]
    pub view_point: Option<PoseRecord>,
    #[serde(default)]
    pub exit_point: Option<PoseRecord>,
    /// The trigger box stands on the placement point.
    #[serde(default = "default_trigger_half_extents")]
    pub trigger_half_extents: [f32; 3],
    #[serde(default)]
    pub selection_zone: Option<VolumeRecord>,
    #[serde(default)]
    pub lit: bool,
}

fn default_trigger_half_extents() -> [f32; 3] {
    DEFAULT_TRIGGER_HALF_EXTENTS
}

impl AnchorRecord {
    fn to_anchor(&self) -> Result<Anchor, LevelError> {
        let placement = self.placement.to_transform();
        let half_extents = Vec3::from(self.trigger_half_extents);
        let trigger = VolumeRecord {
            center: (placement.translation + Vec3::Y * half_extents.y).to_array(),
            half_extents: self.trigger_half_extents,
        }
        .to_bounds(|| format!("trigger of anchor {:?}", self.id))?;

        let mut anchor = Anchor::new(self.id.clone(), placement, trigger);
        if let Some(view_point) = self.view_point {
            anchor = anchor.with_view_point(view_point.to_transform());
        }
        if let Some(exit_point) = self.exit_point {
            anchor = anchor.with_exit_point(exit_point.to_transform());
        }
        if let Some(zone) = self.selection_zone {
            anchor = anchor
                .with_selection_zone(zone.to_bounds(|| format!("selection zone of {:?}", self.id))?);
        }
        Ok(anchor)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DarkZoneRecord {
    pub name: String,
    /// Id of the anchor that clears the zone once lit.
    pub controlling_anchor: String,
    pub blockers: Vec<VolumeRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelData {
    pub name: String,
    pub player_spawn: PoseRecord,
    #[serde(default = "default_arena_size")]
    pub arena_size: f32,
    #[serde(default)]
    pub anchors: Vec<AnchorRecord>,
    #[serde(default)]
    pub dark_zones: Vec<DarkZoneRecord>,
}

fn default_arena_size() -> f32 {
    40.
}

#[derive(Debug, Clone, PartialEq)]
/// A dark zone with its anchor reference and blockers checked.
pub struct DarkZoneLayout {
    pub name: String,
    pub controlling_anchor: AnchorId,
    pub blockers: Vec<Bounds>,
}

#[derive(Debug)]
/// Everything needed to spawn a level, checked against the level data.
pub struct LevelLayout {
    pub registry: AnchorRegistry,
    pub dark_zones: Vec<DarkZoneLayout>,
}

impl LevelData {
    pub fn from_json_str(json: &str) -> Result<LevelData, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<LevelData, LevelError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Build the anchor registry and resolve the dark zones. Anchors are registered in the order of
    /// the level file, which is the order targets are cycled through.
    pub fn layout(&self) -> Result<LevelLayout, LevelError> {
        let mut registry = AnchorRegistry::new();
        let mut seen = HashSet::new();
        for record in &self.anchors {
            if !seen.insert(record.id.as_str()) {
                return Err(LevelError::DuplicateAnchor(record.id.clone()));
            }
            let id = registry.register(record.to_anchor()?);
            if record.lit {
                registry.light_up(id);
            }
        }

        let dark_zones = self
            .dark_zones
            .iter()
            .map(|zone| {
                let controlling_anchor = registry
                    .find_by_name(&zone.controlling_anchor)
                    .ok_or_else(|| LevelError::UnknownAnchor {
                        context: format!("dark zone {:?}", zone.name),
                        anchor: zone.controlling_anchor.clone(),
                    })?;
                let blockers = zone
                    .blockers
                    .iter()
                    .enumerate()
                    .map(|(i, blocker)| {
                        blocker.to_bounds(|| format!("blocker {} of dark zone {:?}", i, zone.name))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(DarkZoneLayout {
                    name: zone.name.clone(),
                    controlling_anchor,
                    blockers,
                })
            })
            .collect::<Result<Vec<_>, LevelError>>()?;

        Ok(LevelLayout {
            registry,
            dark_zones,
        })
    }

    /// Small level used when the level file cannot be loaded.
    pub fn demo() -> LevelData {
        let anchor = |id: &str, x: f32, z: f32, zone: Option<f32>, lit: bool| AnchorRecord {
            id: id.to_owned(),
            placement: PoseRecord {
                translation: [x, 0., z],
                yaw_degrees: 0.,
                pitch_degrees: 0.,
            },
            view_point: Some(PoseRecord {
                translation: [x, 2.5, z + 1.5],
                yaw_degrees: 0.,
                pitch_degrees: -10.,
            }),
            exit_point: Some(PoseRecord {
                translation: [x, 1., z + 2.],
                yaw_degrees: 0.,
                pitch_degrees: 0.,
            }),
            trigger_half_extents: DEFAULT_TRIGGER_HALF_EXTENTS,
            selection_zone: zone.map(|half_width| VolumeRecord {
                center: [x, 1., z],
                half_extents: [half_width, 4., half_width],
            }),
            lit,
        };

        LevelData {
            name: "Demo".to_owned(),
            player_spawn: PoseRecord {
                translation: [0., 1., 4.],
                yaw_degrees: 0.,
                pitch_degrees: 0.,
            },
            arena_size: default_arena_size(),
            anchors: vec![
                anchor("start", 0., 0., Some(12.), true),
                anchor("east", 10., 0., Some(12.), false),
                anchor("north", 0., -10., Some(12.), false),
                anchor("far", 10., -10., None, false),
            ],
            dark_zones: vec![DarkZoneRecord {
                name: "north gate".to_owned(),
                controlling_anchor: "north".to_owned(),
                blockers: vec![VolumeRecord {
                    center: [5., 2., -15.],
                    half_extents: [5., 2., 0.5],
                }],
            }],
        }
    }
}
