#[cfg(feature = "devel")]
pub mod debug;

pub mod anchors;
pub mod dark_zone;
pub mod first_person_controller;
pub mod game;
pub mod input;
pub mod level;
pub mod physics;
pub mod render;
pub mod teleport;
