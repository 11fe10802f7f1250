use bevy::prelude::*;
use bevy_prototype_debug_lines::DebugLines;

use crate::plugins::{
    anchors::{AnchorRegistry, Bounds},
    teleport::TeleportStateMachine,
};

const TRIGGER_COLOR: Color = Color::GRAY;
const SELECTION_ZONE_COLOR: Color = Color::MIDNIGHT_BLUE;
const FLIGHT_CONTROL_COLOR: Color = Color::DARK_GRAY;
const FLIGHT_PATH_START_COLOR: Color = Color::YELLOW;
const FLIGHT_PATH_END_COLOR: Color = Color::ORANGE_RED;
const FLIGHT_PATH_SEGMENTS: usize = 16;

pub fn draw_bounds(bounds: &Bounds, color: Color, lines: &mut DebugLines) {
    for (start, end) in bounds.edges() {
        lines.line_colored(start, end, 0., color);
    }
}

/// Trigger boxes of every anchor, and the selection zones of the lit ones.
pub fn draw_anchor_volumes(registry: Res<AnchorRegistry>, mut lines: ResMut<DebugLines>) {
    for (_id, anchor) in registry.iter() {
        draw_bounds(&anchor.bounds(), TRIGGER_COLOR, &mut lines);
        if let (true, Some(zone)) = (anchor.is_lit(), anchor.selection_zone()) {
            draw_bounds(&zone, SELECTION_ZONE_COLOR, &mut lines);
        }
    }
}

/// The control polygon of the current flight and the curve it produces.
pub fn draw_flight_path(
    machine: Option<Res<TeleportStateMachine>>,
    mut lines: ResMut<DebugLines>,
) {
    let flight = match &machine {
        Some(machine) => machine.flight(),
        None => return,
    };
    let [start, control, end] = match flight.polyline() {
        Some(polyline) => polyline,
        None => return,
    };

    lines.line_colored(start, control, 0., FLIGHT_CONTROL_COLOR);
    lines.line_colored(control, end, 0., FLIGHT_CONTROL_COLOR);

    let mut previous = start;
    for i in 1..=FLIGHT_PATH_SEGMENTS {
        let t = i as f32 / FLIGHT_PATH_SEGMENTS as f32;
        let point = flight.position_at(t);
        lines.line_gradient(
            previous,
            point,
            0.,
            FLIGHT_PATH_START_COLOR,
            FLIGHT_PATH_END_COLOR,
        );
        previous = point;
    }
}
