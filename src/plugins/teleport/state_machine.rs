use std::time::Duration;

use bevy::prelude::*;

use super::{
    camera_rig::CameraRig,
    config::TeleportConfig,
    flight::{FlightController, FlightStatus},
};
use crate::plugins::anchors::{collect_candidates, AnchorId, AnchorRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TeleportState {
    #[default]
    Normal,
    Selecting,
    Flying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Edge triggered teleport inputs, delivered at most once per tick each.
pub enum TeleportInput {
    /// Enter the selection mode, or leave it without teleporting. Both share one binding.
    EnterOrCancelTeleport,
    ConfirmTeleport,
    NextCandidate,
    PreviousCandidate,
    LightNearbyAnchor,
}

/// The player as seen by the teleport state machine.
pub trait PlayerRig {
    fn set_movement_enabled(&mut self, enabled: bool);
    fn set_visible(&mut self, visible: bool);
    fn pose(&self) -> Transform;
    fn place_at(&mut self, pose: Transform);
}

#[derive(Debug, Clone, Default)]
/// Transient state of one teleport cycle.
pub struct TeleportSession {
    state: TeleportState,
    source_anchor: Option<AnchorId>,
    candidates: Vec<AnchorId>,
    selected_index: Option<usize>,
    flight_target: Option<AnchorId>,
}

impl TeleportSession {
    pub fn state(&self) -> TeleportState {
        self.state
    }

    /// The lit anchor the player occupies.
    pub fn source_anchor(&self) -> Option<AnchorId> {
        self.source_anchor
    }

    /// Reachable targets in registry order. Only filled while selecting.
    pub fn candidates(&self) -> &[AnchorId] {
        &self.candidates
    }

    /// `None` unless there is at least one candidate.
    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn selected_candidate(&self) -> Option<AnchorId> {
        self.selected_index
            .and_then(|index| self.candidates.get(index))
            .copied()
    }

    /// Only set while flying.
    pub fn flight_target(&self) -> Option<AnchorId> {
        self.flight_target
    }
}

#[derive(Debug, Resource)]
/// Drives the Normal -> Selecting -> Flying -> Normal cycle of the anchor teleport.
///
/// The state machine never owns anchors: it keeps [`AnchorId`] handles and reads or mutates the
/// anchors through the registry it is handed on every tick.
pub struct TeleportStateMachine {
    session: TeleportSession,
    config: TeleportConfig,
    flight: FlightController,
    reentry_lock: Option<Timer>,
    highlighted: Option<AnchorId>,
}

impl TeleportStateMachine {
    pub fn new(config: TeleportConfig) -> TeleportStateMachine {
        TeleportStateMachine {
            session: TeleportSession::default(),
            config,
            flight: FlightController::default(),
            reentry_lock: None,
            highlighted: None,
        }
    }

    pub fn session(&self) -> &TeleportSession {
        &self.session
    }

    pub fn state(&self) -> TeleportState {
        self.session.state
    }

    pub fn flight(&self) -> &FlightController {
        &self.flight
    }

    pub fn is_reentry_locked(&self) -> bool {
        self.reentry_lock.is_some()
    }

    /// Run one simulation step: refresh the source anchor, handle the inputs of this tick in order,
    /// then advance the flight if one is running.
    pub fn tick(
        &mut self,
        delta: Duration,
        inputs: &[TeleportInput],
        registry: &mut AnchorRegistry,
        camera: &mut CameraRig,
        player: &mut impl PlayerRig,
    ) {
        if let Some(lock) = &mut self.reentry_lock {
            lock.tick(delta);
            if lock.finished() {
                self.reentry_lock = None;
            }
        }

        if self.session.state == TeleportState::Normal {
            self.session.source_anchor = registry.find_occupied_lit_anchor();
        }

        for input in inputs {
            match self.session.state {
                TeleportState::Normal => self.handle_normal_input(*input, registry, camera, player),
                TeleportState::Selecting => {
                    self.handle_selecting_input(*input, registry, camera, player)
                }
                TeleportState::Flying => debug!("Ignoring {:?} during the flight", input),
            }
        }

        if self.session.state == TeleportState::Flying {
            match self.flight.advance(delta.as_secs_f32()) {
                FlightStatus::InProgress(pose) => {
                    player.place_at(pose);
                    camera.activate_first_person_at(pose);
                }
                FlightStatus::Complete(pose) => {
                    if let Some(target) = self.session.flight_target {
                        info!("Arrived at anchor {}", anchor_name(registry, target));
                    }
                    self.return_to_normal(pose, registry, camera, player);
                }
            }
        }
    }

    fn handle_normal_input(
        &mut self,
        input: TeleportInput,
        registry: &mut AnchorRegistry,
        camera: &mut CameraRig,
        player: &mut impl PlayerRig,
    ) {
        match input {
            TeleportInput::LightNearbyAnchor => {
                let position = player.pose().translation;
                match registry.find_unlit_anchor_near_player(position, self.config.interaction_radius)
                {
                    Some(id) => {
                        if registry.light_up(id) {
                            info!("Lit anchor {}", anchor_name(registry, id));
                        }
                    }
                    None => debug!("No unlit anchor to light near the player"),
                }
            }
            TeleportInput::EnterOrCancelTeleport => {
                if self.is_reentry_locked() {
                    debug!("Teleport mode was just left, ignoring re-entry");
                    return;
                }
                match self.session.source_anchor {
                    Some(source) => self.enter_selecting(source, registry, camera, player),
                    None => debug!("Not standing in a lit anchor, cannot enter teleport mode"),
                }
            }
            TeleportInput::ConfirmTeleport
            | TeleportInput::NextCandidate
            | TeleportInput::PreviousCandidate => {}
        }
    }

    fn handle_selecting_input(
        &mut self,
        input: TeleportInput,
        registry: &mut AnchorRegistry,
        camera: &mut CameraRig,
        player: &mut impl PlayerRig,
    ) {
        match input {
            TeleportInput::EnterOrCancelTeleport => self.cancel(registry, camera, player),
            TeleportInput::NextCandidate => self.cycle_selection(1, registry),
            TeleportInput::PreviousCandidate => self.cycle_selection(-1, registry),
            TeleportInput::ConfirmTeleport => self.confirm(registry, camera, player),
            TeleportInput::LightNearbyAnchor => {}
        }
    }

    fn enter_selecting(
        &mut self,
        source: AnchorId,
        registry: &mut AnchorRegistry,
        camera: &mut CameraRig,
        player: &mut impl PlayerRig,
    ) {
        let view_point = match registry.get(source) {
            Some(anchor) => anchor.view_point(),
            None => return,
        };

        player.set_movement_enabled(false);
        player.set_visible(false);
        camera.activate_first_person_at(view_point);

        self.session.candidates = collect_candidates(registry, source);
        self.session.selected_index = (!self.session.candidates.is_empty()).then_some(0);
        self.session.state = TeleportState::Selecting;
        self.highlight(self.session.selected_candidate(), registry);

        info!(
            "Entered teleport mode at anchor {} with {} target(s)",
            anchor_name(registry, source),
            self.session.candidates.len()
        );
    }

    fn cycle_selection(&mut self, step: isize, registry: &mut AnchorRegistry) {
        let count = self.session.candidates.len();
        let current = match self.session.selected_index {
            Some(index) if count > 0 => index,
            _ => return,
        };
        let next = (current as isize + step).rem_euclid(count as isize) as usize;
        self.session.selected_index = Some(next);
        self.highlight(self.session.selected_candidate(), registry);
    }

    fn cancel(
        &mut self,
        registry: &mut AnchorRegistry,
        camera: &mut CameraRig,
        player: &mut impl PlayerRig,
    ) {
        let pose = self
            .session
            .source_anchor
            .and_then(|source| registry.get(source))
            .map(|anchor| anchor.teleport_point())
            .unwrap_or_else(|| player.pose());
        info!("Left teleport mode without teleporting");
        self.return_to_normal(pose, registry, camera, player);
    }

    fn confirm(
        &mut self,
        registry: &mut AnchorRegistry,
        camera: &mut CameraRig,
        player: &mut impl PlayerRig,
    ) {
        // Either end may have been put out while selecting
        let is_lit = |id: &AnchorId| registry.get(*id).map_or(false, |anchor| anchor.is_lit());
        let target = self.session.selected_candidate().filter(is_lit);
        let source = self.session.source_anchor.filter(is_lit);
        let (target, source) = match (target, source) {
            (Some(target), Some(source)) => (target, source),
            _ => {
                debug!("No target to teleport to");
                self.cancel(registry, camera, player);
                return;
            }
        };
        let (start, end) = match (registry.get(source), registry.get(target)) {
            (Some(source), Some(target)) => (source.view_point(), target.teleport_point()),
            _ => {
                self.cancel(registry, camera, player);
                return;
            }
        };

        self.highlight(None, registry);
        self.session.flight_target = Some(target);
        self.session.state = TeleportState::Flying;
        self.flight.begin(
            start,
            end,
            self.config.flight_duration,
            self.config.arc_height,
        );
        info!(
            "Flying from anchor {} to anchor {}",
            anchor_name(registry, source),
            anchor_name(registry, target)
        );
    }

    fn return_to_normal(
        &mut self,
        pose: Transform,
        registry: &mut AnchorRegistry,
        camera: &mut CameraRig,
        player: &mut impl PlayerRig,
    ) {
        player.place_at(pose);
        player.set_visible(true);
        player.set_movement_enabled(true);
        camera.activate_free_roam();
        self.highlight(None, registry);

        self.session.state = TeleportState::Normal;
        self.session.candidates.clear();
        self.session.selected_index = None;
        self.session.flight_target = None;
        self.reentry_lock = Some(Timer::new(
            self.config.reentry_cooldown(),
            TimerMode::Once,
        ));
    }

    /// Clear the previous highlight and set the new one.
    fn highlight(&mut self, anchor: Option<AnchorId>, registry: &mut AnchorRegistry) {
        if let Some(previous) = self.highlighted.take() {
            registry.set_selected(previous, false);
        }
        if let Some(anchor) = anchor {
            registry.set_selected(anchor, true);
            self.highlighted = Some(anchor);
        }
    }
}

fn anchor_name(registry: &AnchorRegistry, id: AnchorId) -> &str {
    registry.get(id).map_or("<unknown>", |anchor| anchor.name())
}
