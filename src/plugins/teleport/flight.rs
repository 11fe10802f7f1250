use bevy::prelude::*;

/// Progress this close to the end counts as arrived, so that tick deltas summing to the duration
/// complete the flight despite rounding.
const COMPLETION_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlightStatus {
    InProgress(Transform),
    /// Carries the exact end pose of the flight.
    Complete(Transform),
}

#[derive(Debug, Clone, Default)]
/// Arc shaped flight between two poses, advanced explicitly by the caller.
///
/// The position follows a quadratic Bézier curve whose control point sits `arc_height` above the
/// middle of the segment: it is computed as a lerp between a lerp from the start to the control
/// point and a lerp from the control point to the end.
pub struct FlightController {
    start: Transform,
    end: Transform,
    control: Vec3,
    duration: f32,
    progress: f32,
    rotation: Quat,
    active: bool,
}

impl FlightController {
    pub fn begin(&mut self, start: Transform, end: Transform, duration: f32, arc_height: f32) {
        let mut control = start.translation.lerp(end.translation, 0.5);
        control.y += arc_height;
        *self = FlightController {
            start,
            end,
            control,
            duration,
            progress: 0.,
            rotation: start.rotation,
            active: true,
        };
    }

    pub fn advance(&mut self, delta_seconds: f32) -> FlightStatus {
        if !self.active {
            return FlightStatus::Complete(self.end);
        }

        self.progress = if self.duration > 0. {
            (self.progress + delta_seconds / self.duration).min(1.)
        } else {
            1.
        };

        if self.progress >= 1. - COMPLETION_EPSILON {
            self.progress = 1.;
            self.active = false;
            return FlightStatus::Complete(self.end);
        }

        let translation = self.position_at(self.progress);
        self.rotation = self.facing_end_from(translation);
        FlightStatus::InProgress(Transform {
            translation,
            rotation: self.rotation,
            scale: self.start.scale,
        })
    }

    pub fn position_at(&self, t: f32) -> Vec3 {
        let a = self.start.translation.lerp(self.control, t);
        let b = self.control.lerp(self.end.translation, t);
        a.lerp(b, t)
    }

    /// Start, control point and end of the current flight.
    pub fn polyline(&self) -> Option<[Vec3; 3]> {
        self.active
            .then_some([self.start.translation, self.control, self.end.translation])
    }

    fn facing_end_from(&self, position: Vec3) -> Quat {
        let direction = self.end.translation - position;
        // Looking straight up or down, or sitting on the target, has no usable orientation
        if direction.length_squared() < 1e-6
            || direction.normalize().cross(Vec3::Y).length_squared() < 1e-6
        {
            return self.rotation;
        }
        Transform::from_translation(position)
            .looking_at(self.end.translation, Vec3::Y)
            .rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn flight(arc_height: f32) -> FlightController {
        let mut flight = FlightController::default();
        flight.begin(
            Transform::from_xyz(0., 1., 0.),
            Transform::from_xyz(10., 3., 4.).with_rotation(Quat::from_rotation_y(1.2)),
            0.6,
            arc_height,
        );
        flight
    }

    #[test]
    fn test_final_pose_is_exactly_the_end_pose() {
        let mut flight = flight(3.);
        let end = Transform::from_xyz(10., 3., 4.).with_rotation(Quat::from_rotation_y(1.2));
        let mut last = None;
        for _ in 0..6 {
            last = Some(flight.advance(0.1));
        }
        assert_eq!(last, Some(FlightStatus::Complete(end)));
        assert_eq!(flight.polyline(), None);
    }

    #[test]
    fn test_in_progress_until_duration_elapsed() {
        let mut flight = flight(3.);
        for _ in 0..5 {
            assert!(matches!(flight.advance(0.1), FlightStatus::InProgress(_)));
        }
        assert!(matches!(flight.advance(0.1), FlightStatus::Complete(_)));
    }

    #[test]
    fn test_midpoint_sits_on_the_raised_arc() {
        let arc_height = 3.;
        let mut flight = flight(arc_height);
        let linear_mid = Vec3::new(5., 2., 2.);
        match flight.advance(0.3) {
            FlightStatus::InProgress(pose) => {
                // Quadratic Bézier at t = 0.5: a quarter of each end plus half of the control
                // point, which is `arc_height` above the linear midpoint.
                let expected = linear_mid + Vec3::Y * arc_height * 0.5;
                assert!(pose.translation.abs_diff_eq(expected, EPSILON));
            }
            status => panic!("unexpected status {:?}", status),
        }
        let [start, control, end] = flight.polyline().unwrap();
        assert_eq!(start, Vec3::new(0., 1., 0.));
        assert!(control.abs_diff_eq(linear_mid + Vec3::Y * arc_height, EPSILON));
        assert_eq!(end, Vec3::new(10., 3., 4.));
    }

    #[test]
    fn test_zero_arc_height_is_a_straight_line() {
        let flight = flight(0.);
        let expected = Vec3::new(0., 1., 0.).lerp(Vec3::new(10., 3., 4.), 0.25);
        assert!(flight.position_at(0.25).abs_diff_eq(expected, EPSILON));
    }

    #[test]
    fn test_orientation_faces_the_end() {
        let mut flight = flight(3.);
        if let FlightStatus::InProgress(pose) = flight.advance(0.15) {
            let to_end = (Vec3::new(10., 3., 4.) - pose.translation).normalize();
            assert!(pose.forward().abs_diff_eq(to_end, EPSILON));
        } else {
            panic!("flight should still be in progress");
        }
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let mut flight = FlightController::default();
        let end = Transform::from_xyz(1., 0., 1.);
        flight.begin(Transform::IDENTITY, end, 0., 3.);
        assert_eq!(flight.advance(0.), FlightStatus::Complete(end));
    }

    #[test]
    fn test_idle_controller_has_no_polyline() {
        let mut flight = FlightController::default();
        assert!(flight.polyline().is_none());
        assert!(matches!(flight.advance(0.1), FlightStatus::Complete(_)));
    }

    #[test]
    fn test_vertical_flight_keeps_previous_orientation() {
        let mut flight = FlightController::default();
        let start = Transform::IDENTITY.with_rotation(Quat::from_rotation_y(0.5));
        flight.begin(start, Transform::from_xyz(0., 10., 0.), 1., 0.);
        match flight.advance(0.5) {
            FlightStatus::InProgress(pose) => assert_eq!(pose.rotation, start.rotation),
            status => panic!("unexpected status {:?}", status),
        }
    }
}
