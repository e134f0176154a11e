use crate::domain::command::Direction;
use crate::domain::state::{DroneState, FlightState};

// Heading convention: 0 deg faces +z, 90 deg faces +x. Positive turns are to the left.

/// Unit forward vector `(x, z)` for a heading in degrees.
pub fn heading_vector(heading: f32) -> (f32, f32) {
    let rad = heading.to_radians();
    (rad.sin(), rad.cos())
}

/// Unit velocity `(x, y, z)` of a move kind at the given heading.
pub fn direction_vector(direction: Direction, heading: f32) -> (f32, f32, f32) {
    let (fx, fz) = heading_vector(heading);
    match direction {
        Direction::Forward => (fx, 0.0, fz),
        Direction::Backward => (-fx, 0.0, -fz),
        // Left is the heading rotated +90 deg, right is -90 deg.
        Direction::Left => (fz, 0.0, -fx),
        Direction::Right => (-fz, 0.0, fx),
        Direction::Up => (0.0, 1.0, 0.0),
        Direction::Down => (0.0, -1.0, 0.0),
    }
}

/// Displacement planned by a complex move from the current stick positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexMotion {
    pub dx: f32,
    pub dy: f32,
    pub dz: f32,
    pub dheading: f32,
}

/// Pitch drives along the heading, roll to the right, throttle up, yaw turns left.
pub fn complex_motion(
    flight: &FlightState,
    heading: f32,
    speed: f32,
    turn_rate: f32,
    seconds: f32,
) -> ComplexMotion {
    let (fx, fz) = heading_vector(heading);
    let (rx, rz) = (-fz, fx);

    let pitch = flight.pitch / 100.0;
    let roll = flight.roll / 100.0;
    let throttle = flight.throttle / 100.0;
    let yaw = flight.yaw / 100.0;

    ComplexMotion {
        dx: (pitch * fx + roll * rx) * speed * seconds,
        dy: throttle * speed * seconds,
        dz: (pitch * fz + roll * rz) * speed * seconds,
        dheading: yaw * turn_rate * seconds,
    }
}

/// Applies one incremental step of a planned displacement.
///
/// Steps are relative so a position corrected by the collision pass between
/// ticks is kept instead of being overwritten. Altitude never goes below `ground`.
pub fn step_position(state: &mut DroneState, delta: (f32, f32, f32), fraction: f32, ground: f32) {
    state.x += delta.0 * fraction;
    state.z += delta.2 * fraction;
    state.y = (state.y + delta.1 * fraction).max(ground);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: (f32, f32, f32), expected: (f32, f32, f32)) {
        let eps = 1e-5;
        assert!(
            (actual.0 - expected.0).abs() < eps
                && (actual.1 - expected.1).abs() < eps
                && (actual.2 - expected.2).abs() < eps,
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn default_heading_flies_forward_along_negative_z() {
        assert_close(direction_vector(Direction::Forward, 180.0), (0.0, 0.0, -1.0));
        assert_close(direction_vector(Direction::Backward, 180.0), (0.0, 0.0, 1.0));
    }

    #[test]
    fn left_and_right_are_perpendicular_to_forward() {
        assert_close(direction_vector(Direction::Left, 0.0), (1.0, 0.0, 0.0));
        assert_close(direction_vector(Direction::Right, 0.0), (-1.0, 0.0, 0.0));
        // Left at heading h is forward at heading h + 90.
        let (fx, fz) = heading_vector(120.0);
        assert_close(direction_vector(Direction::Left, 30.0), (fx, 0.0, fz));
    }

    #[test]
    fn vertical_moves_ignore_heading() {
        assert_close(direction_vector(Direction::Up, 73.0), (0.0, 1.0, 0.0));
        assert_close(direction_vector(Direction::Down, 73.0), (0.0, -1.0, 0.0));
    }

    #[test]
    fn complex_motion_combines_sticks() {
        let flight = FlightState {
            roll: 0.0,
            pitch: 100.0,
            yaw: 50.0,
            throttle: -20.0,
        };
        let motion = complex_motion(&flight, 180.0, 50.0, 90.0, 2.0);
        assert!(motion.dx.abs() < 1e-4);
        assert!((motion.dz + 100.0).abs() < 1e-4);
        assert!((motion.dy + 20.0).abs() < 1e-4);
        assert!((motion.dheading - 90.0).abs() < 1e-4);
    }

    #[test]
    fn steps_clamp_altitude_to_ground() {
        let mut state = DroneState::default();
        state.y = 10.0;
        step_position(&mut state, (0.0, -50.0, 0.0), 0.5, 0.0);
        assert_eq!(state.y, 0.0);
    }
}
