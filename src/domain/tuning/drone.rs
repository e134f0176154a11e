/// Gameplay tuning for the simulated drone.
///
/// Keep this separate from runtime configuration (tick rates, buffer sizes, etc.).

#[derive(Debug, Clone, Copy)]
pub struct DroneTuning {
    /// Linear speed of the move kinds and complex motion, cm per second.
    pub cruise_speed: f32,

    /// Altitude gained by takeoff, cm.
    pub takeoff_altitude: f32,

    /// Takeoff and landing duration in seconds.
    pub takeoff_seconds: f32,
    pub land_seconds: f32,

    /// Duration of an absolute goto.
    pub goto_seconds: f32,

    /// Duration of heading-only turns (by degrees or to an absolute heading).
    pub turn_seconds: f32,

    /// Turn rate of a timed turn at full power, degrees per second.
    pub full_power_turn_rate: f32,

    /// Probe offset used by the grid collision check, cm.
    pub collision_radius: f32,
}

impl Default for DroneTuning {
    fn default() -> Self {
        Self {
            cruise_speed: 50.0,
            takeoff_altitude: 80.0,
            takeoff_seconds: 1.5,
            land_seconds: 1.5,
            goto_seconds: 2.0,
            turn_seconds: 1.0,
            full_power_turn_rate: 90.0,
            collision_radius: 15.0,
        }
    }
}
