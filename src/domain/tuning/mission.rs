/// Scoring and trigger tuning for mission scenes.

#[derive(Debug, Clone, Copy)]
pub struct MissionTuning {
    /// Horizontal trigger radius around a beacon.
    pub beacon_radius: f32,
    /// Beacons float at this altitude; the drone must be within the tolerance.
    pub beacon_altitude: f32,
    pub beacon_altitude_tolerance: f32,
    /// Dwell accumulated per tick while inside the trigger volume.
    pub beacon_dwell_step: f32,
    pub beacon_dwell_target: f32,
    pub beacon_score: i64,

    /// Horizontal radius around the exit cell.
    pub exit_radius: f32,
    /// The mission clock starts once the drone climbs above this altitude.
    pub clock_start_altitude: f32,

    /// Time bonus is `max(0, (window - elapsed) * per_second)`.
    pub time_bonus_window_seconds: i64,
    pub time_bonus_per_second: i64,

    /// Landing within this distance of the target earns `landing_score`.
    pub landing_tolerance: f32,
    pub landing_score: i64,

    /// Flight time available in the city scene before an emergency stop.
    pub battery_seconds: f32,
}

impl Default for MissionTuning {
    fn default() -> Self {
        Self {
            beacon_radius: 70.0,
            beacon_altitude: 50.0,
            beacon_altitude_tolerance: 45.0,
            beacon_dwell_step: 0.02,
            beacon_dwell_target: 3.0,
            beacon_score: 100,
            exit_radius: 120.0,
            clock_start_altitude: 10.0,
            time_bonus_window_seconds: 300,
            time_bonus_per_second: 2,
            landing_tolerance: 20.0,
            landing_score: 10,
            battery_seconds: 120.0,
        }
    }
}
