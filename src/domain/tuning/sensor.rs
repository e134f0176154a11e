/// Tuning for the raycast range sensors.

#[derive(Debug, Clone, Copy)]
pub struct SensorTuning {
    /// Rays start this far behind the drone so a center sitting on a wall face still hits it.
    pub back_margin: f32,

    /// Longest ray, cm.
    pub max_range: f32,

    /// Reading reported when nothing is hit.
    pub no_hit_distance: f32,

    /// Below this altitude the ray is cast from `ground_ray_height` instead.
    pub ground_altitude: f32,
    pub ground_ray_height: f32,
}

impl Default for SensorTuning {
    fn default() -> Self {
        Self {
            back_margin: 15.0,
            max_range: 1000.0,
            no_hit_distance: 500.0,
            ground_altitude: 10.0,
            ground_ray_height: 40.0,
        }
    }
}
