use std::{env, path::PathBuf, time::Duration};

// Runtime constants (not simulation tuning).

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / 60);
pub const WORLD_BROADCAST_CAPACITY: usize = 128;

const MAX_EXECUTION_SPEED: f32 = 10.0;

/// Global speed multiplier; non-positive or unparsable values fall back to 1.
pub fn execution_speed() -> f32 {
    env::var("SIM_EXECUTION_SPEED")
        .ok()
        .and_then(|value| value.trim().parse::<f32>().ok())
        .filter(|speed| speed.is_finite() && *speed > 0.0)
        .map_or(1.0, |speed| speed.min(MAX_EXECUTION_SPEED))
}

/// Scenario file from the first CLI argument, else `SIM_SCENARIO`.
pub fn scenario_path() -> Option<PathBuf> {
    env::args()
        .nth(1)
        .or_else(|| env::var("SIM_SCENARIO").ok())
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
}
