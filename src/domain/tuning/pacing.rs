use std::time::Duration;

// Fixed pacing delays; all are scaled by the execution speed when waited on.

pub const SETTLE: Duration = Duration::from_millis(200);
pub const GROUNDED_SKIP: Duration = Duration::from_millis(200);
pub const LED_SETTLE: Duration = Duration::from_millis(100);
pub const LED_BLINK: Duration = Duration::from_millis(1000);
pub const LED_DIM_SECONDS: f32 = 1.5;
pub const PRINT_SETTLE: Duration = Duration::from_millis(200);
pub const PAYLOAD_DWELL: Duration = Duration::from_millis(2000);
pub const KEY_POLL: Duration = Duration::from_millis(100);

// Live execution guards.
pub const LIVE_MIN_COMMAND: Duration = Duration::from_millis(100);
pub const LIVE_COLLISION_COOLDOWN: Duration = Duration::from_millis(500);
pub const LIVE_LOOP_PAUSE: Duration = Duration::from_millis(30);
