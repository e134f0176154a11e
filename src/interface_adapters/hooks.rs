// Default hooks adapter: the console sink and UI callbacks become tracing events.

use crate::domain::{EngineHooks, LedAppearance, MissionResult};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHooks;

impl EngineHooks for TracingHooks {
    fn log(&self, message: &str) {
        info!(target: "console", "{message}");
    }

    fn highlight(&self, command_id: &str, on: bool) {
        debug!(target: "console", command_id, on, "highlight");
    }

    fn report_progress(&self, current: usize, total: usize) {
        debug!(target: "console", current, total, "progress");
    }

    fn led_changed(&self, appearance: &LedAppearance) {
        debug!(
            target: "console",
            r = appearance.color.r,
            g = appearance.color.g,
            b = appearance.color.b,
            opacity = appearance.opacity,
            intensity = appearance.intensity,
            "led"
        );
    }

    fn mission_completed(&self, result: &MissionResult) {
        info!(
            target: "console",
            beacons = result.beacons_triggered,
            seconds = result.time_elapsed_seconds,
            score = result.score,
            "mission completed"
        );
    }
}
