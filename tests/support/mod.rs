// Shared fakes and bootstrap helpers for the engine integration tests.
#![allow(dead_code)]
use drone_sim::domain::{EngineHooks, LedAppearance, MissionResult, Scene};
use drone_sim::{Simulator, SimulatorSettings};
use std::sync::{Arc, Mutex};

// Records every hook call so tests can assert on what the UI would have seen.
#[derive(Default)]
pub struct RecordingHooks {
    logs: Mutex<Vec<String>>,
    highlights: Mutex<Vec<(String, bool)>>,
    progress: Mutex<Vec<(usize, usize)>>,
    leds: Mutex<Vec<LedAppearance>>,
    missions: Mutex<Vec<MissionResult>>,
}

impl RecordingHooks {
    pub fn logs(&self) -> Vec<String> {
        self.logs.lock().expect("logs lock").clone()
    }

    pub fn highlights(&self) -> Vec<(String, bool)> {
        self.highlights.lock().expect("highlights lock").clone()
    }

    pub fn progress(&self) -> Vec<(usize, usize)> {
        self.progress.lock().expect("progress lock").clone()
    }

    pub fn leds(&self) -> Vec<LedAppearance> {
        self.leds.lock().expect("leds lock").clone()
    }

    pub fn missions(&self) -> Vec<MissionResult> {
        self.missions.lock().expect("missions lock").clone()
    }
}

impl EngineHooks for RecordingHooks {
    fn log(&self, message: &str) {
        self.logs.lock().expect("logs lock").push(message.to_string());
    }

    fn highlight(&self, command_id: &str, on: bool) {
        self.highlights
            .lock()
            .expect("highlights lock")
            .push((command_id.to_string(), on));
    }

    fn report_progress(&self, current: usize, total: usize) {
        self.progress
            .lock()
            .expect("progress lock")
            .push((current, total));
    }

    fn led_changed(&self, appearance: &LedAppearance) {
        self.leds.lock().expect("leds lock").push(*appearance);
    }

    fn mission_completed(&self, result: &MissionResult) {
        self.missions.lock().expect("missions lock").push(*result);
    }
}

// Spawns a simulator on the current (usually paused) test runtime.
pub fn spawn(scene: Scene) -> (Simulator, Arc<RecordingHooks>) {
    let hooks = Arc::new(RecordingHooks::default());
    let simulator = Simulator::spawn(scene, hooks.clone(), SimulatorSettings::default());
    (simulator, hooks)
}

// Puts the drone in the air without running a takeoff.
pub fn hover_at(simulator: &Simulator, altitude: f32) {
    simulator.context().with_world(|world| {
        world.state.y = altitude;
        world.state.is_flying = true;
    });
}

pub fn assert_close(actual: f32, expected: f32, tolerance: f32) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}
