// Aggregate simulation state shared by the frame loop and the executors.

use crate::domain::grid::CellCode;
use crate::domain::scene::Scene;
use crate::domain::state::{
    DroneSnapshot, DroneState, FlightState, LedAppearance, MissionResult, SafePosition,
};
use crate::domain::systems::collision::{self, CollisionConfig};
use crate::domain::systems::mission::{self, LandingScore, MissionEvent, MissionTracker};
use crate::domain::systems::sensors::{self, SensorKind, SensorWorld, Unit};
use crate::domain::tuning::{DroneTuning, MissionTuning, SensorTuning};
use std::time::Duration;
use tracing::{debug, info};

/// Side effects produced by one frame, applied by the caller outside the lock.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    Log(String),
    CollisionEntered,
    MissionCompleted(MissionResult),
    BatteryDepleted,
}

#[derive(Debug, Clone)]
pub struct World {
    pub state: DroneState,
    pub flight: FlightState,
    pub safe: SafePosition,
    pub scene: Scene,
    pub led: LedAppearance,
    pub mission: MissionTracker,
    pub waiting_for_key: bool,
    pub execution_speed: f32,
    /// Bumped once per newly entered collision episode.
    pub collision_episodes: u64,
    pub highlighted: Option<String>,

    pub drone_tuning: DroneTuning,
    pub sensor_tuning: SensorTuning,
    pub mission_tuning: MissionTuning,

    active_run: Option<u64>,
    next_run: u64,
}

impl World {
    pub fn new(scene: Scene) -> Self {
        let start = scene.start;
        Self {
            state: DroneState::at(start),
            flight: FlightState::default(),
            safe: SafePosition {
                x: start.x,
                z: start.z,
            },
            scene,
            led: LedAppearance::off(),
            mission: MissionTracker::default(),
            waiting_for_key: false,
            execution_speed: 1.0,
            collision_episodes: 0,
            highlighted: None,
            drone_tuning: DroneTuning::default(),
            sensor_tuning: SensorTuning::default(),
            mission_tuning: MissionTuning::default(),
            active_run: None,
            next_run: 1,
        }
    }

    /// One render tick: collision correction first, then mission bookkeeping.
    pub fn step_frame(&mut self, dt: Duration) -> Vec<FrameEvent> {
        let mut events = Vec::new();

        match &self.scene.grid {
            Some(grid) => {
                let cfg = CollisionConfig {
                    radius: self.drone_tuning.collision_radius,
                    ceiling: self.scene.kind.collision_ceiling(),
                };
                let outcome =
                    collision::resolve_collisions(&mut self.state, &mut self.safe, grid, cfg);
                if outcome.entered {
                    self.collision_episodes += 1;
                    events.push(FrameEvent::CollisionEntered);
                }
            }
            None => {
                self.safe.x = self.state.x;
                self.safe.z = self.state.z;
            }
        }

        let mission_events = mission::tick_mission(
            &mut self.mission,
            &mut self.state,
            &mut self.scene,
            &self.mission_tuning,
            dt,
        );
        for event in mission_events {
            match event {
                MissionEvent::ClockStarted => {
                    debug!("mission clock started");
                }
                MissionEvent::BeaconTriggered { triggered, total } => {
                    events.push(FrameEvent::Log(format!(
                        "Beacon triggered! ({triggered}/{total})"
                    )));
                }
                MissionEvent::Completed(result) => {
                    info!(
                        score = result.score,
                        seconds = result.time_elapsed_seconds,
                        beacons = result.beacons_triggered,
                        "mission completed"
                    );
                    events.push(FrameEvent::Log(
                        "Exit reached! Calculating score...".to_string(),
                    ));
                    events.push(FrameEvent::MissionCompleted(result));
                }
                MissionEvent::BatteryDepleted => {
                    events.push(FrameEvent::Log(
                        "Battery depleted! The drone is going down.".to_string(),
                    ));
                    events.push(FrameEvent::BatteryDepleted);
                }
            }
        }

        events
    }

    /// Range reading against the loaded scene.
    pub fn measure(&self, kind: SensorKind, unit: Unit) -> f32 {
        let world = SensorWorld {
            grid: self.scene.grid.as_ref(),
            wall_height: self.scene.kind.wall_height(),
        };
        sensors::measure(&self.state, world, kind, unit, &self.sensor_tuning)
    }

    pub fn ground_height(&self) -> f32 {
        self.scene.ground_height(self.state.x, self.state.z)
    }

    /// Cell code directly under the drone, if a grid is loaded and covers it.
    pub fn cell_under_drone(&self) -> Option<CellCode> {
        self.scene
            .grid
            .as_ref()
            .and_then(|grid| grid.code_at(self.state.x, self.state.z))
    }

    /// Wall-clock length of a simulated duration at the current speed.
    pub fn scaled(&self, duration: Duration) -> Duration {
        duration.div_f32(self.execution_speed.max(f32::EPSILON))
    }

    pub fn set_execution_speed(&mut self, speed: f32) {
        if speed.is_finite() && speed > 0.0 {
            self.execution_speed = speed;
        }
    }

    /// Claims the single run slot. Returns a token for `end_run`.
    pub fn try_begin_run(&mut self) -> Option<u64> {
        if self.active_run.is_some() {
            return None;
        }
        let token = self.next_run;
        self.next_run += 1;
        self.active_run = Some(token);
        self.state.is_running = true;
        Some(token)
    }

    /// Releases the run slot if `token` still owns it. Returns whether it did.
    pub fn end_run(&mut self, token: u64) -> bool {
        if self.active_run != Some(token) {
            return false;
        }
        self.active_run = None;
        self.state.is_running = false;
        true
    }

    /// Drops the run slot without touching the drone.
    pub fn release_run(&mut self) {
        self.active_run = None;
        self.state.is_running = false;
    }

    pub fn score_landing(&mut self) -> Option<LandingScore> {
        mission::score_landing(
            &mut self.mission,
            &self.state,
            &self.scene,
            &self.mission_tuning,
        )
    }

    /// Forces the drone to the ground and releases the run slot.
    ///
    /// Returns the block id that was highlighted so the caller can clear it.
    pub fn emergency_stop(&mut self) -> Option<String> {
        self.release_run();
        self.state.is_flying = false;
        self.state.y = self.ground_height().max(0.0);
        self.waiting_for_key = false;
        self.highlighted.take()
    }

    /// Restores the scene start: pose, safe cache, mission and beacons, LED.
    pub fn reset(&mut self) {
        let start = self.scene.start;
        self.state = DroneState::at(start);
        self.flight = FlightState::default();
        self.safe = SafePosition {
            x: start.x,
            z: start.z,
        };
        self.mission = MissionTracker::default();
        for beacon in &mut self.scene.beacons {
            beacon.reset();
        }
        self.led = LedAppearance::off();
        self.waiting_for_key = false;
        self.highlighted = None;
        self.active_run = None;
    }

    pub fn load_scene(&mut self, scene: Scene) {
        info!(kind = ?scene.kind, has_grid = scene.grid.is_some(), "scene loaded");
        self.scene = scene;
        self.reset();
    }

    pub fn snapshot(&self, stop_signal: bool) -> DroneSnapshot {
        DroneSnapshot {
            x: self.state.x,
            y: self.state.y,
            z: self.state.z,
            heading: self.state.heading,
            is_flying: self.state.is_flying,
            is_running: self.state.is_running,
            stop_signal,
            collision_detected: self.state.collision_detected,
            has_water: self.state.has_water,
            mission_completed: self.state.mission_completed,
            score: self.mission.score,
            led: self.led,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Scene::free())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::{self, OccupancyGrid};
    use crate::domain::scene::SceneKind;
    use crate::domain::state::Pose;

    const TICK: Duration = Duration::from_millis(16);

    fn walled_world() -> World {
        // Wall column at x in [100, 200).
        let cells = vec![vec![0, 1, 0], vec![0, 1, 0], vec![0, 1, 0]];
        let grid = OccupancyGrid::new(cells, 100.0, 0.0, 0.0);
        let scene =
            Scene::from_grid(SceneKind::Free, grid).with_start(Pose::new(50.0, 0.0, 150.0, 90.0));
        World::new(scene)
    }

    #[test]
    fn diagonal_push_into_wall_slides_along_the_face() {
        let mut world = walled_world();
        world.state.y = 50.0;
        world.step_frame(TICK);
        assert_eq!((world.safe.x, world.safe.z), (50.0, 150.0));

        // Push into the wall on x while also moving along z.
        world.state.x = 90.0;
        world.state.z = 170.0;
        let events = world.step_frame(TICK);

        assert_eq!(events, vec![FrameEvent::CollisionEntered]);
        assert_eq!(world.state.x, 50.0);
        assert_eq!(world.state.z, 170.0);
        assert_eq!(world.collision_episodes, 1);

        // Staying in contact is the same episode.
        world.state.x = 90.0;
        assert!(world.step_frame(TICK).is_empty());
        assert_eq!(world.collision_episodes, 1);
    }

    #[test]
    fn run_slot_is_exclusive_and_token_guarded() {
        let mut world = World::default();
        let first = world.try_begin_run().expect("slot free");
        assert!(world.try_begin_run().is_none());

        world.emergency_stop();
        let second = world.try_begin_run().expect("slot released by stop");

        // A stale run finishing late must not release the new one.
        assert!(!world.end_run(first));
        assert!(world.state.is_running);
        assert!(world.end_run(second));
        assert!(!world.state.is_running);
    }

    #[test]
    fn emergency_stop_grounds_the_drone() {
        let mut world = World::default();
        world.state.is_flying = true;
        world.state.y = 80.0;
        world.waiting_for_key = true;
        world.highlighted = Some("blk-7".to_string());

        assert_eq!(world.emergency_stop().as_deref(), Some("blk-7"));
        assert!(!world.state.is_flying);
        assert_eq!(world.state.y, 0.0);
        assert!(!world.waiting_for_key);
        assert_eq!(world.emergency_stop(), None);
    }

    #[test]
    fn reset_restores_start_and_mission() {
        let cells = vec![vec![grid::START, grid::BEACON, grid::EXIT]];
        let scene = Scene::from_grid(SceneKind::Tunnel, OccupancyGrid::new(cells, 100.0, 0.0, 0.0));
        let mut world = World::new(scene);
        world.state.x = 260.0;
        world.state.is_flying = true;
        world.mission.score = 300;
        world.scene.beacons[0].triggered = true;
        world.led = LedAppearance::full(crate::domain::state::Rgb::new(255, 0, 0));

        world.reset();

        assert_eq!((world.state.x, world.state.z), (50.0, 50.0));
        assert_eq!(world.state.heading, 180.0);
        assert_eq!((world.safe.x, world.safe.z), (50.0, 50.0));
        assert_eq!(world.mission.score, 0);
        assert!(!world.scene.beacons[0].triggered);
        assert_eq!(world.led, LedAppearance::off());
    }

    #[test]
    fn speed_multiplier_shortens_waits() {
        let mut world = World::default();
        world.set_execution_speed(2.0);
        assert_eq!(world.scaled(Duration::from_millis(200)), Duration::from_millis(100));
        world.set_execution_speed(0.0);
        assert_eq!(world.execution_speed, 2.0);
    }
}
