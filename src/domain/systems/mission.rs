use crate::domain::scene::Scene;
use crate::domain::state::{DroneState, MissionResult};
use crate::domain::tuning::MissionTuning;
use std::time::Duration;
use tracing::info;

/// Per-scene mission progress, driven by simulation time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissionTracker {
    pub clock: Duration,
    pub takeoff_at: Option<Duration>,
    pub score: i64,
    pub beacons_triggered: u32,
    pub has_taken_off: bool,
    pub battery_depleted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MissionEvent {
    ClockStarted,
    BeaconTriggered { triggered: u32, total: usize },
    Completed(MissionResult),
    BatteryDepleted,
}

impl MissionTracker {
    pub fn elapsed_since_takeoff(&self) -> Option<Duration> {
        self.takeoff_at.map(|at| self.clock.saturating_sub(at))
    }
}

/// Advances mission logic by one tick of `dt`.
pub fn tick_mission(
    tracker: &mut MissionTracker,
    state: &mut DroneState,
    scene: &mut Scene,
    tuning: &MissionTuning,
    dt: Duration,
) -> Vec<MissionEvent> {
    tracker.clock += dt;

    let mut events = Vec::new();
    let kind = scene.kind;
    if !kind.has_mission() && !kind.has_battery() {
        return events;
    }

    if !state.mission_completed
        && tracker.takeoff_at.is_none()
        && state.y > tuning.clock_start_altitude
    {
        tracker.takeoff_at = Some(tracker.clock);
        events.push(MissionEvent::ClockStarted);
    }

    if state.is_flying && !state.mission_completed {
        let total = scene.beacons.len();
        for beacon in scene.beacons.iter_mut().filter(|b| !b.triggered) {
            let distance = state.horizontal_distance_to(beacon.x, beacon.z);
            let altitude_gap = (state.y - tuning.beacon_altitude).abs();
            if distance < tuning.beacon_radius && altitude_gap < tuning.beacon_altitude_tolerance {
                beacon.hover += tuning.beacon_dwell_step;
                if beacon.hover >= tuning.beacon_dwell_target {
                    beacon.triggered = true;
                    tracker.beacons_triggered += 1;
                    tracker.score += tuning.beacon_score;
                    info!(x = beacon.x, z = beacon.z, "beacon triggered");
                    events.push(MissionEvent::BeaconTriggered {
                        triggered: tracker.beacons_triggered,
                        total,
                    });
                }
            } else {
                beacon.hover = 0.0;
            }
        }
    }

    if kind.has_mission() && !state.mission_completed {
        let (tx, tz) = scene.target;
        let at_exit = state.horizontal_distance_to(tx, tz) < tuning.exit_radius;
        if let Some(elapsed) = tracker.elapsed_since_takeoff().filter(|_| at_exit) {
            state.mission_completed = true;
            let seconds = elapsed.as_secs();
            let bonus = (tuning.time_bonus_window_seconds - seconds as i64).max(0)
                * tuning.time_bonus_per_second;
            let score = kind.exit_score()
                + tracker.beacons_triggered as i64 * tuning.beacon_score
                + bonus;
            tracker.score = score;
            events.push(MissionEvent::Completed(MissionResult {
                beacons_triggered: tracker.beacons_triggered,
                time_elapsed_seconds: seconds,
                score,
            }));
        }
    }

    if kind.has_battery() && state.is_flying && !tracker.battery_depleted {
        let drained = tracker
            .elapsed_since_takeoff()
            .is_some_and(|elapsed| elapsed.as_secs_f32() >= tuning.battery_seconds);
        if drained {
            tracker.battery_depleted = true;
            events.push(MissionEvent::BatteryDepleted);
        }
    }

    events
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandingScore {
    pub distance: f32,
    pub on_target: bool,
}

/// Scores touchdown accuracy against the scene target after a flight.
pub fn score_landing(
    tracker: &mut MissionTracker,
    state: &DroneState,
    scene: &Scene,
    tuning: &MissionTuning,
) -> Option<LandingScore> {
    if !tracker.has_taken_off {
        return None;
    }
    let (tx, tz) = scene.target;
    let distance = state.horizontal_distance_to(tx, tz);
    let on_target = distance < tuning.landing_tolerance;
    if on_target {
        tracker.score += tuning.landing_score;
    }
    Some(LandingScore {
        distance,
        on_target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scene::SceneKind;
    use crate::domain::state::Beacon;

    const TICK: Duration = Duration::from_millis(16);

    fn tunnel() -> Scene {
        let mut scene = Scene::free();
        scene.kind = SceneKind::Tunnel;
        scene.target = (1000.0, 0.0);
        scene.beacons = vec![Beacon::new(0.0, 0.0)];
        scene
    }

    fn hovering() -> DroneState {
        let mut state = DroneState::default();
        state.y = 50.0;
        state.is_flying = true;
        state
    }

    #[test]
    fn beacon_triggers_after_dwell() {
        let mut scene = tunnel();
        let mut state = hovering();
        let mut tracker = MissionTracker::default();
        let tuning = MissionTuning::default();

        let mut triggered = Vec::new();
        for _ in 0..200 {
            triggered.extend(
                tick_mission(&mut tracker, &mut state, &mut scene, &tuning, TICK)
                    .into_iter()
                    .filter(|e| matches!(e, MissionEvent::BeaconTriggered { .. })),
            );
        }

        assert_eq!(
            triggered,
            vec![MissionEvent::BeaconTriggered {
                triggered: 1,
                total: 1
            }]
        );
        assert_eq!(tracker.score, 100);
        assert!(scene.beacons[0].triggered);
    }

    #[test]
    fn leaving_beacon_resets_dwell() {
        let mut scene = tunnel();
        let mut state = hovering();
        let mut tracker = MissionTracker::default();
        let tuning = MissionTuning::default();

        for _ in 0..100 {
            tick_mission(&mut tracker, &mut state, &mut scene, &tuning, TICK);
        }
        state.x = 200.0;
        tick_mission(&mut tracker, &mut state, &mut scene, &tuning, TICK);

        assert_eq!(scene.beacons[0].hover, 0.0);
        assert!(!scene.beacons[0].triggered);
    }

    #[test]
    fn reaching_exit_completes_with_time_bonus() {
        let mut scene = tunnel();
        scene.beacons.clear();
        let mut state = hovering();
        let mut tracker = MissionTracker::default();
        let tuning = MissionTuning::default();

        tick_mission(&mut tracker, &mut state, &mut scene, &tuning, TICK);
        tracker.clock += Duration::from_secs(10);
        state.x = 950.0;
        let events = tick_mission(&mut tracker, &mut state, &mut scene, &tuning, TICK);

        assert_eq!(
            events,
            vec![MissionEvent::Completed(MissionResult {
                beacons_triggered: 0,
                time_elapsed_seconds: 10,
                score: 200 + (300 - 10) * 2,
            })]
        );
        assert!(state.mission_completed);

        // Completion is reported once.
        assert!(tick_mission(&mut tracker, &mut state, &mut scene, &tuning, TICK).is_empty());
    }

    #[test]
    fn exit_requires_mission_clock() {
        let mut scene = tunnel();
        let mut state = DroneState::default();
        state.x = 1000.0;
        let mut tracker = MissionTracker::default();

        let events = tick_mission(
            &mut tracker,
            &mut state,
            &mut scene,
            &MissionTuning::default(),
            TICK,
        );
        assert!(events.is_empty());
        assert!(!state.mission_completed);
    }

    #[test]
    fn city_battery_runs_out_once() {
        let mut scene = Scene::free();
        scene.kind = SceneKind::City;
        let mut state = hovering();
        let mut tracker = MissionTracker::default();
        let tuning = MissionTuning::default();

        tick_mission(&mut tracker, &mut state, &mut scene, &tuning, TICK);
        tracker.clock += Duration::from_secs(121);
        let events = tick_mission(&mut tracker, &mut state, &mut scene, &tuning, TICK);
        assert_eq!(events, vec![MissionEvent::BatteryDepleted]);
        assert!(tick_mission(&mut tracker, &mut state, &mut scene, &tuning, TICK).is_empty());
    }

    #[test]
    fn landing_near_target_scores() {
        let scene = Scene::free().with_target(10.0, 0.0);
        let state = DroneState::default();
        let mut tracker = MissionTracker {
            has_taken_off: true,
            ..MissionTracker::default()
        };

        let landing = score_landing(&mut tracker, &state, &scene, &MissionTuning::default());
        assert_eq!(
            landing,
            Some(LandingScore {
                distance: 10.0,
                on_target: true
            })
        );
        assert_eq!(tracker.score, 10);
    }
}
