use crate::domain::grid::OccupancyGrid;
use crate::domain::state::{DroneState, SafePosition};
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct CollisionConfig {
    pub radius: f32,
    pub ceiling: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionOutcome {
    pub hit_x: bool,
    pub hit_z: bool,
    // True only on the tick a new collision episode starts.
    pub entered: bool,
}

impl CollisionOutcome {
    pub fn collided(&self) -> bool {
        self.hit_x || self.hit_z
    }
}

/// Grid probe run once per tick.
///
/// X and Z are tested independently (X against the current row, Z against the
/// current column) so a drone pushed diagonally into a wall slides along its
/// face instead of stopping dead. A colliding axis is reset to the cached safe
/// value; a free tick refreshes the cache and clears the collision latch.
pub fn resolve_collisions(
    state: &mut DroneState,
    safe: &mut SafePosition,
    grid: &OccupancyGrid,
    cfg: CollisionConfig,
) -> CollisionOutcome {
    if state.y > cfg.ceiling {
        safe.x = state.x;
        safe.z = state.z;
        state.collision_detected = false;
        return CollisionOutcome::default();
    }

    let r = cfg.radius;
    let probes = [
        (state.x, state.z),
        (state.x + r, state.z),
        (state.x - r, state.z),
        (state.x, state.z + r),
        (state.x, state.z - r),
    ];

    let row = grid.row_of(state.z);
    let col = grid.col_of(state.x);
    let hit_x = probes
        .iter()
        .any(|(px, _)| grid.is_wall(row, grid.col_of(*px)));
    let hit_z = probes
        .iter()
        .any(|(_, pz)| grid.is_wall(grid.row_of(*pz), col));

    if !(hit_x || hit_z) {
        safe.x = state.x;
        safe.z = state.z;
        state.collision_detected = false;
        return CollisionOutcome::default();
    }

    if hit_x {
        state.x = safe.x;
    }
    if hit_z {
        state.z = safe.z;
    }

    let entered = !state.collision_detected;
    if entered {
        state.collision_detected = true;
        warn!(x = state.x, z = state.z, hit_x, hit_z, "collision detected");
    }

    CollisionOutcome {
        hit_x,
        hit_z,
        entered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::{FREE, WALL};

    // Wall row at z in [-250, -150); open floor below it.
    fn corridor() -> OccupancyGrid {
        OccupancyGrid::new(
            vec![
                vec![WALL, WALL, WALL],
                vec![FREE, FREE, FREE],
                vec![FREE, FREE, FREE],
            ],
            100.0,
            -150.0,
            -250.0,
        )
    }

    fn cfg() -> CollisionConfig {
        CollisionConfig {
            radius: 15.0,
            ceiling: 125.0,
        }
    }

    fn drone_at(x: f32, z: f32) -> DroneState {
        let mut state = DroneState::default();
        state.x = x;
        state.z = z;
        state.y = 80.0;
        state
    }

    #[test]
    fn free_tick_refreshes_safe_cache() {
        let mut state = drone_at(10.0, -50.0);
        let mut safe = SafePosition::default();
        let outcome = resolve_collisions(&mut state, &mut safe, &corridor(), cfg());

        assert!(!outcome.collided());
        assert_eq!(safe, SafePosition { x: 10.0, z: -50.0 });
    }

    #[test]
    fn wall_contact_slides_along_face() {
        let grid = corridor();
        let mut safe = SafePosition { x: 0.0, z: -130.0 };
        // Pushed diagonally so the front probe crosses into the wall row.
        let mut state = drone_at(12.0, -140.0);

        let outcome = resolve_collisions(&mut state, &mut safe, &grid, cfg());

        assert!(outcome.hit_z);
        assert!(!outcome.hit_x);
        assert_eq!(state.z, -130.0);
        assert_eq!(state.x, 12.0);
    }

    #[test]
    fn episode_is_reported_once() {
        let grid = corridor();
        let mut safe = SafePosition { x: 0.0, z: -130.0 };
        let mut state = drone_at(0.0, -140.0);

        let first = resolve_collisions(&mut state, &mut safe, &grid, cfg());
        state.z = -140.0;
        let second = resolve_collisions(&mut state, &mut safe, &grid, cfg());

        assert!(first.entered);
        assert!(second.collided());
        assert!(!second.entered);
        assert!(state.collision_detected);

        let clear = resolve_collisions(&mut state, &mut safe, &grid, cfg());
        assert!(!clear.collided());
        assert!(!state.collision_detected);
    }

    #[test]
    fn above_ceiling_skips_probe_but_tracks_position() {
        let grid = corridor();
        let mut safe = SafePosition::default();
        let mut state = drone_at(0.0, -200.0);
        state.y = 300.0;

        let outcome = resolve_collisions(&mut state, &mut safe, &grid, cfg());

        assert!(!outcome.collided());
        assert_eq!(safe, SafePosition { x: 0.0, z: -200.0 });
    }

    #[test]
    fn outside_grid_is_open_space() {
        let grid = corridor();
        let mut safe = SafePosition::default();
        let mut state = drone_at(900.0, 900.0);

        assert!(!resolve_collisions(&mut state, &mut safe, &grid, cfg()).collided());
    }
}
