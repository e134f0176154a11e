// Scene description: kind-specific limits plus the grid-derived layout.

use crate::domain::grid::{self, OccupancyGrid};
use crate::domain::state::{Beacon, Pose};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    #[default]
    Free,
    Tunnel,
    ChallengeMaze,
    City,
}

impl SceneKind {
    /// Obstacles stop mattering above this altitude.
    pub fn collision_ceiling(self) -> f32 {
        match self {
            SceneKind::City => 420.0,
            _ => 125.0,
        }
    }

    /// Height of wall geometry as seen by the range sensors.
    pub fn wall_height(self) -> f32 {
        match self {
            SceneKind::City => 400.0,
            _ => 120.0,
        }
    }

    /// Scenes with timed exit scoring.
    pub fn has_mission(self) -> bool {
        matches!(self, SceneKind::Tunnel | SceneKind::ChallengeMaze)
    }

    pub fn exit_score(self) -> i64 {
        match self {
            SceneKind::ChallengeMaze => 500,
            _ => 200,
        }
    }

    pub fn has_battery(self) -> bool {
        self == SceneKind::City
    }

    /// Programs in this scene always stream through the live executor.
    pub fn always_live(self) -> bool {
        self == SceneKind::ChallengeMaze
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub kind: SceneKind,
    pub grid: Option<OccupancyGrid>,
    pub start: Pose,
    pub target: (f32, f32),
    pub beacons: Vec<Beacon>,
}

impl Scene {
    /// Open floor, no obstacles.
    pub fn free() -> Self {
        Self {
            kind: SceneKind::Free,
            grid: None,
            start: Pose::default(),
            target: (0.0, 0.0),
            beacons: Vec::new(),
        }
    }

    /// Derives start pose, exit target and beacons from the grid's cell codes.
    pub fn from_grid(kind: SceneKind, grid: OccupancyGrid) -> Self {
        let mut start = Pose::default();
        let mut target = (0.0, 0.0);
        let mut beacons = Vec::new();

        for (row, col, code) in grid.cells() {
            let (x, z) = grid.cell_center(row, col);
            match code {
                grid::START => start = Pose::new(x, 0.0, z, 180.0),
                grid::EXIT => target = (x, z),
                grid::BEACON if kind == SceneKind::Tunnel => beacons.push(Beacon::new(x, z)),
                _ => {}
            }
        }

        Self {
            kind,
            grid: Some(grid),
            start,
            target,
            beacons,
        }
    }

    pub fn with_target(mut self, x: f32, z: f32) -> Self {
        self.target = (x, z);
        self
    }

    pub fn with_start(mut self, start: Pose) -> Self {
        self.start = start;
        self
    }

    /// Floor height under a point.
    pub fn ground_height(&self, _x: f32, _z: f32) -> f32 {
        0.0
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::free()
    }
}
