use crate::domain::grid::OccupancyGrid;
use crate::domain::state::DroneState;
use crate::domain::systems::movement::heading_vector;
use crate::domain::tuning::SensorTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Front,
    Left,
    Right,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    Cm,
    Mm,
    In,
    M,
}

impl Unit {
    pub fn from_cm(self, centimeters: f32) -> f32 {
        match self {
            Unit::Cm => centimeters,
            Unit::Mm => centimeters * 10.0,
            Unit::In => centimeters / 2.54,
            Unit::M => centimeters / 100.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Unit::Cm => "cm",
            Unit::Mm => "mm",
            Unit::In => "in",
            Unit::M => "m",
        }
    }
}

/// World geometry a sensor reading needs.
#[derive(Debug, Clone, Copy)]
pub struct SensorWorld<'a> {
    pub grid: Option<&'a OccupancyGrid>,
    pub wall_height: f32,
}

/// Range reading in `unit`, rounded to two decimals. Never negative.
pub fn measure(
    state: &DroneState,
    world: SensorWorld<'_>,
    kind: SensorKind,
    unit: Unit,
    tuning: &SensorTuning,
) -> f32 {
    let centimeters = match kind {
        SensorKind::Bottom => state.y.max(0.0),
        SensorKind::Front => horizontal_range(state, world, state.heading, tuning),
        SensorKind::Left => horizontal_range(state, world, state.heading + 90.0, tuning),
        SensorKind::Right => horizontal_range(state, world, state.heading - 90.0, tuning),
    };
    round2(unit.from_cm(centimeters))
}

fn horizontal_range(
    state: &DroneState,
    world: SensorWorld<'_>,
    bearing: f32,
    tuning: &SensorTuning,
) -> f32 {
    let Some(grid) = world.grid else {
        return tuning.no_hit_distance;
    };

    let ray_height = if state.y < tuning.ground_altitude {
        tuning.ground_ray_height
    } else {
        state.y
    };
    // The ray passes over the walls.
    if ray_height >= world.wall_height {
        return tuning.no_hit_distance;
    }

    let (dx, dz) = heading_vector(bearing);
    let origin = (
        state.x - dx * tuning.back_margin,
        state.z - dz * tuning.back_margin,
    );

    match first_wall_distance(grid, origin, (dx, dz), tuning.max_range) {
        Some(distance) => (distance - tuning.back_margin).max(0.0),
        None => tuning.no_hit_distance,
    }
}

/// Distance along a unit ray to the first wall cell face, walking the grid
/// cell by cell. The origin cell is ignored, so a ray starting inside a wall
/// can still leave it; cells outside the grid are open space.
pub fn first_wall_distance(
    grid: &OccupancyGrid,
    origin: (f32, f32),
    dir: (f32, f32),
    max_range: f32,
) -> Option<f32> {
    let size = grid.cell_size();
    let (offset_x, offset_z) = grid.offset();
    let (ox, oz) = origin;
    let (dx, dz) = dir;

    let mut col = grid.col_of(ox);
    let mut row = grid.row_of(oz);

    let step_col: i64 = if dx > 0.0 { 1 } else { -1 };
    let step_row: i64 = if dz > 0.0 { 1 } else { -1 };

    let axis = |o: f32, d: f32, cell: i64, offset: f32| -> (f32, f32) {
        if d.abs() < f32::EPSILON {
            return (f32::INFINITY, f32::INFINITY);
        }
        let boundary = if d > 0.0 {
            offset + (cell + 1) as f32 * size
        } else {
            offset + cell as f32 * size
        };
        ((boundary - o) / d, size / d.abs())
    };

    let (mut next_x, delta_x) = axis(ox, dx, col, offset_x);
    let (mut next_z, delta_z) = axis(oz, dz, row, offset_z);

    loop {
        let t = if next_x < next_z {
            col += step_col;
            let t = next_x;
            next_x += delta_x;
            t
        } else {
            row += step_row;
            let t = next_z;
            next_z += delta_z;
            t
        };

        if !t.is_finite() || t > max_range {
            return None;
        }
        if grid.is_wall(row, col) {
            return Some(t);
        }
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
