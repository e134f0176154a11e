// Domain-level drone state, appearance, and mission records.

use serde::Serialize;

/// Kinematic state of the simulated drone.
///
/// Positions are centimeters in world space; `y` is altitude. Heading is in
/// degrees and is left unbounded (renderers display it mod 360).
#[derive(Debug, Clone, PartialEq)]
pub struct DroneState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub heading: f32,

    pub is_flying: bool,
    pub is_running: bool,
    // Latched when a collision episode starts, cleared on the next free tick.
    pub collision_detected: bool,
    pub has_water: bool,
    pub mission_completed: bool,
}

impl DroneState {
    pub fn at(pose: Pose) -> Self {
        Self {
            x: pose.x,
            y: pose.y,
            z: pose.z,
            heading: pose.heading,
            is_flying: false,
            is_running: false,
            collision_detected: false,
            has_water: false,
            mission_completed: false,
        }
    }

    pub fn place(&mut self, pose: Pose) {
        self.x = pose.x;
        self.y = pose.y;
        self.z = pose.z;
        self.heading = pose.heading;
    }

    pub fn horizontal_distance_to(&self, x: f32, z: f32) -> f32 {
        let dx = self.x - x;
        let dz = self.z - z;
        (dx * dx + dz * dz).sqrt()
    }
}

impl Default for DroneState {
    fn default() -> Self {
        Self::at(Pose::default())
    }
}

/// Start pose of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub heading: f32,
}

impl Pose {
    pub fn new(x: f32, y: f32, z: f32, heading: f32) -> Self {
        Self { x, y, z, heading }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 180.0)
    }
}

/// Stick positions as percentages in [-100, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightState {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub throttle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightVariable {
    Roll,
    Pitch,
    Yaw,
    Throttle,
}

impl FlightState {
    pub fn set(&mut self, variable: FlightVariable, percent: f32) {
        let value = percent.clamp(-100.0, 100.0);
        match variable {
            FlightVariable::Roll => self.roll = value,
            FlightVariable::Pitch => self.pitch = value,
            FlightVariable::Yaw => self.yaw = value,
            FlightVariable::Throttle => self.throttle = value,
        }
    }
}

/// Last horizontal position the collision probe found free.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SafePosition {
    pub x: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from float channels, rounding and clamping to 0..=255.
    pub fn from_channels(r: f32, g: f32, b: f32) -> Self {
        let channel = |v: f32| {
            if v.is_finite() {
                v.round().clamp(0.0, 255.0) as u8
            } else {
                0
            }
        };
        Self::new(channel(r), channel(g), channel(b))
    }

    /// Parses `#rrggbb` / `rrggbb` / `#rgb`.
    pub fn parse_hex(text: &str) -> Option<Self> {
        let hex = text.trim().trim_start_matches('#');
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return None,
        };
        let value = u32::from_str_radix(&expanded, 16).ok()?;
        Some(Self::new(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        ))
    }
}

/// Externally rendered LED look: material color/opacity and point-light intensity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LedAppearance {
    pub color: Rgb,
    pub opacity: f32,
    pub intensity: f32,
}

impl LedAppearance {
    pub const MAX_INTENSITY: f32 = 2.0;

    pub fn off() -> Self {
        Self {
            color: Rgb::WHITE,
            opacity: 0.1,
            intensity: 0.0,
        }
    }

    pub fn full(color: Rgb) -> Self {
        Self {
            color,
            opacity: 1.0,
            intensity: Self::MAX_INTENSITY,
        }
    }

    /// Maps a 0..=255 brightness onto opacity (floored at 0.1) and intensity.
    pub fn with_brightness(color: Rgb, brightness: f32) -> Self {
        let level = (brightness / 255.0).clamp(0.0, 1.0);
        Self {
            color,
            opacity: level.max(0.1),
            intensity: level * Self::MAX_INTENSITY,
        }
    }
}

impl Default for LedAppearance {
    fn default() -> Self {
        Self::off()
    }
}

/// Scenario checkpoint that triggers after enough dwell time nearby.
#[derive(Debug, Clone, PartialEq)]
pub struct Beacon {
    pub x: f32,
    pub z: f32,
    pub triggered: bool,
    pub hover: f32,
}

impl Beacon {
    pub fn new(x: f32, z: f32) -> Self {
        Self {
            x,
            z,
            triggered: false,
            hover: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.triggered = false;
        self.hover = 0.0;
    }
}

/// Emitted once per completed mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MissionResult {
    pub beacons_triggered: u32,
    pub time_elapsed_seconds: u64,
    pub score: i64,
}

/// Read-only view handed to renderers once per tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroneSnapshot {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub heading: f32,
    pub is_flying: bool,
    pub is_running: bool,
    pub stop_signal: bool,
    pub collision_detected: bool,
    pub has_water: bool,
    pub mission_completed: bool,
    pub score: i64,
    pub led: LedAppearance,
}
