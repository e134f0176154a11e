// Command model: one tagged descriptor per unit of drone behavior.

use crate::domain::state::{FlightVariable, Rgb};
use crate::domain::systems::sensors::{SensorKind, Unit};

/// A command produced by the program compiler.
///
/// `id` is an opaque instrumentation handle (the editor block that produced
/// it); the engine only echoes it back through the highlight hook.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub id: Option<String>,
    pub action: Action,
}

impl Command {
    pub fn new(action: Action) -> Self {
        Self { id: None, action }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl From<Action> for Command {
    fn from(action: Action) -> Self {
        Self::new(action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDirection {
    Left,
    Right,
}

impl TurnDirection {
    /// Left turns increase heading.
    pub fn sign(self) -> f32 {
        match self {
            TurnDirection::Left => 1.0,
            TurnDirection::Right => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedPattern {
    Dimming,
    Blinking,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextPart {
    Literal(String),
    Reading { sensor: SensorKind, unit: Unit },
}

/// Text evaluated at dispatch time, so sensor readings reflect the drone's
/// position when the print runs rather than when it was compiled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextProducer {
    pub parts: Vec<TextPart>,
}

impl TextProducer {
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            parts: vec![TextPart::Literal(text.into())],
        }
    }

    pub fn push_literal(mut self, text: impl Into<String>) -> Self {
        self.parts.push(TextPart::Literal(text.into()));
        self
    }

    pub fn push_reading(mut self, sensor: SensorKind, unit: Unit) -> Self {
        self.parts.push(TextPart::Reading { sensor, unit });
        self
    }

    pub fn render(&self, mut read: impl FnMut(SensorKind, Unit) -> f32) -> String {
        if self.parts.is_empty() {
            return "Output".to_string();
        }
        let mut out = String::new();
        for part in &self.parts {
            match part {
                TextPart::Literal(text) => out.push_str(text),
                TextPart::Reading { sensor, unit } => {
                    out.push_str(&format!("{}", read(*sensor, *unit)));
                }
            }
        }
        out
    }
}

/// Closed set of command kinds; numeric fields are already concrete.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Takeoff,
    Land,
    Hover { seconds: f32 },
    WaitKey,
    Move { direction: Direction, seconds: f32, power: f32 },
    MoveDistance { direction: Direction, centimeters: f32 },
    Turn { direction: TurnDirection, degrees: f32 },
    TurnFor { direction: TurnDirection, seconds: f32, power: f32 },
    SetHeading { degrees: f32 },
    Goto { x: f32, y: f32, z: f32 },
    SetVariable { variable: FlightVariable, percent: f32 },
    MoveComplex { seconds: f32 },
    SetColor { color: Rgb },
    LedHex { color: Rgb, brightness: f32 },
    LedRgb { color: Rgb, brightness: f32 },
    LedOff,
    LedSequence { pattern: LedPattern, color: Rgb },
    Print { text: TextProducer },
    CollectWater,
    ReleaseWater,
    Unknown { kind: String },
}

impl Action {
    /// Kinds that run even while the drone is grounded.
    pub fn runs_on_ground(&self) -> bool {
        matches!(
            self,
            Action::Takeoff
                | Action::WaitKey
                | Action::SetColor { .. }
                | Action::LedHex { .. }
                | Action::LedRgb { .. }
                | Action::LedOff
                | Action::LedSequence { .. }
        )
    }

    pub fn name(&self) -> &str {
        match self {
            Action::Takeoff => "takeoff",
            Action::Land => "land",
            Action::Hover { .. } => "hover",
            Action::WaitKey => "wait_key",
            Action::Move { .. } | Action::MoveDistance { .. } => "move",
            Action::Turn { .. } => "turn",
            Action::TurnFor { .. } => "turn_time",
            Action::SetHeading { .. } => "set_heading",
            Action::Goto { .. } => "goto_xyz",
            Action::SetVariable { .. } => "set_var",
            Action::MoveComplex { .. } => "move_complex",
            Action::SetColor { .. } => "set_color",
            Action::LedHex { .. } => "led_hex_bright",
            Action::LedRgb { .. } => "led_rgb",
            Action::LedOff => "led_off",
            Action::LedSequence { .. } => "led_seq",
            Action::Print { .. } => "print",
            Action::CollectWater => "collect_water",
            Action::ReleaseWater => "release_water",
            Action::Unknown { kind } => kind,
        }
    }
}
