// Wire protocol DTOs and conversions: command descriptors, program trees and
// scenario files as the editor produces them, plus render output.

use crate::domain::command::{Action, Command, Direction, LedPattern, TextProducer, TurnDirection};
use crate::domain::program::{CompareOp, Condition, Operand, Program, Stmt};
use crate::domain::{
    CellCode, DroneSnapshot, FlightVariable, MissionResult, OccupancyGrid, Rgb, Scene, SceneKind,
    SensorKind, Unit,
};
use crate::use_cases::WorldUpdate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug)]
pub enum ProtocolError {
    Json(serde_json::Error),
    UnknownSensor(String),
    UnknownUnit(String),
    UnknownOperator(String),
    /// Grid rows are ragged or the cell size is not positive.
    InvalidGrid,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Json(err) => write!(f, "malformed json: {err}"),
            ProtocolError::UnknownSensor(name) => write!(f, "unknown sensor '{name}'"),
            ProtocolError::UnknownUnit(name) => write!(f, "unknown unit '{name}'"),
            ProtocolError::UnknownOperator(op) => write!(f, "unknown comparison '{op}'"),
            ProtocolError::InvalidGrid => write!(f, "invalid occupancy grid"),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtocolError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::Json(err)
    }
}

/// One command record as produced by the block compiler.
///
/// Numeric fields are loosely typed on the wire (numbers or numeric strings);
/// anything missing or malformed falls back to the producer's default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandDto {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, alias = "_blockId")]
    pub id: Option<String>,
    #[serde(default)]
    pub param: Option<Value>,
    #[serde(default)]
    pub power: Option<Value>,
    #[serde(default)]
    pub cm: Option<Value>,
    #[serde(default)]
    pub x: Option<Value>,
    #[serde(default)]
    pub y: Option<Value>,
    #[serde(default)]
    pub z: Option<Value>,
    #[serde(default)]
    pub var: Option<String>,
    #[serde(default)]
    pub val: Option<Value>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub brightness: Option<Value>,
    #[serde(default)]
    pub r: Option<Value>,
    #[serde(default)]
    pub g: Option<Value>,
    #[serde(default)]
    pub b: Option<Value>,
    #[serde(default)]
    pub seq: Option<String>,
    #[serde(default)]
    pub dir: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub parts: Option<Vec<TextPartDto>>,
}

/// Piece of a print command: literal text or a live sensor reading.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextPartDto {
    Text { text: String },
    Reading {
        sensor: String,
        #[serde(default)]
        unit: Option<String>,
    },
}

impl TryFrom<CommandDto> for Command {
    type Error = ProtocolError;

    fn try_from(dto: CommandDto) -> Result<Self, Self::Error> {
        let action = match dto.kind.as_str() {
            "takeoff" => Action::Takeoff,
            "land" => Action::Land,
            "wait_key" => Action::WaitKey,
            "hover" => Action::Hover {
                seconds: number(&dto.param, 1.0),
            },
            kind if kind.starts_with("move_") && kind != "move_complex" => {
                match parse_direction(&kind["move_".len()..]) {
                    Some(direction) if dto.cm.is_some() => Action::MoveDistance {
                        direction,
                        centimeters: number(&dto.cm, 50.0),
                    },
                    Some(direction) => Action::Move {
                        direction,
                        seconds: number(&dto.param, 1.0),
                        power: number(&dto.power, 50.0),
                    },
                    None => Action::Unknown {
                        kind: dto.kind.clone(),
                    },
                }
            }
            "turn_left" | "turn_right" => Action::Turn {
                direction: if dto.kind == "turn_left" {
                    TurnDirection::Left
                } else {
                    TurnDirection::Right
                },
                degrees: number(&dto.param, 90.0),
            },
            "turn_time" => Action::TurnFor {
                direction: parse_turn(dto.dir.as_deref()),
                seconds: number(&dto.param, 1.0),
                power: number(&dto.power, 50.0),
            },
            "set_heading" => Action::SetHeading {
                degrees: number(&dto.val, 0.0),
            },
            "goto_xyz" => Action::Goto {
                x: number(&dto.x, 0.0),
                y: number(&dto.y, 0.0),
                z: number(&dto.z, 0.0),
            },
            "set_var" => match dto.var.as_deref().and_then(parse_variable) {
                Some(variable) => Action::SetVariable {
                    variable,
                    percent: number(&dto.val, 0.0),
                },
                None => Action::Unknown {
                    kind: format!("set_var:{}", dto.var.as_deref().unwrap_or("")),
                },
            },
            "move_complex" => Action::MoveComplex {
                seconds: number(&dto.param, 1.0),
            },
            "set_color" => Action::SetColor {
                color: parse_color(
                    dto.param
                        .as_ref()
                        .and_then(Value::as_str)
                        .or(dto.color.as_deref()),
                ),
            },
            "led_hex_bright" => Action::LedHex {
                color: parse_color(dto.color.as_deref()),
                brightness: number(&dto.brightness, 255.0),
            },
            "led_rgb" => Action::LedRgb {
                color: channels(&dto),
                brightness: number(&dto.brightness, 255.0),
            },
            "led_off" => Action::LedOff,
            "led_seq" => Action::LedSequence {
                pattern: match dto.seq.as_deref() {
                    Some(seq) if seq.eq_ignore_ascii_case("dimming") => LedPattern::Dimming,
                    _ => LedPattern::Blinking,
                },
                color: channels(&dto),
            },
            "print" => Action::Print {
                text: text_producer(&dto)?,
            },
            "collect_water" => Action::CollectWater,
            "release_water" => Action::ReleaseWater,
            _ => Action::Unknown {
                kind: dto.kind.clone(),
            },
        };

        Ok(Command {
            id: dto.id,
            action,
        })
    }
}

/// Loosely typed number with a fallback for absent, malformed, or non-finite input.
fn number(value: &Option<Value>, default: f32) -> f32 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64().map(|v| v as f32),
        Some(Value::String(s)) => s.trim().parse::<f32>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(default)
}

fn channels(dto: &CommandDto) -> Rgb {
    Rgb::from_channels(
        number(&dto.r, 0.0),
        number(&dto.g, 0.0),
        number(&dto.b, 0.0),
    )
}

fn parse_color(text: Option<&str>) -> Rgb {
    text.and_then(Rgb::parse_hex).unwrap_or(Rgb::WHITE)
}

fn parse_direction(name: &str) -> Option<Direction> {
    match name {
        "forward" => Some(Direction::Forward),
        "backward" => Some(Direction::Backward),
        "left" => Some(Direction::Left),
        "right" => Some(Direction::Right),
        "up" => Some(Direction::Up),
        "down" => Some(Direction::Down),
        _ => None,
    }
}

fn parse_turn(dir: Option<&str>) -> TurnDirection {
    match dir {
        Some(dir) if dir.eq_ignore_ascii_case("left") => TurnDirection::Left,
        _ => TurnDirection::Right,
    }
}

fn parse_variable(name: &str) -> Option<FlightVariable> {
    match name.to_ascii_uppercase().as_str() {
        "ROLL" => Some(FlightVariable::Roll),
        "PITCH" => Some(FlightVariable::Pitch),
        "YAW" => Some(FlightVariable::Yaw),
        "THROTTLE" => Some(FlightVariable::Throttle),
        _ => None,
    }
}

fn parse_sensor(name: &str) -> Result<SensorKind, ProtocolError> {
    match name.to_ascii_lowercase().as_str() {
        "front" => Ok(SensorKind::Front),
        "left" => Ok(SensorKind::Left),
        "right" => Ok(SensorKind::Right),
        "bottom" | "height" => Ok(SensorKind::Bottom),
        _ => Err(ProtocolError::UnknownSensor(name.to_string())),
    }
}

fn parse_unit(name: Option<&str>) -> Result<Unit, ProtocolError> {
    let Some(name) = name else {
        return Ok(Unit::Cm);
    };
    match name.to_ascii_lowercase().as_str() {
        "cm" => Ok(Unit::Cm),
        "mm" => Ok(Unit::Mm),
        "in" | "inch" => Ok(Unit::In),
        "m" => Ok(Unit::M),
        _ => Err(ProtocolError::UnknownUnit(name.to_string())),
    }
}

fn text_producer(dto: &CommandDto) -> Result<TextProducer, ProtocolError> {
    let Some(parts) = &dto.parts else {
        return Ok(dto
            .text
            .as_deref()
            .map(TextProducer::literal)
            .unwrap_or_default());
    };
    parts
        .iter()
        .try_fold(TextProducer::default(), |producer, part| match part {
            TextPartDto::Text { text } => Ok(producer.push_literal(text.as_str())),
            TextPartDto::Reading { sensor, unit } => Ok(
                producer.push_reading(parse_sensor(sensor)?, parse_unit(unit.as_deref())?)
            ),
        })
}

/// Structured program tree, externally tagged by statement kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StmtDto {
    Command(CommandDto),
    Repeat {
        times: u32,
        body: Vec<StmtDto>,
    },
    While {
        condition: ConditionDto,
        body: Vec<StmtDto>,
    },
    Forever {
        body: Vec<StmtDto>,
    },
    If {
        condition: ConditionDto,
        #[serde(default)]
        then: Vec<StmtDto>,
        #[serde(default, rename = "else")]
        otherwise: Vec<StmtDto>,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionDto {
    Constant(bool),
    Compare {
        left: OperandDto,
        op: String,
        right: OperandDto,
    },
    Not(Box<ConditionDto>),
    All(Vec<ConditionDto>),
    Any(Vec<ConditionDto>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OperandDto {
    Number(f32),
    Sensor {
        sensor: String,
        #[serde(default)]
        unit: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramDto {
    #[serde(default)]
    pub body: Vec<StmtDto>,
}

impl TryFrom<StmtDto> for Stmt {
    type Error = ProtocolError;

    fn try_from(dto: StmtDto) -> Result<Self, Self::Error> {
        Ok(match dto {
            StmtDto::Command(command) => Stmt::Command(command.try_into()?),
            StmtDto::Repeat { times, body } => Stmt::Repeat {
                times,
                body: block(body)?,
            },
            StmtDto::While { condition, body } => Stmt::While {
                condition: condition.try_into()?,
                body: block(body)?,
            },
            StmtDto::Forever { body } => Stmt::Forever { body: block(body)? },
            StmtDto::If {
                condition,
                then,
                otherwise,
            } => Stmt::If {
                condition: condition.try_into()?,
                then: block(then)?,
                otherwise: block(otherwise)?,
            },
        })
    }
}

fn block(stmts: Vec<StmtDto>) -> Result<Vec<Stmt>, ProtocolError> {
    stmts.into_iter().map(Stmt::try_from).collect()
}

impl TryFrom<ConditionDto> for Condition {
    type Error = ProtocolError;

    fn try_from(dto: ConditionDto) -> Result<Self, Self::Error> {
        Ok(match dto {
            ConditionDto::Constant(value) => Condition::Constant(value),
            ConditionDto::Compare { left, op, right } => Condition::Compare {
                left: left.try_into()?,
                op: parse_op(&op)?,
                right: right.try_into()?,
            },
            ConditionDto::Not(inner) => Condition::Not(Box::new((*inner).try_into()?)),
            ConditionDto::All(items) => Condition::All(conditions(items)?),
            ConditionDto::Any(items) => Condition::Any(conditions(items)?),
        })
    }
}

fn conditions(items: Vec<ConditionDto>) -> Result<Vec<Condition>, ProtocolError> {
    items.into_iter().map(Condition::try_from).collect()
}

impl TryFrom<OperandDto> for Operand {
    type Error = ProtocolError;

    fn try_from(dto: OperandDto) -> Result<Self, Self::Error> {
        match dto {
            OperandDto::Number(value) => Ok(Operand::Number(value)),
            OperandDto::Sensor { sensor, unit } => Ok(Operand::Sensor {
                kind: parse_sensor(&sensor)?,
                unit: parse_unit(unit.as_deref())?,
            }),
        }
    }
}

fn parse_op(op: &str) -> Result<CompareOp, ProtocolError> {
    match op {
        "<" | "lt" => Ok(CompareOp::Lt),
        "<=" | "lte" => Ok(CompareOp::Le),
        ">" | "gt" => Ok(CompareOp::Gt),
        ">=" | "gte" => Ok(CompareOp::Ge),
        "==" | "eq" => Ok(CompareOp::Eq),
        "!=" | "neq" => Ok(CompareOp::Ne),
        _ => Err(ProtocolError::UnknownOperator(op.to_string())),
    }
}

impl TryFrom<ProgramDto> for Program {
    type Error = ProtocolError;

    fn try_from(dto: ProgramDto) -> Result<Self, Self::Error> {
        Ok(Program::new(block(dto.body)?))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridDto {
    pub cells: Vec<Vec<CellCode>>,
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    /// Both offsets absent centers the grid on the origin.
    #[serde(default)]
    pub offset_x: Option<f32>,
    #[serde(default)]
    pub offset_z: Option<f32>,
}

fn default_cell_size() -> f32 {
    100.0
}

impl TryFrom<GridDto> for OccupancyGrid {
    type Error = ProtocolError;

    fn try_from(dto: GridDto) -> Result<Self, Self::Error> {
        let width = dto.cells.first().map_or(0, Vec::len);
        let ragged = dto.cells.iter().any(|row| row.len() != width);
        if ragged || !(dto.cell_size.is_finite() && dto.cell_size > 0.0) {
            return Err(ProtocolError::InvalidGrid);
        }
        Ok(match (dto.offset_x, dto.offset_z) {
            (None, None) => OccupancyGrid::centered(dto.cells, dto.cell_size),
            (x, z) => OccupancyGrid::new(
                dto.cells,
                dto.cell_size,
                x.unwrap_or(0.0),
                z.unwrap_or(0.0),
            ),
        })
    }
}

/// Headless scenario file: a scene, what to run in it, and how fast.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioDto {
    #[serde(default)]
    pub scene: SceneKind,
    #[serde(default)]
    pub grid: Option<GridDto>,
    #[serde(default)]
    pub target: Option<[f32; 2]>,
    #[serde(default)]
    pub execution_speed: Option<f32>,
    #[serde(default)]
    pub program: Option<ProgramDto>,
    #[serde(default)]
    pub commands: Vec<CommandDto>,
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub scene: Scene,
    pub program: Program,
    pub execution_speed: Option<f32>,
}

impl TryFrom<ScenarioDto> for Scenario {
    type Error = ProtocolError;

    fn try_from(dto: ScenarioDto) -> Result<Self, Self::Error> {
        let mut scene = match dto.grid {
            Some(grid) => Scene::from_grid(dto.scene, grid.try_into()?),
            None => {
                let mut scene = Scene::free();
                scene.kind = dto.scene;
                scene
            }
        };
        if let Some([x, z]) = dto.target {
            scene = scene.with_target(x, z);
        }

        let mut body = match dto.program {
            Some(program) => block(program.body)?,
            None => Vec::new(),
        };
        for command in dto.commands {
            body.push(Stmt::Command(command.try_into()?));
        }

        Ok(Scenario {
            scene,
            program: Program::new(body),
            execution_speed: dto.execution_speed,
        })
    }
}

pub fn parse_commands(json: &str) -> Result<Vec<Command>, ProtocolError> {
    let dtos: Vec<CommandDto> = serde_json::from_str(json)?;
    dtos.into_iter().map(Command::try_from).collect()
}

pub fn parse_program(json: &str) -> Result<Program, ProtocolError> {
    let dto: ProgramDto = serde_json::from_str(json)?;
    dto.try_into()
}

pub fn parse_scenario(json: &str) -> Result<Scenario, ProtocolError> {
    let dto: ScenarioDto = serde_json::from_str(json)?;
    dto.try_into()
}

/// Per-tick render output.
#[derive(Debug, Clone, Serialize)]
pub struct WorldUpdateDto {
    pub tick: u64,
    pub drone: DroneSnapshot,
}

impl From<WorldUpdate> for WorldUpdateDto {
    fn from(update: WorldUpdate) -> Self {
        Self {
            tick: update.tick,
            drone: update.drone,
        }
    }
}

/// Final report of a headless run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReportDto {
    pub drone: DroneSnapshot,
    pub mission: Option<MissionResult>,
    pub dispatched: usize,
    pub collisions: usize,
    pub stopped: bool,
}
