// Domain layer: core simulation types and rules.

pub mod command;
pub mod grid;
pub mod ports;
pub mod program;
pub mod scene;
pub mod state;
pub mod systems;
pub mod tuning;
pub mod world;

pub use command::{Action, Command, Direction, LedPattern, TextPart, TextProducer, TurnDirection};
pub use grid::{CellCode, OccupancyGrid};
pub use ports::EngineHooks;
pub use program::{CompareOp, Condition, Operand, Program, Stmt};
pub use scene::{Scene, SceneKind};
pub use state::{
    Beacon, DroneSnapshot, DroneState, FlightState, FlightVariable, LedAppearance, MissionResult,
    Pose, Rgb, SafePosition,
};
pub use systems::sensors::{SensorKind, Unit};
pub use world::{FrameEvent, World};
