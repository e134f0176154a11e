// Use cases layer: the async execution engine.

pub mod context;
pub mod dispatcher;
pub mod executor;
pub mod frame;
pub mod interpreter;
pub mod motion;
pub mod simulator;
pub mod types;

pub use context::{SimContext, StopSignal};
pub use simulator::{Simulator, SimulatorSettings};
pub use types::{DispatchReport, RunError, RunSummary, WorldUpdate};
