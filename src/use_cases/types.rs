// Use-case level inputs/outputs for the execution engine.

use crate::domain::DroneSnapshot;
use crate::domain::program::ProgramError;
use std::fmt;

/// Render output published after every frame.
#[derive(Debug, Clone)]
pub struct WorldUpdate {
    pub tick: u64,
    pub drone: DroneSnapshot,
}

/// Result of dispatching a single command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// A new collision episode started while the command ran.
    pub collided: bool,
    /// The flight gate turned the command into a no-op.
    pub skipped: bool,
}

/// How an executor run ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub dispatched: usize,
    pub skipped: usize,
    pub collisions: usize,
    pub stopped: bool,
}

impl RunSummary {
    pub fn record(&mut self, report: DispatchReport) {
        self.dispatched += 1;
        if report.skipped {
            self.skipped += 1;
        }
        if report.collided {
            self.collisions += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// Another executor holds the run slot.
    AlreadyRunning,
    /// The stop signal is raised.
    Stopped,
    Program(ProgramError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::AlreadyRunning => write!(f, "an executor is already running"),
            RunError::Stopped => write!(f, "execution stopped"),
            RunError::Program(err) => write!(f, "invalid program: {err}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Program(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProgramError> for RunError {
    fn from(err: ProgramError) -> Self {
        RunError::Program(err)
    }
}
