// Shared handles every engine task works through.

use crate::domain::{EngineHooks, World};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::info;

pub type SharedWorld = Arc<Mutex<World>>;

#[derive(Debug, Clone, Copy, Default)]
struct StopState {
    generation: u64,
    raised: bool,
}

/// Cooperative cancellation flag, observable both by polling and by awaiting.
///
/// Every run gets its own generation from [`StopSignal::next_generation`]. A
/// signal bound to a generation reads as raised once that generation is
/// raised or superseded, so starting a new run can never un-stop an old one.
/// An unbound signal tracks whichever generation is current.
#[derive(Debug, Clone)]
pub struct StopSignal {
    tx: Arc<watch::Sender<StopState>>,
    bound: Option<u64>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StopState::default());
        Self {
            tx: Arc::new(tx),
            bound: None,
        }
    }

    /// Raises the current generation. Returns true if it was not already raised.
    pub fn raise(&self) -> bool {
        self.tx.send_if_modified(|state| {
            let changed = !state.raised;
            state.raised = true;
            changed
        })
    }

    /// Starts a fresh, unraised generation and returns a signal bound to it.
    pub fn next_generation(&self) -> StopSignal {
        let mut generation = 0;
        self.tx.send_modify(|state| {
            state.generation += 1;
            state.raised = false;
            generation = state.generation;
        });
        StopSignal {
            tx: self.tx.clone(),
            bound: Some(generation),
        }
    }

    pub fn is_raised(&self) -> bool {
        self.holds(&self.tx.borrow())
    }

    /// Resolves once the signal is raised.
    pub async fn raised(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|state| self.holds(state)).await;
    }

    fn holds(&self, state: &StopState) -> bool {
        match self.bound {
            Some(generation) => state.raised || state.generation != generation,
            None => state.raised,
        }
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct SimContext {
    pub world: SharedWorld,
    pub stop: StopSignal,
    /// Frame counter published by the frame task after each tick.
    pub frames: watch::Receiver<u64>,
    pub hooks: Arc<dyn EngineHooks>,
}

impl SimContext {
    /// Copy of this context whose stop signal is bound to a fresh generation.
    pub fn for_new_run(&self) -> SimContext {
        SimContext {
            stop: self.stop.next_generation(),
            ..self.clone()
        }
    }

    /// Runs `f` with the world locked. Never hold the guard across an await.
    pub fn with_world<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        let mut guard = self.world.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn log(&self, message: &str) {
        self.hooks.log(message);
    }

    /// Marks a command's editor block, tracking it so a stop can clear it.
    pub fn highlight(&self, command_id: Option<&str>, on: bool) {
        let Some(id) = command_id else {
            return;
        };
        let previous = self.with_world(|world| {
            if on {
                world.highlighted.replace(id.to_string())
            } else {
                if world.highlighted.as_deref() == Some(id) {
                    world.highlighted = None;
                }
                None
            }
        });
        if let Some(previous) = previous.filter(|prev| prev != id) {
            self.hooks.highlight(&previous, false);
        }
        self.hooks.highlight(id, on);
    }

    /// Halts any executor and grounds the drone. Safe to call repeatedly.
    pub fn emergency_stop(&self) {
        let first = self.stop.raise();
        let highlighted = self.with_world(|world| world.emergency_stop());
        if let Some(id) = highlighted {
            self.hooks.highlight(&id, false);
        }
        self.hooks.report_progress(0, 0);
        if first {
            info!("emergency stop");
            self.hooks.log("Emergency stop.");
        }
    }
}
