// Owner of one simulated world: spawns its frame loop and exposes the engine.

use super::context::{SimContext, StopSignal};
use super::frame::frame_task;
use super::types::{RunError, RunSummary, WorldUpdate};
use super::{executor, interpreter};
use crate::domain::{
    Command, DroneSnapshot, EngineHooks, LedAppearance, Program, Scene, SensorKind, Unit, World,
};
use futures::Stream;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, broadcast, watch};
use tracing::info;

/// Settings for spawning a simulator.
#[derive(Debug, Clone)]
pub struct SimulatorSettings {
    /// Fixed interval of the frame loop.
    pub tick_interval: Duration,
    /// Capacity for broadcast world updates.
    pub world_broadcast_capacity: usize,
    /// Global multiplier applied to every duration.
    pub execution_speed: f32,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(1000 / 60),
            world_broadcast_capacity: 128,
            execution_speed: 1.0,
        }
    }
}

pub struct Simulator {
    ctx: SimContext,
    world_tx: broadcast::Sender<WorldUpdate>,
    shutdown: Arc<Notify>,
}

impl Simulator {
    /// Builds the world and spawns its frame task. Must run inside a tokio runtime.
    pub fn spawn(scene: Scene, hooks: Arc<dyn EngineHooks>, settings: SimulatorSettings) -> Self {
        let mut world = World::new(scene);
        world.set_execution_speed(settings.execution_speed);

        let (frame_tx, frame_rx) = watch::channel::<u64>(0);
        let (world_tx, _world_rx) =
            broadcast::channel::<WorldUpdate>(settings.world_broadcast_capacity);
        let shutdown = Arc::new(Notify::new());

        let ctx = SimContext {
            world: Arc::new(Mutex::new(world)),
            stop: StopSignal::new(),
            frames: frame_rx,
            hooks,
        };

        tokio::spawn(frame_task(
            ctx.clone(),
            frame_tx,
            world_tx.clone(),
            settings.tick_interval,
            shutdown.clone(),
        ));

        Self {
            ctx,
            world_tx,
            shutdown,
        }
    }

    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    pub async fn run_batch(&self, commands: &[Command]) -> Result<RunSummary, RunError> {
        executor::run_batch(&self.ctx, commands).await
    }

    pub async fn run_program(&self, program: &Program) -> Result<RunSummary, RunError> {
        interpreter::run_program(&self.ctx, program).await
    }

    pub async fn run_stream<S>(&self, commands: S) -> Result<RunSummary, RunError>
    where
        S: Stream<Item = Command>,
    {
        executor::run_stream(&self.ctx, commands).await
    }

    pub fn emergency_stop(&self) {
        self.ctx.emergency_stop();
    }

    /// Stops everything and puts the scene back to its start state.
    pub fn reset(&self) {
        self.ctx.emergency_stop();
        self.ctx.with_world(|world| world.reset());
        self.ctx.hooks.led_changed(&LedAppearance::off());
        info!("simulation reset");
        self.ctx.log("System Reset Complete.");
    }

    pub fn load_scene(&self, scene: Scene) {
        self.ctx.emergency_stop();
        self.ctx.with_world(|world| world.load_scene(scene));
        self.ctx.hooks.led_changed(&LedAppearance::off());
    }

    /// Releases a pending wait-for-key. Returns false if nothing was waiting.
    pub fn press_key(&self) -> bool {
        self.ctx
            .with_world(|world| std::mem::replace(&mut world.waiting_for_key, false))
    }

    pub fn set_execution_speed(&self, speed: f32) {
        self.ctx.with_world(|world| world.set_execution_speed(speed));
    }

    pub fn measure(&self, kind: SensorKind, unit: Unit) -> f32 {
        self.ctx.with_world(|world| world.measure(kind, unit))
    }

    pub fn snapshot(&self) -> DroneSnapshot {
        let stop = self.ctx.stop.is_raised();
        self.ctx.with_world(|world| world.snapshot(stop))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorldUpdate> {
        self.world_tx.subscribe()
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        // Stored permit: the frame task sees it even if it is mid-tick.
        self.shutdown.notify_one();
    }
}
