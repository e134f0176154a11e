// Headless scenario runner behind the binary.

use crate::domain::command::{Action, Command, Direction};
use crate::domain::{EngineHooks, LedAppearance, MissionResult, Program, Scene, Stmt};
use crate::frameworks::config;
use crate::interface_adapters::TracingHooks;
use crate::interface_adapters::protocol::{self, RunReportDto, Scenario, WorldUpdateDto};
use crate::use_cases::{Simulator, SimulatorSettings, WorldUpdate};
use std::io::{Error, ErrorKind, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Forwards to the tracing adapter and keeps the mission result for the report.
#[derive(Default)]
struct RunnerHooks {
    inner: TracingHooks,
    mission: Mutex<Option<MissionResult>>,
}

impl EngineHooks for RunnerHooks {
    fn log(&self, message: &str) {
        self.inner.log(message);
    }

    fn highlight(&self, command_id: &str, on: bool) {
        self.inner.highlight(command_id, on);
    }

    fn report_progress(&self, current: usize, total: usize) {
        self.inner.report_progress(current, total);
    }

    fn led_changed(&self, appearance: &LedAppearance) {
        self.inner.led_changed(appearance);
    }

    fn mission_completed(&self, result: &MissionResult) {
        self.inner.mission_completed(result);
        *self.mission.lock().unwrap_or_else(PoisonError::into_inner) = Some(*result);
    }
}

/// Runs one scenario to completion (or Ctrl-C) and returns the final report.
pub async fn run(scenario: Scenario, settings: SimulatorSettings) -> Result<RunReportDto> {
    let hooks = Arc::new(RunnerHooks::default());
    let simulator = Simulator::spawn(scenario.scene, hooks.clone(), settings);
    if let Some(speed) = scenario.execution_speed {
        simulator.set_execution_speed(speed);
    }
    let frames = tokio::spawn(trace_frames(simulator.subscribe()));

    let run = simulator.run_program(&scenario.program);
    tokio::pin!(run);
    let finished = tokio::select! {
        result = &mut run => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    let result = match finished {
        Some(result) => result,
        None => {
            tracing::warn!("interrupted, stopping");
            simulator.emergency_stop();
            run.await
        }
    };

    frames.abort();

    let summary = result.map_err(|e| {
        tracing::error!(error = %e, "run failed");
        Error::other(e)
    })?;

    let mission = *hooks.mission.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(RunReportDto {
        drone: simulator.snapshot(),
        mission,
        dispatched: summary.dispatched,
        collisions: summary.collisions,
        stopped: summary.stopped,
    })
}

/// Emits each world update as a JSON line under the `frames` target.
async fn trace_frames(mut world_rx: broadcast::Receiver<WorldUpdate>) {
    loop {
        match world_rx.recv().await {
            Ok(update) => {
                if !tracing::enabled!(target: "frames", tracing::Level::TRACE) {
                    continue;
                }
                match serde_json::to_string(&WorldUpdateDto::from(update)) {
                    Ok(json) => tracing::trace!(target: "frames", "{json}"),
                    Err(e) => tracing::error!(error = ?e, "failed to serialize world update"),
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(missed = n, "frame tracer lagged; skipping to latest update");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let scenario = match config::scenario_path() {
        Some(path) => load_scenario(&path).await?,
        None => {
            tracing::info!("no scenario given, flying the demo hop");
            demo_scenario()
        }
    };
    let settings = SimulatorSettings {
        tick_interval: config::TICK_INTERVAL,
        world_broadcast_capacity: config::WORLD_BROADCAST_CAPACITY,
        execution_speed: config::execution_speed(),
    };

    let report = run(scenario, settings).await?;
    let json = serde_json::to_string_pretty(&report).map_err(Error::other)?;
    println!("{json}");
    Ok(())
}

async fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = tokio::fs::read_to_string(path).await.inspect_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to read scenario");
    })?;
    let scenario = protocol::parse_scenario(&text).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "invalid scenario");
        Error::new(ErrorKind::InvalidData, e)
    })?;
    tracing::info!(path = %path.display(), kind = ?scenario.scene.kind, "scenario loaded");
    Ok(scenario)
}

/// Takeoff, two seconds forward, land, on an open floor.
fn demo_scenario() -> Scenario {
    let body = [
        Action::Takeoff,
        Action::Move {
            direction: Direction::Forward,
            seconds: 2.0,
            power: 50.0,
        },
        Action::Land,
    ]
    .into_iter()
    .map(|action| Stmt::Command(Command::new(action)))
    .collect();

    Scenario {
        scene: Scene::free(),
        program: Program::new(body),
        execution_speed: None,
    }
}
