use super::context::SimContext;
use super::types::WorldUpdate;
use crate::domain::FrameEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, broadcast, watch};
use tracing::{debug, info};

/// Render loop: collision and mission systems advance once per tick whether or
/// not an executor is active.
pub async fn frame_task(
    ctx: SimContext,
    frame_tx: watch::Sender<u64>,
    world_tx: broadcast::Sender<WorldUpdate>,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) {
    let mut tick: u64 = 0;
    let mut interval = tokio::time::interval(tick_interval);

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                debug!(tick, "frame task shutting down");
                break;
            }
            _ = interval.tick() => {}
        }

        let stop_raised = ctx.stop.is_raised();
        let (events, drone) = ctx.with_world(|world| {
            let events = world.step_frame(tick_interval);
            (events, world.snapshot(stop_raised))
        });

        for event in events {
            apply_event(&ctx, event);
        }

        tick += 1;
        frame_tx.send_replace(tick);
        // No subscribers is fine; renderers come and go.
        let _ = world_tx.send(WorldUpdate { tick, drone });
    }
}

fn apply_event(ctx: &SimContext, event: FrameEvent) {
    match event {
        FrameEvent::Log(message) => ctx.log(&message),
        FrameEvent::CollisionEntered => {}
        FrameEvent::MissionCompleted(result) => {
            // The run unwinds on the stop and frees its own slot.
            ctx.stop.raise();
            ctx.hooks.mission_completed(&result);
        }
        FrameEvent::BatteryDepleted => {
            info!("battery depleted, stopping");
            ctx.emergency_stop();
        }
    }
}
