// Batch and live executors driving the dispatcher.

use super::context::SimContext;
use super::dispatcher::dispatch;
use super::motion::wait;
use super::types::{DispatchReport, RunError, RunSummary};
use crate::domain::Command;
use crate::domain::tuning::pacing;
use futures::{Stream, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info};

/// Runs a fully expanded command sequence in order.
///
/// Refuses to start while another run holds the slot; the running one is left
/// untouched. A stop ends the run early and is reported in the summary.
pub async fn run_batch(ctx: &SimContext, commands: &[Command]) -> Result<RunSummary, RunError> {
    let (token, run) = begin_run(ctx)?;
    let ctx = &run;
    let total = commands.len();
    info!(total, "batch run started");
    ctx.hooks.report_progress(0, total);

    let mut summary = RunSummary::default();
    for (index, command) in commands.iter().enumerate() {
        if ctx.stop.is_raised() {
            break;
        }
        ctx.hooks.report_progress(index + 1, total);
        ctx.highlight(command.id.as_deref(), true);
        let report = dispatch(ctx, command).await;
        summary.record(report);
    }

    finish_run(ctx, token, &mut summary);
    Ok(summary)
}

/// Dispatches one command as part of a live run.
///
/// Each command occupies at least the minimum live duration, and one that
/// caused a collision is followed by a cooldown so a polling loop cannot
/// hammer the wall faster than the collision pass settles.
pub async fn execute_live(ctx: &SimContext, command: &Command) -> Result<DispatchReport, RunError> {
    if ctx.stop.is_raised() {
        return Err(RunError::Stopped);
    }
    let started = Instant::now();
    ctx.highlight(command.id.as_deref(), true);

    let report = dispatch(ctx, command).await;
    if report.collided {
        debug!(kind = command.action.name(), "collision during live command, cooling down");
        wait(ctx, pacing::LIVE_COLLISION_COOLDOWN).await;
    }
    if started.elapsed() < pacing::LIVE_MIN_COMMAND {
        wait(ctx, pacing::LIVE_MIN_COMMAND).await;
    }

    ctx.highlight(command.id.as_deref(), false);
    Ok(report)
}

/// Runs commands as a producer streams them in, until the stream ends or stop.
pub async fn run_stream<S>(ctx: &SimContext, commands: S) -> Result<RunSummary, RunError>
where
    S: Stream<Item = Command>,
{
    let (token, run) = begin_run(ctx)?;
    let ctx = &run;
    info!("live run started");
    let mut commands = std::pin::pin!(commands);
    let mut summary = RunSummary::default();

    loop {
        let next = tokio::select! {
            next = commands.next() => next,
            _ = ctx.stop.raised() => None,
        };
        let Some(command) = next else {
            break;
        };
        match execute_live(ctx, &command).await {
            Ok(report) => summary.record(report),
            Err(_) => break,
        }
    }

    finish_run(ctx, token, &mut summary);
    Ok(summary)
}

/// Claims the run slot and returns the context the run must work through.
///
/// The returned context carries a stop signal of its own, so a stop aimed at
/// this run still holds after a later run has claimed the slot.
pub(crate) fn begin_run(ctx: &SimContext) -> Result<(u64, SimContext), RunError> {
    let token = ctx
        .with_world(|world| world.try_begin_run())
        .ok_or(RunError::AlreadyRunning)?;
    Ok((token, ctx.for_new_run()))
}

pub(crate) fn finish_run(ctx: &SimContext, token: u64, summary: &mut RunSummary) {
    summary.stopped = ctx.stop.is_raised();
    // A run that lost its slot to a stop must not touch the next run's UI state.
    let highlighted = ctx.with_world(|world| {
        if world.end_run(token) {
            Some(world.highlighted.take())
        } else {
            None
        }
    });
    if let Some(highlighted) = highlighted {
        if let Some(id) = highlighted {
            ctx.hooks.highlight(&id, false);
        }
        ctx.hooks.report_progress(0, 0);
    }
    info!(
        dispatched = summary.dispatched,
        skipped = summary.skipped,
        collisions = summary.collisions,
        stopped = summary.stopped,
        "run finished"
    );
}
