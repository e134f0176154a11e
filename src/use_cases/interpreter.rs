// Walks a program tree, choosing between pre-expansion and live execution.

use super::context::SimContext;
use super::executor::{begin_run, execute_live, finish_run, run_batch};
use super::motion::wait;
use super::types::{RunError, RunSummary};
use crate::domain::program::{Condition, Program, Stmt};
use crate::domain::{SensorKind, Unit};
use crate::domain::tuning::pacing;
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::info;

/// Runs `program`: bounded programs are expanded and handed to the batch
/// executor, sensor-driven ones are interpreted live.
pub async fn run_program(ctx: &SimContext, program: &Program) -> Result<RunSummary, RunError> {
    let always_live = ctx.with_world(|world| world.scene.kind.always_live());
    if !always_live && !program.requires_live() {
        // Expand against a copy so the frame task keeps ticking meanwhile.
        let world = ctx.with_world(|world| world.clone());
        let commands = program.expand(|kind, unit| world.measure(kind, unit))?;
        return run_batch(ctx, &commands).await;
    }

    let (token, run) = begin_run(ctx)?;
    let ctx = &run;
    info!(statements = program.body.len(), "live program started");
    let mut summary = RunSummary::default();
    // A live block only errors with Stopped, which ends the run like completion.
    let _ = exec_block(ctx, &program.body, &mut summary).await;
    finish_run(ctx, token, &mut summary);
    Ok(summary)
}

fn exec_block<'a>(
    ctx: &'a SimContext,
    stmts: &'a [Stmt],
    summary: &'a mut RunSummary,
) -> BoxFuture<'a, Result<(), RunError>> {
    async move {
        for stmt in stmts {
            match stmt {
                Stmt::Command(command) => {
                    let report = execute_live(ctx, command).await?;
                    summary.record(report);
                }
                Stmt::Repeat { times, body } => {
                    for _ in 0..*times {
                        exec_block(ctx, body, summary).await?;
                        loop_pause(ctx).await?;
                    }
                }
                Stmt::While { condition, body } => {
                    while holds(ctx, condition) {
                        exec_block(ctx, body, summary).await?;
                        loop_pause(ctx).await?;
                    }
                }
                Stmt::Forever { body } => loop {
                    exec_block(ctx, body, summary).await?;
                    loop_pause(ctx).await?;
                },
                Stmt::If {
                    condition,
                    then,
                    otherwise,
                } => {
                    let branch = if holds(ctx, condition) { then } else { otherwise };
                    exec_block(ctx, branch, summary).await?;
                }
            }
        }
        Ok(())
    }
    .boxed()
}

/// Sensor conditions are read against the world as it is right now.
fn holds(ctx: &SimContext, condition: &Condition) -> bool {
    ctx.with_world(|world| {
        condition.evaluate(&mut |kind: SensorKind, unit: Unit| world.measure(kind, unit))
    })
}

async fn loop_pause(ctx: &SimContext) -> Result<(), RunError> {
    if wait(ctx, pacing::LIVE_LOOP_PAUSE).await && !ctx.stop.is_raised() {
        Ok(())
    } else {
        Err(RunError::Stopped)
    }
}
