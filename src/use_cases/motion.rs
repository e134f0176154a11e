// Time-based interpolation and the interruptible waits built on it.

use super::context::SimContext;
use crate::domain::World;
use crate::domain::tuning::pacing;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionOutcome {
    Completed,
    /// A collision episode started during an abortable run.
    Aborted,
    Stopped,
}

#[derive(Debug, Clone, Copy)]
pub struct AnimateOptions {
    pub can_abort: bool,
}

impl Default for AnimateOptions {
    fn default() -> Self {
        Self { can_abort: true }
    }
}

impl AnimateOptions {
    pub fn atomic() -> Self {
        Self { can_abort: false }
    }
}

/// Converts user-facing seconds into a duration; anything non-positive is zero.
pub fn seconds(value: f32) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::try_from_secs_f32(value).unwrap_or(Duration::MAX)
    } else {
        Duration::ZERO
    }
}

/// Drives `on_progress` once per frame with the progress gained since the
/// previous frame, until progress reaches 1.
///
/// The callback gets deltas rather than absolute progress so a position the
/// collision pass corrected in between is built on, not overwritten.
pub async fn animate<F>(
    ctx: &SimContext,
    duration_secs: f32,
    options: AnimateOptions,
    mut on_progress: F,
) -> MotionOutcome
where
    F: FnMut(&mut World, f32),
{
    let mut frames = ctx.frames.clone();
    frames.mark_unchanged();

    let (total, episodes_at_start) = ctx.with_world(|world| {
        world.state.collision_detected = false;
        (world.scaled(seconds(duration_secs)), world.collision_episodes)
    });
    let started = Instant::now();
    let mut last = 0.0_f32;

    loop {
        if ctx.stop.is_raised() {
            return MotionOutcome::Stopped;
        }
        tokio::select! {
            changed = frames.changed() => {
                if changed.is_err() {
                    return MotionOutcome::Stopped;
                }
            }
            _ = ctx.stop.raised() => return MotionOutcome::Stopped,
        }

        let progress = if total.is_zero() {
            1.0
        } else {
            (started.elapsed().as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
        };

        let aborted = ctx.with_world(|world| {
            if options.can_abort && world.collision_episodes != episodes_at_start {
                return true;
            }
            let delta = progress - last;
            if delta > 0.0 {
                on_progress(world, delta);
            }
            false
        });
        if aborted {
            return MotionOutcome::Aborted;
        }

        last = progress;
        if progress >= 1.0 {
            return MotionOutcome::Completed;
        }
    }
}

/// Waits for the next frame so the collision pass has seen the latest position.
pub async fn next_frame(ctx: &SimContext) {
    let mut frames = ctx.frames.clone();
    frames.mark_unchanged();
    tokio::select! {
        _ = frames.changed() => {}
        _ = ctx.stop.raised() => {}
    }
}

/// Sleeps `duration` scaled by the execution speed. Returns false if the stop
/// signal cut it short.
pub async fn wait(ctx: &SimContext, duration: Duration) -> bool {
    if ctx.stop.is_raised() {
        return false;
    }
    let scaled = ctx.with_world(|world| world.scaled(duration));
    tokio::select! {
        _ = tokio::time::sleep(scaled) => true,
        _ = ctx.stop.raised() => false,
    }
}

/// Blocks until an external key press clears the wait flag, or until stop.
pub async fn wait_for_key(ctx: &SimContext) {
    ctx.with_world(|world| world.waiting_for_key = true);
    let mut poll = tokio::time::interval(pacing::KEY_POLL);
    loop {
        tokio::select! {
            _ = poll.tick() => {}
            _ = ctx.stop.raised() => break,
        }
        if !ctx.with_world(|world| world.waiting_for_key) {
            break;
        }
    }
    ctx.with_world(|world| world.waiting_for_key = false);
}
