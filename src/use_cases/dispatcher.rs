// Maps one command onto interpolator runs, state writes, and hook calls.

use super::context::SimContext;
use super::motion::{self, AnimateOptions, MotionOutcome, animate, next_frame, wait};
use super::types::DispatchReport;
use crate::domain::command::{Action, Command, Direction, LedPattern, TextProducer};
use crate::domain::grid;
use crate::domain::state::{LedAppearance, Rgb};
use crate::domain::systems::movement::{complex_motion, direction_vector, step_position};
use crate::domain::tuning::pacing;
use std::f32::consts::PI;
use tracing::{debug, warn};

/// Runs a single command to completion, then the fixed settle delay.
///
/// Commands that need the drone airborne are turned into a short no-op while
/// it is grounded. After any abortable move that hit something, the
/// horizontal position is snapped to the safe cache before returning.
pub async fn dispatch(ctx: &SimContext, command: &Command) -> DispatchReport {
    let action = &command.action;
    let (flying, episodes_before) =
        ctx.with_world(|world| (world.state.is_flying, world.collision_episodes));

    if !flying && !action.runs_on_ground() {
        debug!(kind = action.name(), "drone grounded, skipping");
        wait(ctx, pacing::GROUNDED_SKIP).await;
        return DispatchReport {
            collided: false,
            skipped: true,
        };
    }

    debug!(kind = action.name(), id = ?command.id, "dispatch");
    let abortable = run_action(ctx, action).await;

    if abortable {
        next_frame(ctx).await;
    }
    // The snap target is the safe cache as it stands now, i.e. the last free
    // spot reached during this move, not the position the move started from.
    let collided = ctx.with_world(|world| {
        let collided = world.collision_episodes != episodes_before;
        if collided && abortable {
            world.state.x = world.safe.x;
            world.state.z = world.safe.z;
        }
        collided
    });

    wait(ctx, pacing::SETTLE).await;
    DispatchReport {
        collided,
        skipped: false,
    }
}

/// Returns true for kinds driven by an abortable interpolation.
async fn run_action(ctx: &SimContext, action: &Action) -> bool {
    match action {
        Action::Takeoff => {
            takeoff(ctx).await;
            false
        }
        Action::Land => {
            land(ctx).await;
            false
        }
        Action::Hover { seconds } => {
            wait(ctx, motion::seconds(*seconds)).await;
            false
        }
        Action::WaitKey => {
            motion::wait_for_key(ctx).await;
            false
        }
        Action::Move {
            direction,
            seconds,
            power: _,
        } => {
            let seconds = positive_or(*seconds, 1.0);
            let speed = ctx.with_world(|world| world.drone_tuning.cruise_speed);
            translate(ctx, *direction, speed * seconds, seconds).await;
            true
        }
        Action::MoveDistance {
            direction,
            centimeters,
        } => {
            let distance = positive_or(*centimeters, 50.0);
            let speed = ctx.with_world(|world| world.drone_tuning.cruise_speed);
            translate(ctx, *direction, distance, distance / speed).await;
            true
        }
        Action::Turn { direction, degrees } => {
            let total = nonzero_or(*degrees, 90.0) * direction.sign();
            let secs = ctx.with_world(|world| world.drone_tuning.turn_seconds);
            rotate(ctx, total, secs).await;
            false
        }
        Action::TurnFor {
            direction,
            seconds,
            power,
        } => {
            let secs = positive_or(*seconds, 1.0);
            let rate = ctx.with_world(|world| world.drone_tuning.full_power_turn_rate);
            let total = finite_or(*power, 50.0) / 100.0 * rate * secs * direction.sign();
            rotate(ctx, total, secs).await;
            false
        }
        Action::SetHeading { degrees } => {
            let (start, secs) =
                ctx.with_world(|world| (world.state.heading, world.drone_tuning.turn_seconds));
            rotate(ctx, finite_or(*degrees, 0.0) - start, secs).await;
            false
        }
        Action::Goto { x, y, z } => {
            let (delta, secs) = ctx.with_world(|world| {
                let s = &world.state;
                (
                    (
                        finite_or(*x, 0.0) - s.x,
                        finite_or(*y, 0.0) - s.y,
                        finite_or(*z, 0.0) - s.z,
                    ),
                    world.drone_tuning.goto_seconds,
                )
            });
            animate(ctx, secs, AnimateOptions::default(), |world, d| {
                world.state.x += delta.0 * d;
                world.state.y += delta.1 * d;
                world.state.z += delta.2 * d;
            })
            .await;
            true
        }
        Action::SetVariable { variable, percent } => {
            ctx.with_world(|world| world.flight.set(*variable, finite_or(*percent, 0.0)));
            false
        }
        Action::MoveComplex { seconds } => {
            let secs = positive_or(*seconds, 1.0);
            let plan = ctx.with_world(|world| {
                complex_motion(
                    &world.flight,
                    world.state.heading,
                    world.drone_tuning.cruise_speed,
                    world.drone_tuning.full_power_turn_rate,
                    secs,
                )
            });
            animate(ctx, secs, AnimateOptions::default(), |world, d| {
                let ground = world.ground_height();
                step_position(&mut world.state, (plan.dx, plan.dy, plan.dz), d, ground);
                world.state.heading += plan.dheading * d;
            })
            .await;
            true
        }
        Action::SetColor { color } => {
            set_led(ctx, LedAppearance::full(*color));
            wait(ctx, pacing::LED_SETTLE).await;
            false
        }
        Action::LedHex { color, brightness } | Action::LedRgb { color, brightness } => {
            set_led(ctx, LedAppearance::with_brightness(*color, *brightness));
            wait(ctx, pacing::LED_SETTLE).await;
            false
        }
        Action::LedOff => {
            set_led(ctx, LedAppearance::off());
            wait(ctx, pacing::LED_SETTLE).await;
            false
        }
        Action::LedSequence { pattern, color } => {
            led_sequence(ctx, *pattern, *color).await;
            false
        }
        Action::Print { text } => {
            print(ctx, text).await;
            false
        }
        Action::CollectWater => {
            collect_water(ctx).await;
            false
        }
        Action::ReleaseWater => {
            release_water(ctx).await;
            false
        }
        Action::Unknown { kind } => {
            warn!(kind = %kind, "unknown command kind");
            ctx.log(&format!("Unknown command: {kind}"));
            false
        }
    }
}

async fn takeoff(ctx: &SimContext) {
    let (climb, secs) = ctx.with_world(|world| {
        (
            world.drone_tuning.takeoff_altitude,
            world.drone_tuning.takeoff_seconds,
        )
    });
    // Already flying: the climb is replayed from the current altitude.
    let outcome = animate(ctx, secs, AnimateOptions::atomic(), |world, d| {
        world.state.y += climb * d;
    })
    .await;
    if outcome != MotionOutcome::Stopped {
        ctx.with_world(|world| {
            world.state.is_flying = true;
            world.mission.has_taken_off = true;
        });
    }
}

async fn land(ctx: &SimContext) {
    let (drop, secs) = ctx.with_world(|world| {
        (
            world.state.y - world.ground_height(),
            world.drone_tuning.land_seconds,
        )
    });
    let outcome = animate(ctx, secs, AnimateOptions::atomic(), |world, d| {
        world.state.y -= drop * d;
    })
    .await;
    if outcome == MotionOutcome::Stopped {
        return;
    }

    let landing = ctx.with_world(|world| {
        world.state.is_flying = false;
        world.score_landing()
    });
    if let Some(landing) = landing {
        ctx.log(&format!(
            "Landing distance to target: {:.1} cm",
            landing.distance
        ));
        if landing.on_target {
            ctx.log("Perfect landing! (+10 score)");
        } else {
            ctx.log("Missed target. (error > 20 cm)");
        }
    }
}

async fn translate(ctx: &SimContext, direction: Direction, distance: f32, secs: f32) {
    let heading = ctx.with_world(|world| world.state.heading);
    let (vx, vy, vz) = direction_vector(direction, heading);
    let delta = (vx * distance, vy * distance, vz * distance);
    animate(ctx, secs, AnimateOptions::default(), |world, d| {
        let ground = world.ground_height();
        step_position(&mut world.state, delta, d, ground);
    })
    .await;
}

async fn rotate(ctx: &SimContext, total_degrees: f32, secs: f32) {
    animate(ctx, secs, AnimateOptions::atomic(), |world, d| {
        world.state.heading += total_degrees * d;
    })
    .await;
}

fn set_led(ctx: &SimContext, appearance: LedAppearance) {
    ctx.with_world(|world| world.led = appearance);
    ctx.hooks.led_changed(&appearance);
}

async fn led_sequence(ctx: &SimContext, pattern: LedPattern, color: Rgb) {
    set_led(ctx, LedAppearance::full(color));
    match pattern {
        LedPattern::Dimming => {
            let mut progress = 0.0_f32;
            animate(
                ctx,
                pacing::LED_DIM_SECONDS,
                AnimateOptions::default(),
                |world, d| {
                    progress += d;
                    world.led.intensity =
                        LedAppearance::MAX_INTENSITY * (progress * PI).sin().abs();
                },
            )
            .await;
            let appearance = ctx.with_world(|world| world.led);
            ctx.hooks.led_changed(&appearance);
        }
        LedPattern::Blinking => {
            wait(ctx, pacing::LED_BLINK).await;
        }
    }
}

async fn print(ctx: &SimContext, text: &TextProducer) {
    let message = ctx.with_world(|world| text.render(|kind, unit| world.measure(kind, unit)));
    ctx.log(&message);
    wait(ctx, pacing::PRINT_SETTLE).await;
}

async fn collect_water(ctx: &SimContext) {
    if ctx.with_world(|world| world.cell_under_drone()) != Some(grid::WATER) {
        ctx.log("Collect failed: the drone must be right above a water source.");
        return;
    }
    if wait(ctx, pacing::PAYLOAD_DWELL).await {
        ctx.with_world(|world| world.state.has_water = true);
        ctx.log("Water collected. Tank is full.");
    }
}

async fn release_water(ctx: &SimContext) {
    let (has_water, cell) =
        ctx.with_world(|world| (world.state.has_water, world.cell_under_drone()));
    if !has_water {
        ctx.log("Release failed: the tank is empty, collect water first.");
        return;
    }
    if cell != Some(grid::FIRE) {
        ctx.log("Release failed: the drone must be right above a fire.");
        return;
    }
    if wait(ctx, pacing::PAYLOAD_DWELL).await {
        ctx.with_world(|world| world.state.has_water = false);
        ctx.log("Fire extinguished!");
    }
}

fn positive_or(value: f32, default: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        default
    }
}

/// A zero turn is read as "no amount given".
fn nonzero_or(value: f32, default: f32) -> f32 {
    if value.is_finite() && value != 0.0 {
        value
    } else {
        default
    }
}

fn finite_or(value: f32, default: f32) -> f32 {
    if value.is_finite() { value } else { default }
}
