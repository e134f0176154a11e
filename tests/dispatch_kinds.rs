mod support;

use drone_sim::domain::command::{Action, Command, LedPattern, TurnDirection};
use drone_sim::domain::{FlightVariable, LedAppearance, Rgb, Scene};
use drone_sim::use_cases::dispatcher::dispatch;
use support::assert_close;

fn set_var(variable: FlightVariable, percent: f32) -> Command {
    Command::new(Action::SetVariable { variable, percent })
}

#[tokio::test(start_paused = true)]
async fn timed_turn_scales_rate_by_power() {
    let (simulator, _hooks) = support::spawn(Scene::free());
    support::hover_at(&simulator, 50.0);
    let ctx = simulator.context();

    // Half power for two seconds: 45 deg/s, to the right.
    dispatch(
        ctx,
        &Command::new(Action::TurnFor {
            direction: TurnDirection::Right,
            seconds: 2.0,
            power: 50.0,
        }),
    )
    .await;
    assert_close(simulator.snapshot().heading, 90.0, 1e-2);

    dispatch(
        ctx,
        &Command::new(Action::TurnFor {
            direction: TurnDirection::Left,
            seconds: 1.0,
            power: 100.0,
        }),
    )
    .await;
    assert_close(simulator.snapshot().heading, 180.0, 1e-2);
}

#[tokio::test(start_paused = true)]
async fn complex_move_combines_stick_positions() {
    let (simulator, _hooks) = support::spawn(Scene::free());
    support::hover_at(&simulator, 50.0);
    let ctx = simulator.context();

    dispatch(ctx, &set_var(FlightVariable::Pitch, 100.0)).await;
    dispatch(ctx, &set_var(FlightVariable::Throttle, 50.0)).await;
    dispatch(ctx, &set_var(FlightVariable::Yaw, 25.0)).await;
    dispatch(ctx, &Command::new(Action::MoveComplex { seconds: 2.0 })).await;

    // Heading 180 faces -z. The plan is fixed at the start of the move.
    let drone = simulator.snapshot();
    assert_close(drone.x, 0.0, 1e-2);
    assert_close(drone.z, -100.0, 1e-2);
    assert_close(drone.y, 100.0, 1e-2);
    assert_close(drone.heading, 225.0, 1e-2);
}

#[tokio::test(start_paused = true)]
async fn brightness_maps_onto_opacity_and_intensity() {
    let (simulator, hooks) = support::spawn(Scene::free());
    let ctx = simulator.context();
    let green = Rgb::new(0, 255, 0);

    dispatch(
        ctx,
        &Command::new(Action::LedHex {
            color: green,
            brightness: 127.5,
        }),
    )
    .await;
    let half = simulator.snapshot().led;
    assert_eq!(half.color, green);
    assert_close(half.opacity, 0.5, 1e-4);
    assert_close(half.intensity, 1.0, 1e-4);

    // Dark still leaves the housing faintly visible.
    dispatch(
        ctx,
        &Command::new(Action::LedRgb {
            color: green,
            brightness: 0.0,
        }),
    )
    .await;
    let dark = simulator.snapshot().led;
    assert_close(dark.opacity, 0.1, 1e-4);
    assert_eq!(dark.intensity, 0.0);

    assert_eq!(hooks.leds(), vec![half, dark]);
}

#[tokio::test(start_paused = true)]
async fn dimming_sequence_pulses_and_ends_dark() {
    let (simulator, hooks) = support::spawn(Scene::free());
    let ctx = simulator.context();
    let red = Rgb::new(255, 0, 0);
    let mut updates = simulator.subscribe();

    let command = Command::new(Action::LedSequence {
        pattern: LedPattern::Dimming,
        color: red,
    });
    let run = dispatch(ctx, &command);
    let watch = async {
        let mut peak = 0.0_f32;
        while let Ok(update) = updates.recv().await {
            peak = peak.max(update.drone.led.intensity);
            if update.tick > 60 {
                break;
            }
        }
        peak
    };
    let (_, peak) = tokio::join!(run, watch);

    // Mid-pulse the LED is near full intensity.
    assert!(peak > 1.9, "peak = {peak}");

    let leds = hooks.leds();
    assert_eq!(leds.len(), 2);
    assert_eq!(leds[0], LedAppearance::full(red));
    assert_eq!(leds[1].color, red);
    assert!(leds[1].intensity < 1e-3);
}

#[tokio::test(start_paused = true)]
async fn blinking_sequence_holds_full_color() {
    let (simulator, hooks) = support::spawn(Scene::free());
    let blue = Rgb::new(0, 0, 255);

    dispatch(
        simulator.context(),
        &Command::new(Action::LedSequence {
            pattern: LedPattern::Blinking,
            color: blue,
        }),
    )
    .await;

    assert_eq!(hooks.leds(), vec![LedAppearance::full(blue)]);
    assert_eq!(simulator.snapshot().led, LedAppearance::full(blue));
}

#[tokio::test(start_paused = true)]
async fn zero_degree_turn_uses_the_default_quarter_turn() {
    let (simulator, _hooks) = support::spawn(Scene::free());
    support::hover_at(&simulator, 50.0);

    dispatch(
        simulator.context(),
        &Command::new(Action::Turn {
            direction: TurnDirection::Left,
            degrees: 0.0,
        }),
    )
    .await;
    assert_close(simulator.snapshot().heading, 270.0, 1e-2);
}
