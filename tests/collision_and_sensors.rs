mod support;

use drone_sim::domain::command::{Action, Command, Direction};
use drone_sim::domain::grid;
use drone_sim::domain::{OccupancyGrid, Pose, Scene, SceneKind, SensorKind, Unit};
use drone_sim::use_cases::dispatcher::dispatch;
use support::assert_close;

// Three rows of free / wall / free: the wall occupies x in [100, 200).
fn walled_scene(start: Pose) -> Scene {
    let cells = vec![vec![0, 1, 0], vec![0, 1, 0], vec![0, 1, 0]];
    let grid = OccupancyGrid::new(cells, 100.0, 0.0, 0.0);
    Scene::from_grid(SceneKind::Free, grid).with_start(start)
}

#[tokio::test(start_paused = true)]
async fn move_into_wall_stops_at_the_face_and_snaps_to_safe() {
    let (simulator, _hooks) = support::spawn(walled_scene(Pose::new(50.0, 0.0, 150.0, 90.0)));
    support::hover_at(&simulator, 50.0);
    let ctx = simulator.context();
    let safe_before = ctx.with_world(|world| world.safe);

    let report = dispatch(
        ctx,
        &Command::new(Action::Move {
            direction: Direction::Forward,
            seconds: 2.0,
            power: 50.0,
        }),
    )
    .await;

    assert!(report.collided);
    let (x, z, safe) = ctx.with_world(|world| (world.state.x, world.state.z, world.safe));
    assert!(x > 80.0 && x <= 85.0, "x = {x}");
    assert_close(z, 150.0, 1e-3);
    assert_eq!((x, z), (safe.x, safe.z));
    // The snap keeps the progress made before contact.
    assert!(x > safe_before.x + 30.0);
}

#[tokio::test(start_paused = true)]
async fn diagonal_move_slides_along_the_wall() {
    // Heading 45 pushes along +x and +z at once.
    let (simulator, _hooks) = support::spawn(walled_scene(Pose::new(60.0, 0.0, 20.0, 45.0)));
    support::hover_at(&simulator, 50.0);
    let ctx = simulator.context();

    // The collision pass alone: x is held back while z keeps advancing.
    let mut last_z = 20.0;
    for _ in 0..20 {
        ctx.with_world(|world| {
            world.state.x += 5.0;
            world.state.z += 5.0;
        });
        drone_sim::use_cases::motion::next_frame(ctx).await;
        let (x, z) = ctx.with_world(|world| (world.state.x, world.state.z));
        assert!(x + 15.0 < 100.0, "x = {x}");
        assert!(z > last_z);
        last_z = z;
    }
    assert_close(last_z, 120.0, 1e-3);
}

#[tokio::test(start_paused = true)]
async fn front_sensor_sees_wall_and_open_space() {
    let (simulator, _hooks) = support::spawn(walled_scene(Pose::new(0.0, 0.0, 150.0, 90.0)));
    support::hover_at(&simulator, 50.0);

    assert_close(simulator.measure(SensorKind::Front, Unit::Cm), 100.0, 0.01);
    assert_close(simulator.measure(SensorKind::Front, Unit::M), 1.0, 0.01);
    // Facing away from the wall there is nothing within range.
    assert_eq!(simulator.measure(SensorKind::Left, Unit::Cm), 500.0);
    assert_eq!(simulator.measure(SensorKind::Bottom, Unit::Mm), 500.0);

    // Above the walls the ray passes over them.
    support::hover_at(&simulator, 130.0);
    assert_eq!(simulator.measure(SensorKind::Front, Unit::Cm), 500.0);
}

#[tokio::test(start_paused = true)]
async fn payload_needs_the_right_cell() {
    let cells = vec![vec![grid::WATER, grid::FREE, grid::FIRE]];
    let scene = Scene::from_grid(SceneKind::City, OccupancyGrid::new(cells, 100.0, 0.0, 0.0))
        .with_start(Pose::new(50.0, 0.0, 50.0, 90.0));
    let (simulator, hooks) = support::spawn(scene);

    let commands = vec![
        Command::new(Action::Takeoff),
        Command::new(Action::ReleaseWater),
        Command::new(Action::CollectWater),
        Command::new(Action::MoveDistance {
            direction: Direction::Forward,
            centimeters: 200.0,
        }),
        Command::new(Action::CollectWater),
        Command::new(Action::ReleaseWater),
        Command::new(Action::Land),
    ];
    simulator.run_batch(&commands).await.expect("batch runs");

    let logs = hooks.logs();
    let payload: Vec<&str> = logs
        .iter()
        .map(String::as_str)
        .filter(|line| {
            !line.starts_with("Landing") && !line.contains("landing") && !line.starts_with("Missed")
        })
        .collect();
    assert_eq!(
        payload,
        vec![
            "Release failed: the tank is empty, collect water first.",
            "Water collected. Tank is full.",
            "Collect failed: the drone must be right above a water source.",
            "Fire extinguished!",
        ]
    );
    assert!(!simulator.snapshot().has_water);
}
