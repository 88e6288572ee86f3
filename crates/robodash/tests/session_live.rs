mod fake_robot;

use std::sync::Arc;
use std::time::{Duration, Instant};

use fake_robot::FakeRobot;
use robodash::config::EngineConfig;
use robodash::mapper::{Key, KeyInput};
use robodash::{ControlMode, EngineView, HttpTransport, RobotEndpoint, SessionHandle};

fn spawn(robot: &FakeRobot) -> SessionHandle {
    let endpoint = RobotEndpoint::parse(robot.base_url()).expect("parse fake robot url");
    let transport = HttpTransport::new(endpoint, Duration::from_secs(1));
    let config = EngineConfig {
        poll_interval: Duration::from_millis(25),
        repeat_interval: Duration::from_millis(25),
        max_in_flight_polls: 4,
    };
    SessionHandle::spawn(&config, Arc::new(transport)).expect("spawn session")
}

fn wait_for(handle: &SessionHandle, predicate: impl Fn(&EngineView) -> bool) -> EngineView {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let view = handle
            .views()
            .recv_timeout(remaining)
            .expect("session view before deadline");
        if predicate(&view) {
            return view;
        }
    }
}

#[test]
fn live_session_tracks_robot_health() {
    let robot = FakeRobot::start();
    let handle = spawn(&robot);

    let view = wait_for(&handle, |view| view.connected);
    assert_eq!(view.telemetry.movement, "Turning");
    assert_eq!(view.telemetry.signal().label().as_str(), "Fair");

    robot.reply_with(500, "");
    let view = wait_for(&handle, |view| !view.connected);
    assert_eq!(view.telemetry.movement, "Turning", "last snapshot is kept");

    robot.reply_with(200, fake_robot::TURNING);
    wait_for(&handle, |view| view.connected);
    handle.shutdown();
}

#[test]
fn held_arrow_streams_drive_commands_and_release_stops() {
    let robot = FakeRobot::start();
    let handle = spawn(&robot);
    wait_for(&handle, |view| view.active);

    handle.key(KeyInput::down(Key::ArrowUp));
    wait_for(&handle, |view| view.metrics.commands_issued >= 4);
    handle.key(KeyInput::up(Key::ArrowUp));
    wait_for(&handle, |view| view.active_directive.is_none());
    handle.switch_mode(ControlMode::Autonomous);
    wait_for(&handle, |view| view.mode == ControlMode::Autonomous);
    handle.shutdown();

    let commands = robot.commands();
    let stop_at = commands
        .iter()
        .position(|command| command == "cmd=stop")
        .expect("stop reached robot");
    assert!(stop_at >= 3, "expected repeats before stop: {commands:?}");
    assert!(commands[..stop_at].iter().all(|command| command == "cmd=forward"));
    assert_eq!(commands[stop_at + 1..], ["mode=autonomous".to_string()]);
}

#[test]
fn shutdown_while_held_sends_a_final_stop() {
    let robot = FakeRobot::start();
    let handle = spawn(&robot);
    wait_for(&handle, |view| view.active);
    handle.directive_start(robodash::Direction::Left);
    wait_for(&handle, |view| view.active_directive.is_some());
    let last = handle.shutdown().expect("final view");
    assert!(!last.active);
    assert_eq!(last.active_directive, None);
    assert_eq!(robot.commands().last().map(String::as_str), Some("cmd=stop"));
}
