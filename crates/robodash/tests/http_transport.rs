mod fake_robot;

use std::time::Duration;

use fake_robot::FakeRobot;
use robodash::{
    ControlMode, Direction, HttpTransport, RobotCommand, RobotEndpoint, Transport, TransportError,
};

fn transport(robot: &FakeRobot) -> HttpTransport {
    let endpoint = RobotEndpoint::parse(robot.base_url()).expect("parse fake robot url");
    HttpTransport::new(endpoint, Duration::from_secs(2))
}

#[test]
fn fetches_and_decodes_telemetry() {
    let robot = FakeRobot::start();
    let telemetry = transport(&robot).fetch_telemetry().expect("telemetry");
    assert_eq!(telemetry.distance, 12.5);
    assert!(telemetry.ir_left);
    assert!(!telemetry.ir_right);
    assert_eq!(telemetry.movement, "Turning");
    assert_eq!(telemetry.speed, 40);
    assert_eq!(telemetry.wifi_strength, -55);
    assert_eq!(robot.requests(), vec!["/data".to_string()]);
}

#[test]
fn non_success_status_is_reported() {
    let robot = FakeRobot::start();
    robot.reply_with(503, "busy");
    assert_eq!(
        transport(&robot).fetch_telemetry(),
        Err(TransportError::Status(503))
    );
}

#[test]
fn undecodable_body_is_malformed() {
    let robot = FakeRobot::start();
    robot.reply_with(200, "{\"distance\":");
    assert!(matches!(
        transport(&robot).fetch_telemetry(),
        Err(TransportError::Malformed(_))
    ));
}

#[test]
fn commands_use_the_query_string_protocol() {
    let robot = FakeRobot::start();
    let transport = transport(&robot);
    for command in [
        RobotCommand::Drive(Direction::Forward),
        RobotCommand::Drive(Direction::Right),
        RobotCommand::Stop,
        RobotCommand::Mode(ControlMode::Autonomous),
        RobotCommand::Mode(ControlMode::Manual),
    ] {
        transport.send_command(command).expect("send command");
    }
    assert_eq!(
        robot.commands(),
        vec![
            "cmd=forward",
            "cmd=right",
            "cmd=stop",
            "mode=autonomous",
            "mode=manual",
        ]
    );
}

#[test]
fn closed_port_is_a_network_error() {
    let robot = FakeRobot::start();
    let endpoint = RobotEndpoint::parse(robot.base_url()).expect("parse fake robot url");
    drop(robot);
    let transport = HttpTransport::new(endpoint, Duration::from_millis(500));
    assert!(matches!(
        transport.fetch_telemetry(),
        Err(TransportError::Network(_))
    ));
}
