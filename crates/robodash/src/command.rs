//! Robot command vocabulary: drive directives, control modes and the wire
//! actions they map to.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four held movement directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Left,
        Direction::Right,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "forward" | "fwd" | "up" => Some(Self::Forward),
            "backward" | "back" | "down" => Some(Self::Backward),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is driving the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    #[default]
    Manual,
    Autonomous,
}

impl ControlMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ControlMode::Manual => "manual",
            ControlMode::Autonomous => "autonomous",
        }
    }

    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "manual" => Some(Self::Manual),
            "autonomous" | "auto" => Some(Self::Autonomous),
            _ => None,
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fire-and-forget actuation sent to the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotCommand {
    Drive(Direction),
    Stop,
    Mode(ControlMode),
}

impl RobotCommand {
    /// Query parameter name and value used on `/command`.
    #[must_use]
    pub fn query(self) -> (&'static str, &'static str) {
        match self {
            RobotCommand::Drive(direction) => ("cmd", direction.as_str()),
            RobotCommand::Stop => ("cmd", "stop"),
            RobotCommand::Mode(mode) => ("mode", mode.as_str()),
        }
    }

    #[must_use]
    pub fn is_stop(self) -> bool {
        matches!(self, RobotCommand::Stop)
    }
}

impl fmt::Display for RobotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (key, value) = self.query();
        write!(f, "{key}={value}")
    }
}
