//! Error types shared by the transport and configuration layers.

#![allow(missing_docs)]

use smol_str::SmolStr;
use thiserror::Error;

/// Failure of a single call against the robot.
///
/// Never fatal: the poller degrades the connection flag and command dispatch
/// logs and drops it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(SmolStr),
    #[error("robot answered with HTTP status {0}")]
    Status(u16),
    #[error("malformed telemetry payload: {0}")]
    Malformed(SmolStr),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    InvalidConfig(SmolStr),
    #[error("config io error: {0}")]
    Io(SmolStr),
}
