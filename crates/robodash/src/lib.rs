//! Remote-control client for mobile robots exposing a small HTTP API
//! (`GET /data` for telemetry, `GET /command?cmd=` / `?mode=` for actuation).
//!
//! The [`engine::Engine`] polls telemetry, turns held input into a repeating
//! command stream and arbitrates between manual and autonomous control.
//! [`session::SessionHandle`] runs it on a background thread; [`ui`] renders
//! it in the terminal.

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod link;
pub mod mapper;
pub mod metrics;
pub mod mode;
pub mod poller;
pub mod session;
pub mod telemetry;
pub mod timer;
pub mod transport;
pub mod ui;

pub use command::{ControlMode, Direction, RobotCommand};
pub use config::ClientConfig;
pub use engine::{Engine, EngineView, InputEvent};
pub use error::{ConfigError, TransportError};
pub use session::SessionHandle;
pub use telemetry::{SignalLabel, SignalQuality, TelemetrySnapshot};
pub use transport::{HttpTransport, RobotEndpoint, Transport};
