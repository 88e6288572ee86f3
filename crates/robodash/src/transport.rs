//! HTTP transport to the robot (`GET /data`, `GET /command`).

#![allow(missing_docs)]

use std::fmt;
use std::time::Duration;

use smol_str::SmolStr;
use tracing::debug;

use crate::command::RobotCommand;
use crate::config::DEFAULT_BASE_URL;
use crate::error::{ConfigError, TransportError};
use crate::telemetry::TelemetrySnapshot;

/// Base address of the robot's HTTP API, without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotEndpoint {
    base: SmolStr,
}

impl Default for RobotEndpoint {
    fn default() -> Self {
        Self {
            base: SmolStr::new(DEFAULT_BASE_URL),
        }
    }
}

impl fmt::Display for RobotEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

impl RobotEndpoint {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let trimmed = text.trim().trim_end_matches('/');
        let rest = trimmed
            .strip_prefix("http://")
            .or_else(|| trimmed.strip_prefix("https://"))
            .ok_or_else(|| {
                ConfigError::InvalidConfig(
                    format!("robot url '{text}' must start with http:// or https://").into(),
                )
            })?;
        if rest.is_empty() || rest.starts_with('/') || rest.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidConfig(
                format!("robot url '{text}' has no host").into(),
            ));
        }
        if rest.contains('?') || rest.contains('#') {
            return Err(ConfigError::InvalidConfig(
                format!("robot url '{text}' must not carry a query or fragment").into(),
            ));
        }
        Ok(Self {
            base: SmolStr::new(trimmed),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    #[must_use]
    pub fn data_url(&self) -> String {
        format!("{}/data", self.base)
    }

    #[must_use]
    pub fn command_url(&self, command: RobotCommand) -> String {
        let (key, value) = command.query();
        format!("{}/command?{key}={}", self.base, urlencoding::encode(value))
    }
}

/// Calls the core issues against the robot. Implementations block the calling
/// thread; the engine never calls them directly (see `link`).
pub trait Transport: Send + Sync {
    fn fetch_telemetry(&self) -> Result<TelemetrySnapshot, TransportError>;

    fn send_command(&self, command: RobotCommand) -> Result<(), TransportError>;
}

pub struct HttpTransport {
    endpoint: RobotEndpoint,
    agent: ureq::Agent,
}

impl HttpTransport {
    #[must_use]
    pub fn new(endpoint: RobotEndpoint, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { endpoint, agent }
    }

    #[must_use]
    pub fn endpoint(&self) -> &RobotEndpoint {
        &self.endpoint
    }

    fn get(&self, url: &str) -> Result<ureq::Response, TransportError> {
        debug!(url, "robot request");
        match self.agent.get(url).call() {
            Ok(response) if (200..300).contains(&response.status()) => Ok(response),
            Ok(response) => Err(TransportError::Status(response.status())),
            Err(ureq::Error::Status(code, _)) => Err(TransportError::Status(code)),
            Err(ureq::Error::Transport(err)) => {
                Err(TransportError::Network(err.to_string().into()))
            }
        }
    }
}

impl Transport for HttpTransport {
    fn fetch_telemetry(&self) -> Result<TelemetrySnapshot, TransportError> {
        let response = self.get(&self.endpoint.data_url())?;
        let body = response
            .into_string()
            .map_err(|err| TransportError::Network(format!("read body: {err}").into()))?;
        TelemetrySnapshot::from_json(&body)
    }

    fn send_command(&self, command: RobotCommand) -> Result<(), TransportError> {
        self.get(&self.endpoint.command_url(command)).map(|_| ())
    }
}
