//! Client configuration loading (`robodash.toml`).

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use smol_str::SmolStr;

use crate::error::ConfigError;
use crate::transport::RobotEndpoint;

pub const CONFIG_FILE_NAME: &str = "robodash.toml";
pub const URL_ENV: &str = "ROBODASH_URL";
pub const DEFAULT_BASE_URL: &str = "http://192.168.1.50";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub robot: RobotConfig,
    pub engine: EngineConfig,
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone)]
pub struct RobotConfig {
    pub endpoint: RobotEndpoint,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub poll_interval: Duration,
    pub repeat_interval: Duration,
    pub max_in_flight_polls: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            repeat_interval: Duration::from_millis(100),
            max_in_flight_polls: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    fn parse(text: &str) -> Result<Self, ConfigError> {
        match text.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(ConfigError::InvalidConfig(
                format!("invalid console.theme '{text}'").into(),
            )),
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub theme: Theme,
    pub release_grace: Duration,
    pub log_level: SmolStr,
    pub log_file: Option<PathBuf>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            release_grace: Duration::from_millis(600),
            log_level: SmolStr::new("info"),
            log_file: None,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            robot: RobotConfig {
                endpoint: RobotEndpoint::default(),
                request_timeout: Duration::from_millis(1000),
            },
            engine: EngineConfig::default(),
            console: ConsoleConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            ConfigError::Io(format!("{}: failed to read config: {err}", path.display()).into())
        })?;
        Self::from_toml_str(&text).map_err(|err| match err {
            ConfigError::InvalidConfig(message) => {
                ConfigError::InvalidConfig(format!("{}: {message}", path.display()).into())
            }
            other => other,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: ConfigToml = toml::from_str(text)
            .map_err(|err| ConfigError::InvalidConfig(format!("{err}").into()))?;
        raw.into_config()
    }

    /// Explicit path, else `robodash.toml` in `dir` when present, else defaults.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Self::load(candidate);
        }
        Ok(Self::default())
    }

    /// Applies the `ROBODASH_URL` value, then the command-line flag.
    pub fn apply_overrides(
        &mut self,
        env_url: Option<&str>,
        flag_url: Option<&str>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = flag_url.or(env_url) {
            self.robot.endpoint = RobotEndpoint::parse(url)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    #[serde(default)]
    robot: RobotToml,
    #[serde(default)]
    engine: EngineToml,
    #[serde(default)]
    console: ConsoleToml,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RobotToml {
    base_url: Option<String>,
    request_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineToml {
    poll_interval_ms: Option<u64>,
    repeat_interval_ms: Option<u64>,
    max_in_flight_polls: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConsoleToml {
    theme: Option<String>,
    release_grace_ms: Option<u64>,
    log_level: Option<String>,
    log_file: Option<PathBuf>,
}

impl ConfigToml {
    fn into_config(self) -> Result<ClientConfig, ConfigError> {
        let defaults = ClientConfig::default();
        let endpoint = match self.robot.base_url.as_deref() {
            Some(url) => RobotEndpoint::parse(url)?,
            None => defaults.robot.endpoint,
        };
        let request_timeout = positive_ms(
            "robot.request_timeout_ms",
            self.robot.request_timeout_ms,
            defaults.robot.request_timeout,
        )?;
        let engine = EngineConfig {
            poll_interval: positive_ms(
                "engine.poll_interval_ms",
                self.engine.poll_interval_ms,
                defaults.engine.poll_interval,
            )?,
            repeat_interval: positive_ms(
                "engine.repeat_interval_ms",
                self.engine.repeat_interval_ms,
                defaults.engine.repeat_interval,
            )?,
            max_in_flight_polls: match self.engine.max_in_flight_polls {
                Some(0) => {
                    return Err(ConfigError::InvalidConfig(
                        "engine.max_in_flight_polls must be at least 1".into(),
                    ))
                }
                Some(value) => value,
                None => defaults.engine.max_in_flight_polls,
            },
        };
        let theme = match self.console.theme.as_deref() {
            Some(text) => Theme::parse(text)?,
            None => defaults.console.theme,
        };
        let log_level = match self.console.log_level {
            Some(level) if level.trim().is_empty() => {
                return Err(ConfigError::InvalidConfig(
                    "console.log_level must not be empty".into(),
                ))
            }
            Some(level) => SmolStr::new(level.trim()),
            None => defaults.console.log_level,
        };
        Ok(ClientConfig {
            robot: RobotConfig {
                endpoint,
                request_timeout,
            },
            engine,
            console: ConsoleConfig {
                theme,
                release_grace: positive_ms(
                    "console.release_grace_ms",
                    self.console.release_grace_ms,
                    defaults.console.release_grace,
                )?,
                log_level,
                log_file: self.console.log_file,
            },
        })
    }
}

fn positive_ms(key: &str, value: Option<u64>, default: Duration) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(default),
        Some(0) => Err(ConfigError::InvalidConfig(
            format!("{key} must be greater than zero").into(),
        )),
        Some(ms) => Ok(Duration::from_millis(ms)),
    }
}
