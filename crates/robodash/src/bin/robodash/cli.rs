use std::path::PathBuf;

use clap::{Parser, Subcommand};
use robodash::{ControlMode, Direction};

#[derive(Debug, Parser)]
#[command(name = "robodash", version, about = "Monitor and drive an HTTP-controlled robot")]
pub struct Cli {
    /// Configuration file (defaults to ./robodash.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Robot base URL; overrides ROBODASH_URL and the config file.
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive terminal dashboard.
    Ui {
        /// Render only; ignore drive and mode keys.
        #[arg(long)]
        no_input: bool,
    },
    /// Fetch telemetry once and print it.
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Hold a drive directive, then release it.
    Drive {
        #[arg(value_parser = parse_direction)]
        direction: Direction,
        #[arg(long, default_value_t = 500, value_name = "MS")]
        hold_ms: u64,
    },
    /// Switch the robot between manual and autonomous control.
    Mode {
        #[arg(value_parser = parse_mode)]
        mode: ControlMode,
    },
    /// Send a single stop command.
    Stop,
}

impl Command {
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Ui { .. })
    }
}

fn parse_direction(text: &str) -> Result<Direction, String> {
    Direction::parse(text)
        .ok_or_else(|| format!("unknown direction '{text}' (forward, backward, left, right)"))
}

fn parse_mode(text: &str) -> Result<ControlMode, String> {
    ControlMode::parse(text).ok_or_else(|| format!("unknown mode '{text}' (manual, autonomous)"))
}
