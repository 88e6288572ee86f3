//! `robodash` command-line entry point.

mod cli;
mod exit;
mod report;

use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use robodash::config::{ConsoleConfig, URL_ENV};
use robodash::ui::{run_ui, UiOptions};
use robodash::{
    ClientConfig, ControlMode, Direction, HttpTransport, RobotCommand, SessionHandle, Transport,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "Error:".red().bold());
            ExitCode::from(exit::classify(&err))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("resolve working directory")?;
    let config = load_config(&cli, &cwd)?;
    init_logging(&config.console, cli.command.is_interactive())?;
    let transport = HttpTransport::new(
        config.robot.endpoint.clone(),
        config.robot.request_timeout,
    );
    info!(robot = %config.robot.endpoint.base_url(), "robodash starting");

    match cli.command {
        Command::Ui { no_input } => {
            let handle = SessionHandle::spawn(&config.engine, Arc::new(transport))
                .context("start control session")?;
            run_ui(
                handle,
                UiOptions {
                    theme: config.console.theme,
                    no_input,
                    release_grace: config.console.release_grace,
                },
            )
        }
        Command::Status { json } => status(&transport, json),
        Command::Drive { direction, hold_ms } => {
            drive(&config, transport, direction, Duration::from_millis(hold_ms))
        }
        Command::Mode { mode } => send_once(&transport, RobotCommand::Mode(mode)),
        Command::Stop => send_once(&transport, RobotCommand::Stop),
    }
}

fn load_config(cli: &Cli, cwd: &Path) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::resolve(cli.config.as_deref(), cwd)?;
    let env_url = std::env::var(URL_ENV).ok();
    config.apply_overrides(env_url.as_deref(), cli.base_url.as_deref())?;
    Ok(config)
}

/// `RUST_LOG` wins over the configured level. The dashboard owns the
/// terminal, so it logs to `log_file` or nowhere.
fn init_logging(console: &ConsoleConfig, interactive: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(console.log_level.as_str()))
        .with_context(|| format!("invalid log level '{}'", console.log_level))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match (&console.log_file, interactive) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        (None, true) => builder.with_writer(std::io::sink).init(),
        (None, false) => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn status(transport: &HttpTransport, json: bool) -> anyhow::Result<()> {
    let telemetry = transport
        .fetch_telemetry()
        .with_context(|| format!("fetch telemetry from {}", transport.endpoint()))?;
    let report = report::StatusReport::new(transport.endpoint(), &telemetry);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("{}", "Robot status".bold());
    print!("{}", report::format_status(&report));
    Ok(())
}

fn drive(
    config: &ClientConfig,
    transport: HttpTransport,
    direction: Direction,
    hold: Duration,
) -> anyhow::Result<()> {
    let handle = SessionHandle::spawn(&config.engine, Arc::new(transport))
        .context("start control session")?;
    handle.directive_start(direction);
    thread::sleep(hold);
    handle.directive_end();
    let view = handle
        .shutdown()
        .context("control session ended unexpectedly")?;
    println!(
        "{} {direction} for {} ms ({} commands, robot {})",
        "Drove".green().bold(),
        hold.as_millis(),
        view.metrics.commands_issued,
        if view.connected {
            "connected".green().to_string()
        } else {
            "not responding".yellow().to_string()
        }
    );
    Ok(())
}

fn send_once(transport: &HttpTransport, command: RobotCommand) -> anyhow::Result<()> {
    transport
        .send_command(command)
        .with_context(|| format!("send {command} to {}", transport.endpoint()))?;
    let what = match command {
        RobotCommand::Mode(ControlMode::Manual) => "Manual mode".to_string(),
        RobotCommand::Mode(ControlMode::Autonomous) => "Autonomous mode".to_string(),
        other => other.to_string(),
    };
    println!("{} {what}", "Sent".green().bold());
    Ok(())
}
