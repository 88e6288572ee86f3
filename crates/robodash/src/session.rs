//! Event loop that drives an [`Engine`] on its own thread.

#![allow(missing_docs)]

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{select, unbounded, Receiver, Sender};
use tracing::debug;

use crate::command::{ControlMode, Direction};
use crate::config::EngineConfig;
use crate::engine::{Engine, EngineView, InputEvent};
use crate::link::{Link, PollCompletion, ThreadedLink};
use crate::mapper::KeyInput;
use crate::transport::Transport;

/// Upper bound on a single wait when no timer is armed.
const IDLE_WAIT: Duration = Duration::from_millis(250);

pub struct Session<L: Link> {
    engine: Engine<L>,
    completions: Receiver<PollCompletion>,
    inputs: Receiver<InputEvent>,
    started: Instant,
}

impl<L: Link> Session<L> {
    pub fn new(
        engine: Engine<L>,
        completions: Receiver<PollCompletion>,
        inputs: Receiver<InputEvent>,
    ) -> Self {
        Self {
            engine,
            completions,
            inputs,
            started: Instant::now(),
        }
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    /// Runs until `Shutdown` arrives or every input sender is gone, then
    /// returns the final view.
    pub fn run(mut self) -> EngineView {
        let now = self.now();
        self.engine.activate(now);
        loop {
            let now = self.now();
            self.engine.tick(now);
            let timeout = self
                .engine
                .next_deadline()
                .map_or(IDLE_WAIT, |due| due.saturating_sub(self.now()).min(IDLE_WAIT));
            select! {
                recv(self.completions) -> completion => {
                    if let Ok(completion) = completion {
                        self.engine.on_poll_complete(completion);
                    }
                }
                recv(self.inputs) -> input => match input {
                    Ok(InputEvent::Shutdown) | Err(_) => break,
                    Ok(event) => {
                        let now = self.now();
                        self.engine.handle(event, now);
                    }
                },
                default(timeout) => {}
            }
        }
        self.engine.deactivate();
        debug!("session loop finished");
        self.engine.view()
    }
}

impl<L: Link> Drop for Session<L> {
    fn drop(&mut self) {
        self.engine.deactivate();
    }
}

/// Presentation-side handle to a running session.
pub struct SessionHandle {
    inputs: Sender<InputEvent>,
    views: Receiver<EngineView>,
    thread: Option<JoinHandle<EngineView>>,
}

impl SessionHandle {
    /// Starts a session over HTTP-style `transport` on a new thread.
    pub fn spawn(config: &EngineConfig, transport: Arc<dyn Transport>) -> io::Result<Self> {
        let (link, completions) = ThreadedLink::new(transport)?;
        let mut engine = Engine::new(config, link);
        let views = engine.subscribe();
        let (input_tx, input_rx) = unbounded();
        let session = Session::new(engine, completions, input_rx);
        let thread = thread::Builder::new()
            .name("robodash-session".into())
            .spawn(move || session.run())?;
        Ok(Self {
            inputs: input_tx,
            views,
            thread: Some(thread),
        })
    }

    fn send(&self, event: InputEvent) -> bool {
        self.inputs.send(event).is_ok()
    }

    pub fn directive_start(&self, direction: Direction) -> bool {
        self.send(InputEvent::DirectiveStart(direction))
    }

    pub fn directive_end(&self) -> bool {
        self.send(InputEvent::DirectiveEnd)
    }

    pub fn key(&self, input: KeyInput) -> bool {
        self.send(InputEvent::Key(input))
    }

    pub fn switch_mode(&self, target: ControlMode) -> bool {
        self.send(InputEvent::SwitchMode(target))
    }

    #[must_use]
    pub fn views(&self) -> &Receiver<EngineView> {
        &self.views
    }

    /// Drains pending views and returns the newest, if any arrived.
    pub fn latest_view(&self) -> Option<EngineView> {
        self.views.try_iter().last()
    }

    /// Stops the loop and waits for it. Returns the final view.
    pub fn shutdown(mut self) -> Option<EngineView> {
        self.stop()
    }

    fn stop(&mut self) -> Option<EngineView> {
        let thread = self.thread.take()?;
        let _ = self.inputs.send(InputEvent::Shutdown);
        thread.join().ok()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::RobotCommand;
    use crate::error::TransportError;
    use crate::telemetry::TelemetrySnapshot;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRobot {
        commands: Mutex<Vec<RobotCommand>>,
    }

    impl Transport for FakeRobot {
        fn fetch_telemetry(&self) -> Result<TelemetrySnapshot, TransportError> {
            Ok(TelemetrySnapshot {
                speed: 55,
                ..TelemetrySnapshot::default()
            })
        }

        fn send_command(&self, command: RobotCommand) -> Result<(), TransportError> {
            self.commands
                .lock()
                .unwrap_or_else(|poison| poison.into_inner())
                .push(command);
            Ok(())
        }
    }

    fn fast_config() -> EngineConfig {
        EngineConfig {
            poll_interval: Duration::from_millis(20),
            repeat_interval: Duration::from_millis(20),
            max_in_flight_polls: 4,
        }
    }

    fn wait_for(handle: &SessionHandle, predicate: impl Fn(&EngineView) -> bool) -> EngineView {
        let deadline = Instant::now() + Duration::from_secs(3);
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
    fn session_connects_and_streams_commands_until_release() {
        let robot = Arc::new(FakeRobot::default());
        let handle = SessionHandle::spawn(&fast_config(), Arc::clone(&robot) as Arc<dyn Transport>)
            .expect("spawn session");
        let view = wait_for(&handle, |view| view.connected);
        assert_eq!(view.telemetry.speed, 55);

        assert!(handle.directive_start(Direction::Forward));
        wait_for(&handle, |view| view.metrics.commands_issued >= 4);
        assert!(handle.directive_end());
        wait_for(&handle, |view| view.active_directive.is_none());
        let last = handle.shutdown().expect("final view");
        assert!(!last.active);

        let deadline = Instant::now() + Duration::from_secs(3);
        let (commands, stop_at) = loop {
            let commands = robot
                .commands
                .lock()
                .unwrap_or_else(|poison| poison.into_inner())
                .clone();
            if let Some(stop_at) = commands.iter().position(|command| command.is_stop()) {
                break (commands, stop_at);
            }
            assert!(Instant::now() < deadline, "stop never reached robot: {commands:?}");
            thread::sleep(Duration::from_millis(5));
        };
        assert!(stop_at >= 3, "expected repeats before stop: {commands:?}");
        assert!(commands[..stop_at]
            .iter()
            .all(|command| *command == RobotCommand::Drive(Direction::Forward)));
    }

    #[test]
    fn dropping_handle_stops_the_loop() {
        let robot = Arc::new(FakeRobot::default());
        let handle =
            SessionHandle::spawn(&fast_config(), robot as Arc<dyn Transport>).expect("spawn session");
        assert!(handle.switch_mode(ControlMode::Autonomous));
        let view = wait_for(&handle, |view| view.mode == ControlMode::Autonomous);
        assert_eq!(view.active_directive, None);
        drop(handle);
    }
}
