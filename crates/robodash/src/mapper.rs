//! Turns held input (button press, arrow key) into a repeating drive command
//! stream and a single `stop` on release.

use std::time::Duration;

use tracing::debug;

use crate::command::{ControlMode, Direction, RobotCommand};
use crate::link::Link;
use crate::metrics::EngineMetrics;
use crate::timer::{Fire, Interval};

/// Keys the mapper understands. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other,
}

impl Key {
    #[must_use]
    pub fn direction(self) -> Option<Direction> {
        match self {
            Key::ArrowUp => Some(Direction::Forward),
            Key::ArrowDown => Some(Direction::Backward),
            Key::ArrowLeft => Some(Direction::Left),
            Key::ArrowRight => Some(Direction::Right),
            Key::Other => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Down,
    /// Platform auto-repeat while held; always suppressed.
    Repeat,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub phase: KeyPhase,
}

impl KeyInput {
    #[must_use]
    pub fn down(key: Key) -> Self {
        Self {
            key,
            phase: KeyPhase::Down,
        }
    }

    #[must_use]
    pub fn repeat(key: Key) -> Self {
        Self {
            key,
            phase: KeyPhase::Repeat,
        }
    }

    #[must_use]
    pub fn up(key: Key) -> Self {
        Self {
            key,
            phase: KeyPhase::Up,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    Inactive,
    NotManual,
    AlreadyHeld(Direction),
    NotArrowKey,
    KeyRepeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Started(Direction),
    /// `stop` was sent; `released` is the directive that was held, if any.
    Stopped { released: Option<Direction> },
    Ignored(Ignored),
}

/// The live repeat timer for the held directive.
#[derive(Debug)]
pub struct RepeatHandle {
    id: u64,
    direction: Direction,
    interval: Interval,
}

impl RepeatHandle {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// Two states: idle (`held == None`) and held. At most one handle lives.
#[derive(Debug)]
pub struct InputMapper {
    period: Duration,
    held: Option<RepeatHandle>,
    next_id: u64,
}

impl InputMapper {
    #[must_use]
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            held: None,
            next_id: 1,
        }
    }

    #[must_use]
    pub fn held(&self) -> Option<&RepeatHandle> {
        self.held.as_ref()
    }

    #[must_use]
    pub fn active_directive(&self) -> Option<Direction> {
        self.held.as_ref().map(RepeatHandle::direction)
    }

    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.held.as_ref().map(|handle| handle.interval.next_due())
    }

    pub fn on_directive_start(
        &mut self,
        direction: Direction,
        mode: ControlMode,
        now: Duration,
        link: &mut dyn Link,
        metrics: &mut EngineMetrics,
    ) -> InputOutcome {
        if mode != ControlMode::Manual {
            return InputOutcome::Ignored(Ignored::NotManual);
        }
        if let Some(handle) = self.held.as_ref() {
            debug!(held = %handle.direction, requested = %direction, "start while held ignored");
            return InputOutcome::Ignored(Ignored::AlreadyHeld(handle.direction));
        }
        send(link, metrics, RobotCommand::Drive(direction));
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.held = Some(RepeatHandle {
            id,
            direction,
            interval: Interval::starting_at(now, self.period),
        });
        debug!(%direction, handle = id, "directive held");
        InputOutcome::Started(direction)
    }

    /// Cancels the repeat stream before the `stop` goes out. Sends `stop`
    /// even when nothing is held (tap-to-stop).
    pub fn on_directive_end(
        &mut self,
        mode: ControlMode,
        link: &mut dyn Link,
        metrics: &mut EngineMetrics,
    ) -> InputOutcome {
        if mode != ControlMode::Manual {
            return InputOutcome::Ignored(Ignored::NotManual);
        }
        let released = self.held.take().map(|handle| handle.direction);
        send(link, metrics, RobotCommand::Stop);
        InputOutcome::Stopped { released }
    }

    pub fn on_key(
        &mut self,
        input: KeyInput,
        mode: ControlMode,
        now: Duration,
        link: &mut dyn Link,
        metrics: &mut EngineMetrics,
    ) -> InputOutcome {
        if mode != ControlMode::Manual {
            return InputOutcome::Ignored(Ignored::NotManual);
        }
        let Some(direction) = input.key.direction() else {
            return InputOutcome::Ignored(Ignored::NotArrowKey);
        };
        match input.phase {
            KeyPhase::Down => self.on_directive_start(direction, mode, now, link, metrics),
            KeyPhase::Repeat => InputOutcome::Ignored(Ignored::KeyRepeat),
            KeyPhase::Up => self.on_directive_end(mode, link, metrics),
        }
    }

    /// Tears down a held directive when leaving manual mode or shutting
    /// down: the repeat stream is cancelled, then one `stop` is sent.
    pub fn release(
        &mut self,
        link: &mut dyn Link,
        metrics: &mut EngineMetrics,
    ) -> Option<Direction> {
        let handle = self.held.take()?;
        send(link, metrics, RobotCommand::Stop);
        Some(handle.direction)
    }

    pub fn tick(&mut self, now: Duration, link: &mut dyn Link, metrics: &mut EngineMetrics) {
        let Some(handle) = self.held.as_mut() else {
            return;
        };
        if let Fire::Due { skipped } = handle.interval.poll(now) {
            if skipped > 0 {
                metrics.record_overrun(skipped);
            }
            send(link, metrics, RobotCommand::Drive(handle.direction));
        }
    }
}

fn send(link: &mut dyn Link, metrics: &mut EngineMetrics, command: RobotCommand) {
    metrics.commands_issued += 1;
    link.send_command(command);
}
