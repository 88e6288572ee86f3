//! Composition root: owns the session state and wires the poller, the input
//! mapper and the mode controller together.
//!
//! The engine never reads a clock. Every entry point takes `now`, a monotonic
//! offset from session start, and fires any timer due at that instant before
//! handling the call, so timer output and user input stay in issue order.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::debug;

use crate::command::{ControlMode, Direction};
use crate::config::EngineConfig;
use crate::link::{Link, PollCompletion};
use crate::mapper::{Ignored, InputMapper, InputOutcome, KeyInput};
use crate::metrics::EngineMetrics;
use crate::mode::{ModeController, ModeSwitch};
use crate::poller::{PollApplied, TelemetryPoller};
use crate::telemetry::TelemetrySnapshot;

/// Raw input forwarded by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    DirectiveStart(Direction),
    DirectiveEnd,
    Key(KeyInput),
    SwitchMode(ControlMode),
    Shutdown,
}

/// Read-only copy of everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineView {
    pub telemetry: TelemetrySnapshot,
    pub connected: bool,
    pub mode: ControlMode,
    pub active_directive: Option<Direction>,
    pub active: bool,
    pub metrics: EngineMetrics,
}

/// Single-slot mailbox holding the newest view. The engine keeps a receiver
/// clone so it can evict a view nobody has read yet.
struct ViewSlot {
    tx: Sender<EngineView>,
    rx: Receiver<EngineView>,
}

impl ViewSlot {
    fn replace(&self, view: EngineView) {
        let _ = self.rx.try_recv();
        let _ = self.tx.try_send(view);
    }
}

pub struct Engine<L: Link> {
    link: L,
    poller: TelemetryPoller,
    mapper: InputMapper,
    modes: ModeController,
    metrics: EngineMetrics,
    active: bool,
    subscribers: Vec<ViewSlot>,
    last_published: Option<EngineView>,
}

impl<L: Link> Engine<L> {
    pub fn new(config: &EngineConfig, link: L) -> Self {
        Self {
            link,
            poller: TelemetryPoller::new(config.poll_interval, config.max_in_flight_polls),
            mapper: InputMapper::new(config.repeat_interval),
            modes: ModeController::default(),
            metrics: EngineMetrics::default(),
            active: false,
            subscribers: Vec::new(),
            last_published: None,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn telemetry(&self) -> &TelemetrySnapshot {
        self.poller.telemetry()
    }

    #[must_use]
    pub fn connected(&self) -> bool {
        self.poller.connected()
    }

    #[must_use]
    pub fn mode(&self) -> ControlMode {
        self.modes.mode()
    }

    #[must_use]
    pub fn active_directive(&self) -> Option<Direction> {
        self.mapper.active_directive()
    }

    #[must_use]
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    #[must_use]
    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    #[must_use]
    pub fn view(&self) -> EngineView {
        EngineView {
            telemetry: self.poller.telemetry().clone(),
            connected: self.poller.connected(),
            mode: self.modes.mode(),
            active_directive: self.mapper.active_directive(),
            active: self.active,
            metrics: self.metrics,
        }
    }

    /// New receiver holds the current view immediately. It never holds more
    /// than one view: a change replaces whatever has not been read yet.
    pub fn subscribe(&mut self) -> Receiver<EngineView> {
        let (tx, rx) = bounded(1);
        let slot = ViewSlot { tx, rx: rx.clone() };
        slot.replace(self.view());
        self.subscribers.push(slot);
        rx
    }

    /// Earliest instant at which `tick` has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        if !self.active {
            return None;
        }
        match (self.poller.next_due(), self.mapper.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn activate(&mut self, now: Duration) {
        if self.active {
            return;
        }
        self.active = true;
        self.poller.activate(now);
        debug!("engine active");
        self.publish();
    }

    /// Cancels both timers. A held directive gets its `stop`. Safe to call
    /// repeatedly; returns `false` when already inactive.
    pub fn deactivate(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.poller.deactivate();
        self.mapper.release(&mut self.link, &mut self.metrics);
        self.active = false;
        debug!("engine deactivated");
        self.broadcast();
        true
    }

    pub fn tick(&mut self, now: Duration) {
        if !self.active {
            return;
        }
        self.advance(now);
        self.publish();
    }

    pub fn on_poll_complete(&mut self, completion: PollCompletion) -> PollApplied {
        let applied = self.poller.complete(completion, &mut self.metrics);
        if applied != PollApplied::Stale {
            self.publish();
        }
        applied
    }

    pub fn on_directive_start(&mut self, direction: Direction, now: Duration) -> InputOutcome {
        if !self.active {
            return InputOutcome::Ignored(Ignored::Inactive);
        }
        self.advance(now);
        let mode = self.modes.mode();
        let outcome =
            self.mapper
                .on_directive_start(direction, mode, now, &mut self.link, &mut self.metrics);
        self.publish();
        outcome
    }

    pub fn on_directive_end(&mut self, now: Duration) -> InputOutcome {
        if !self.active {
            return InputOutcome::Ignored(Ignored::Inactive);
        }
        self.advance(now);
        let mode = self.modes.mode();
        let outcome = self
            .mapper
            .on_directive_end(mode, &mut self.link, &mut self.metrics);
        self.publish();
        outcome
    }

    pub fn on_key(&mut self, input: KeyInput, now: Duration) -> InputOutcome {
        if !self.active {
            return InputOutcome::Ignored(Ignored::Inactive);
        }
        self.advance(now);
        let mode = self.modes.mode();
        let outcome = self
            .mapper
            .on_key(input, mode, now, &mut self.link, &mut self.metrics);
        self.publish();
        outcome
    }

    pub fn switch_mode(&mut self, target: ControlMode, now: Duration) -> ModeSwitch {
        if !self.active {
            return ModeSwitch::Inactive;
        }
        self.advance(now);
        let switched = self.modes.switch_mode(
            target,
            &mut self.mapper,
            &mut self.link,
            &mut self.metrics,
        );
        self.publish();
        switched
    }

    /// Routes a presentation event. `Shutdown` deactivates the engine.
    pub fn handle(&mut self, event: InputEvent, now: Duration) {
        match event {
            InputEvent::DirectiveStart(direction) => {
                self.on_directive_start(direction, now);
            }
            InputEvent::DirectiveEnd => {
                self.on_directive_end(now);
            }
            InputEvent::Key(input) => {
                self.on_key(input, now);
            }
            InputEvent::SwitchMode(target) => {
                self.switch_mode(target, now);
            }
            InputEvent::Shutdown => {
                self.deactivate();
            }
        }
    }

    fn advance(&mut self, now: Duration) {
        self.mapper.tick(now, &mut self.link, &mut self.metrics);
        self.poller.tick(now, &mut self.link, &mut self.metrics);
    }

    fn publish(&mut self) {
        if !self.active {
            return;
        }
        self.broadcast();
    }

    fn broadcast(&mut self) {
        let view = self.view();
        if self.last_published.as_ref() == Some(&view) {
            return;
        }
        for subscriber in &self.subscribers {
            subscriber.replace(view.clone());
        }
        self.last_published = Some(view);
    }
}
