//! Periodic telemetry polling and connection health.

use std::time::Duration;

use tracing::{debug, info};

use crate::link::{Link, PollCompletion, PollTicket};
use crate::metrics::EngineMetrics;
use crate::telemetry::TelemetrySnapshot;
use crate::timer::{Fire, Interval};

/// What a completion did to the poller's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollApplied {
    Updated,
    Failed,
    /// Completion from a torn-down poller; nothing changed.
    Stale,
}

/// Owns the last good snapshot and the connection flag. Both change only
/// when a completion for the current epoch arrives.
#[derive(Debug)]
pub struct TelemetryPoller {
    period: Duration,
    max_in_flight: usize,
    interval: Option<Interval>,
    epoch: u64,
    next_seq: u64,
    in_flight: usize,
    telemetry: TelemetrySnapshot,
    connected: bool,
}

impl TelemetryPoller {
    #[must_use]
    pub fn new(period: Duration, max_in_flight: usize) -> Self {
        Self {
            period,
            max_in_flight: max_in_flight.max(1),
            interval: None,
            epoch: 0,
            next_seq: 0,
            in_flight: 0,
            telemetry: TelemetrySnapshot::default(),
            connected: false,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.interval.is_some()
    }

    #[must_use]
    pub fn telemetry(&self) -> &TelemetrySnapshot {
        &self.telemetry
    }

    #[must_use]
    pub fn connected(&self) -> bool {
        self.connected
    }

    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.interval.map(|interval| interval.next_due())
    }

    /// First poll goes out one period after `now`.
    pub fn activate(&mut self, now: Duration) {
        if self.is_active() {
            return;
        }
        self.interval = Some(Interval::starting_at(now, self.period));
        debug!(epoch = self.epoch, "telemetry poller active");
    }

    /// Stops the schedule and orphans every outstanding request. Returns
    /// `false` when already inactive.
    pub fn deactivate(&mut self) -> bool {
        if self.interval.take().is_none() {
            return false;
        }
        self.epoch = self.epoch.wrapping_add(1);
        self.in_flight = 0;
        debug!(epoch = self.epoch, "telemetry poller stopped");
        true
    }

    pub fn tick(&mut self, now: Duration, link: &mut dyn Link, metrics: &mut EngineMetrics) {
        let Some(interval) = self.interval.as_mut() else {
            return;
        };
        let Fire::Due { skipped } = interval.poll(now) else {
            return;
        };
        if skipped > 0 {
            metrics.record_overrun(skipped);
        }
        if self.in_flight >= self.max_in_flight {
            metrics.polls_throttled += 1;
            debug!(in_flight = self.in_flight, "poll skipped; robot not answering");
            return;
        }
        let ticket = PollTicket {
            epoch: self.epoch,
            seq: self.next_seq,
        };
        self.next_seq = self.next_seq.wrapping_add(1);
        self.in_flight += 1;
        metrics.polls_issued += 1;
        link.fetch_telemetry(ticket);
    }

    /// Applies results in arrival order; the latest arrival wins.
    pub fn complete(&mut self, completion: PollCompletion, metrics: &mut EngineMetrics) -> PollApplied {
        if !self.is_active() || completion.ticket.epoch != self.epoch {
            metrics.polls_stale += 1;
            return PollApplied::Stale;
        }
        self.in_flight = self.in_flight.saturating_sub(1);
        metrics.poll_latency.record(completion.elapsed);
        match completion.result {
            Ok(snapshot) => {
                metrics.polls_ok += 1;
                if !self.connected {
                    info!("robot connected");
                }
                self.telemetry = snapshot;
                self.connected = true;
                PollApplied::Updated
            }
            Err(err) => {
                metrics.polls_failed += 1;
                if self.connected {
                    info!(%err, "robot disconnected");
                } else {
                    debug!(%err, "poll failed");
                }
                self.connected = false;
                PollApplied::Failed
            }
        }
    }
}
