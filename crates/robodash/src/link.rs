//! Non-blocking outbound calls: the engine hands requests to a `Link` and
//! receives telemetry results back as `PollCompletion` messages.

#![allow(missing_docs)]

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, warn};

use crate::command::RobotCommand;
use crate::error::TransportError;
use crate::telemetry::TelemetrySnapshot;
use crate::transport::Transport;

/// Identifies one poll. `epoch` changes whenever the poller is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PollTicket {
    pub epoch: u64,
    pub seq: u64,
}

#[derive(Debug, Clone)]
pub struct PollCompletion {
    pub ticket: PollTicket,
    pub result: Result<TelemetrySnapshot, TransportError>,
    pub elapsed: Duration,
}

/// Outbound side of the engine. Both calls must return without waiting on
/// the network.
pub trait Link {
    fn fetch_telemetry(&mut self, ticket: PollTicket);

    /// Commands must reach the robot in the order they are submitted.
    fn send_command(&mut self, command: RobotCommand);
}

/// Production link: one FIFO worker thread for commands, one short-lived
/// thread per telemetry poll. Dropping it flushes queued commands.
///
/// A robot slower than the repeat period must not build a backlog of drive
/// repeats in front of `stop`, so the worker coalesces whatever has queued up
/// while the previous call was in flight.
pub struct ThreadedLink {
    transport: Arc<dyn Transport>,
    commands: Option<Sender<RobotCommand>>,
    completions: Sender<PollCompletion>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadedLink {
    pub fn new(transport: Arc<dyn Transport>) -> io::Result<(Self, Receiver<PollCompletion>)> {
        let (command_tx, command_rx) = unbounded::<RobotCommand>();
        let (completion_tx, completion_rx) = unbounded();
        let worker_transport = Arc::clone(&transport);
        let worker = thread::Builder::new()
            .name("robodash-commands".into())
            .spawn(move || run_command_worker(worker_transport.as_ref(), &command_rx))?;
        Ok((
            Self {
                transport,
                commands: Some(command_tx),
                completions: completion_tx,
                worker: Some(worker),
            },
            completion_rx,
        ))
    }
}

fn run_command_worker(transport: &dyn Transport, commands: &Receiver<RobotCommand>) {
    let mut last_sent = None;
    while let Ok(first) = commands.recv() {
        let mut batch = vec![first];
        batch.extend(commands.try_iter());
        let queued = batch.len();
        let batch = coalesce(&batch, last_sent);
        if batch.len() < queued {
            debug!(queued, kept = batch.len(), "drive repeats coalesced");
        }
        for command in batch {
            match transport.send_command(command) {
                Ok(()) => debug!(%command, "command sent"),
                Err(err) => warn!(%command, %err, "command dispatch failed"),
            }
            last_sent = Some(command);
        }
    }
}

/// Thins a backlog of queued commands. `stop` and mode commands are always
/// kept in order. A drive is dropped when the next queued command repeats it,
/// or when it only repeats the last command already sent and a `stop` or mode
/// change is waiting behind it. The first drive of a stream always goes out,
/// so a quick tap still reaches the robot as drive then stop.
fn coalesce(batch: &[RobotCommand], last_sent: Option<RobotCommand>) -> Vec<RobotCommand> {
    let mut kept = Vec::with_capacity(batch.len());
    for (index, command) in batch.iter().enumerate() {
        if let RobotCommand::Drive(_) = command {
            let rest = &batch[index + 1..];
            if rest.first() == Some(command) {
                continue;
            }
            let already_moving = kept.last().or(last_sent.as_ref()) == Some(command);
            if already_moving && rest.iter().any(|next| !matches!(next, RobotCommand::Drive(_))) {
                continue;
            }
        }
        kept.push(*command);
    }
    kept
}

impl Link for ThreadedLink {
    fn fetch_telemetry(&mut self, ticket: PollTicket) {
        let transport = Arc::clone(&self.transport);
        let completions = self.completions.clone();
        let spawned = thread::Builder::new()
            .name("robodash-poll".into())
            .spawn(move || {
                let started = Instant::now();
                let result = transport.fetch_telemetry();
                let _ = completions.send(PollCompletion {
                    ticket,
                    result,
                    elapsed: started.elapsed(),
                });
            });
        if let Err(err) = spawned {
            warn!(%err, "failed to spawn poll thread");
            let _ = self.completions.send(PollCompletion {
                ticket,
                result: Err(TransportError::Network(
                    format!("spawn poll thread: {err}").into(),
                )),
                elapsed: Duration::ZERO,
            });
        }
    }

    fn send_command(&mut self, command: RobotCommand) {
        let queued = self
            .commands
            .as_ref()
            .is_some_and(|commands| commands.send(command).is_ok());
        if !queued {
            warn!(%command, "command worker stopped; dropping command");
        }
    }
}

impl Drop for ThreadedLink {
    fn drop(&mut self) {
        self.commands.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("command worker panicked");
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records every outbound call instead of performing it.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingLink {
        pub polls: Vec<PollTicket>,
        pub commands: Vec<RobotCommand>,
    }

    impl RecordingLink {
        pub(crate) fn take_commands(&mut self) -> Vec<RobotCommand> {
            std::mem::take(&mut self.commands)
        }
    }

    impl Link for RecordingLink {
        fn fetch_telemetry(&mut self, ticket: PollTicket) {
            self.polls.push(ticket);
        }

        fn send_command(&mut self, command: RobotCommand) {
            self.commands.push(command);
        }
    }
}
