use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use folio_core::common::time::Clock;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandOutcome};
use crate::context::Monitor;
use crate::error::MonitorError;
use crate::report::StatusReport;

/// Commands that may wait for the loop before senders block.
pub const COMMAND_CAPACITY: usize = 16;

/// A command plus the channel its outcome goes back on.
pub struct CommandRequest {
    pub command: Command,
    pub reply: oneshot::Sender<Result<CommandOutcome, MonitorError>>,
}

/// # Summary
/// Cloneable handle used by the control surface.
///
/// # Invariants
/// - Never touches monitor state directly; commands are queued for the loop
///   and status is read from the last published report.
#[derive(Clone)]
pub struct MonitorHandle {
    commands: mpsc::Sender<CommandRequest>,
    status: watch::Receiver<StatusReport>,
}

impl MonitorHandle {
    /// # Summary
    /// Queues a command and waits for the loop to apply it.
    ///
    /// # Returns
    /// The outcome, or `MonitorError::Stopped` when the loop has exited.
    pub async fn send(&self, command: Command) -> Result<CommandOutcome, MonitorError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(CommandRequest { command, reply })
            .await
            .map_err(|_| MonitorError::Stopped)?;
        outcome.await.map_err(|_| MonitorError::Stopped)?
    }

    /// Last published status report.
    pub fn status(&self) -> StatusReport {
        self.status.borrow().clone()
    }

    /// Receiver notified whenever a new report is published.
    pub fn subscribe(&self) -> watch::Receiver<StatusReport> {
        self.status.clone()
    }
}

/// # Summary
/// Owns the monitor and drives it: one tick per cadence period, commands in
/// between, until the shutdown future resolves.
pub struct MonitorRuntime {
    monitor: Monitor,
    clock: Arc<dyn Clock>,
    cadence: Duration,
    commands: mpsc::Receiver<CommandRequest>,
    status: watch::Sender<StatusReport>,
}

impl MonitorRuntime {
    /// # Summary
    /// Pairs a monitor with its control handle.
    ///
    /// # Arguments
    /// * `monitor` - fully wired monitor.
    /// * `clock` - source of loop time.
    /// * `cadence` - period between ticks.
    pub fn new(monitor: Monitor, clock: Arc<dyn Clock>, cadence: Duration) -> (Self, MonitorHandle) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (status_tx, status_rx) = watch::channel(monitor.report(clock.now()));
        let runtime = Self {
            monitor,
            clock,
            cadence,
            commands: commands_rx,
            status: status_tx,
        };
        let handle = MonitorHandle {
            commands: commands_tx,
            status: status_rx,
        };
        (runtime, handle)
    }

    /// # Summary
    /// Runs the loop until `shutdown` resolves.
    ///
    /// # Logic
    /// 1. Play the startup sequence.
    /// 2. On each cadence tick run `Monitor::tick`; missed ticks are skipped,
    ///    never bunched.
    /// 3. Commands are applied as they arrive, between ticks.
    /// 4. A report is published after every tick and every command.
    ///
    /// # Returns
    /// The monitor, so callers can inspect final state.
    pub async fn run<F>(mut self, shutdown: F) -> Monitor
    where
        F: Future<Output = ()>,
    {
        self.monitor.start(self.clock.now());
        self.publish();

        let mut interval = tokio::time::interval(self.cadence);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(cadence_ms = self.cadence.as_millis(), "Monitor loop running");
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Monitor loop stopping");
                    break;
                }
                Some(request) = self.commands.recv() => {
                    let outcome = self.monitor.apply(request.command, self.clock.now());
                    if let Err(e) = &outcome {
                        warn!(error = %e, "Command failed");
                    }
                    if request.reply.send(outcome).is_err() {
                        debug!("Command caller went away before the reply");
                    }
                    self.publish();
                }
                _ = interval.tick() => {
                    self.monitor.tick(self.clock.now()).await;
                    self.publish();
                }
            }
        }
        self.monitor
    }

    fn publish(&self) {
        self.status.send_replace(self.monitor.report(self.clock.now()));
    }
}
