use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::clock::SimulationClock;
use super::shutdown::ShutdownGuard;
use crate::battery::{self, StepParams, forecast};
use crate::config::SimCfg;
use crate::history::HistoryBuffer;
use crate::io::input::{self, Command, CommandReceiver, CommandSender};
use crate::io::output::{self, NotificationReceiver};
use crate::notify::{ChannelSink, NotificationSink};
use crate::types::{BatteryState, DashboardStatus, HistorySample, Notification};

/// Commands are rare user actions; a small buffer is plenty.
const COMMAND_BUFFER: usize = 16;

/// Error type for the runtime task.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("runtime task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Owns the simulation state and is its only writer.
///
/// Ticks and commands are handled in one task, so the threshold read by a
/// tick is always the latest committed value.
pub struct Runtime {
    cfg: Arc<SimCfg>,
    shutdown: ShutdownGuard,
    params: StepParams,
    battery: BatteryState,
    threshold: f64,
    history: HistoryBuffer,
    tick_count: u64,
    rng: StdRng,
    /// Inbound user actions.
    command_rx: CommandReceiver,
    /// Where toasts go.
    sink: Box<dyn NotificationSink>,
    /// Snapshot broadcast after every change.
    status_tx: watch::Sender<DashboardStatus>,
}

impl Runtime {
    /// Create a new Runtime. Returns (Runtime, command_sender, notification_receiver, status_receiver).
    pub fn new(
        cfg: Arc<SimCfg>,
    ) -> (
        Self,
        CommandSender,
        NotificationReceiver,
        watch::Receiver<DashboardStatus>,
    ) {
        let (note_tx, note_rx) = output::channel(cfg.notification_buffer);
        let (runtime, command_tx, status_rx) = Self::with_sink(cfg, Box::new(ChannelSink::new(note_tx)));
        (runtime, command_tx, note_rx, status_rx)
    }

    /// Create a Runtime that reports to a custom sink.
    pub fn with_sink(
        cfg: Arc<SimCfg>,
        sink: Box<dyn NotificationSink>,
    ) -> (Self, CommandSender, watch::Receiver<DashboardStatus>) {
        let (command_tx, command_rx) = input::channel(COMMAND_BUFFER);
        let battery = BatteryState::new(cfg.initial_level, cfg.initial_temperature);
        let history = HistoryBuffer::new(cfg.history_capacity);
        let threshold = cfg.threshold;
        let initial = DashboardStatus {
            tick_count: 0,
            battery,
            threshold,
            history: Vec::new(),
            time_to_empty: forecast::time_to_empty(battery.level, cfg.drain_per_tick, cfg.tick_period()),
        };
        let (status_tx, status_rx) = watch::channel(initial);
        let runtime = Self {
            params: StepParams::from(cfg.as_ref()),
            cfg,
            shutdown: ShutdownGuard::new(),
            battery,
            threshold,
            history,
            tick_count: 0,
            rng: StdRng::from_entropy(),
            command_rx,
            sink,
            status_tx,
        };
        (runtime, command_tx, status_rx)
    }

    /// Use a fixed seed for the temperature walk.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Returns the cancellation token that stops the tick loop.
    pub fn token(&self) -> CancellationToken {
        self.shutdown.token()
    }

    /// Cancel on SIGTERM / Ctrl+C.
    pub fn listen_for_signals(&self) {
        self.shutdown.spawn_signal_listener();
    }

    /// Enter the tick loop. Returns once the token is cancelled.
    pub async fn run(&mut self) {
        let token = self.shutdown.token();
        let mut clock = SimulationClock::new(self.cfg.tick_period());
        let mut commands_open = true;

        tracing::info!(
            period_ms = self.cfg.tick_ms,
            threshold = self.threshold,
            level = self.battery.level,
            "simulation started"
        );
        self.broadcast();

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::info!(tick_count = self.tick_count, "shutdown signal received, exiting tick loop");
                    break;
                },
                cmd = self.command_rx.recv(), if commands_open => {
                    match cmd {
                        Some(cmd) => self.handle_command(cmd, &mut clock),
                        None => {
                            tracing::debug!("command channel closed");
                            commands_open = false;
                        }
                    }
                },
                _ = clock.tick() => {
                    self.tick();
                },
            }
        }

        tracing::info!("simulation stopped");
    }

    /// Run on a background task. Stop it with [`RuntimeTask::stop`].
    pub fn spawn(mut self) -> RuntimeTask {
        let token = self.token();
        let join = tokio::spawn(async move { self.run().await });
        RuntimeTask { token, join }
    }

    /// Single tick: step the battery, record a sample, surface events, broadcast.
    pub fn tick(&mut self) {
        self.tick_count += 1;
        let _span = tracing::info_span!("tick", n = self.tick_count).entered();

        let outcome = battery::step(&self.battery, self.threshold, &self.params, &mut self.rng);
        self.battery = outcome.state;
        self.history.append(HistorySample::now(self.battery.level));

        for event in outcome.events {
            tracing::info!(?event, level = self.battery.level, "battery event");
            self.sink.notify(event);
        }

        tracing::debug!(
            level = self.battery.level,
            voltage = self.battery.voltage,
            temperature = self.battery.temperature,
            status = %self.battery.status,
            "battery stepped"
        );
        self.broadcast();
    }

    /// Full recharge. Status reads `Charging` until the next tick.
    pub fn recharge(&mut self) {
        self.battery = battery::recharge(&self.battery);
        if self.cfg.clear_history_on_recharge {
            self.history.clear();
        }
        tracing::info!("battery recharged");
        self.sink.push(Notification::success("Battery fully recharged!"));
        self.broadcast();
    }

    /// Commit a new threshold. Takes effect on the next tick.
    pub fn set_threshold(&mut self, threshold: f64) {
        tracing::info!(old = self.threshold, new = threshold, "threshold updated");
        self.threshold = threshold;
        self.sink.push(Notification::success(format!("Threshold updated: {threshold}%")));
        self.broadcast();
    }

    pub fn battery(&self) -> BatteryState {
        self.battery
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Current snapshot, as broadcast to readers.
    pub fn status(&self) -> DashboardStatus {
        DashboardStatus {
            tick_count: self.tick_count,
            battery: self.battery,
            threshold: self.threshold,
            history: self.history.samples(),
            time_to_empty: forecast::time_to_empty(
                self.battery.level,
                self.cfg.drain_per_tick,
                self.cfg.tick_period(),
            ),
        }
    }

    fn handle_command(&mut self, cmd: Command, clock: &mut SimulationClock) {
        match cmd {
            Command::Recharge => self.recharge(),
            Command::SetThreshold(threshold) => {
                self.set_threshold(threshold);
                // Re-arm so the next tick is a full period away and sees the new value.
                clock.restart();
            }
        }
    }

    fn broadcast(&self) {
        // fails only when every receiver is gone
        let _ = self.status_tx.send(self.status());
    }
}

/// Handle to a runtime running on a background task.
#[derive(Debug)]
pub struct RuntimeTask {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl RuntimeTask {
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel and wait for the loop to exit. No tick runs after this returns.
    pub async fn stop(self) -> Result<(), RuntimeError> {
        self.token.cancel();
        self.join.await?;
        Ok(())
    }
}
