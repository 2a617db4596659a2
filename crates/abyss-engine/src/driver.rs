//! The frame-driven driver loop.
//!
//! One tokio interval tick is one simulation frame. Each frame:
//! 1. drains queued observer commands and applies them,
//! 2. applies oracle answers that arrived since the last frame,
//! 3. runs one [`Simulation::tick`],
//! 4. dispatches the tick's thought request, if any, as a background task,
//! 5. publishes a snapshot every `broadcast_every` frames.
//!
//! The oracle task never touches the simulation. It sends its answer back
//! over a channel and the driver applies it at the next frame boundary.

use std::sync::Arc;
use std::time::Duration;

use abyss_core::{Resolution, Simulation, ThoughtRequest};
use abyss_observer::{AppState, CommandEnvelope};
use abyss_oracle::OracleAdapter;
use abyss_types::Decision;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// An oracle answer waiting to be applied.
#[derive(Debug)]
struct Completion {
    ticket: u64,
    decision: Option<Decision>,
}

/// Timing knobs for the loop.
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// Time between frames.
    pub frame_interval: Duration,
    /// Publish a snapshot every this many frames (at least 1).
    pub broadcast_every: u64,
}

/// Owns the simulation and bridges it to the oracle and observer.
pub struct Driver {
    sim: Simulation,
    oracle: Arc<OracleAdapter>,
    state: Arc<AppState>,
    commands: mpsc::Receiver<CommandEnvelope>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    config: DriverConfig,
    frame: u64,
}

impl Driver {
    /// Create a driver around a populated simulation.
    pub fn new(
        sim: Simulation,
        oracle: Arc<OracleAdapter>,
        state: Arc<AppState>,
        commands: mpsc::Receiver<CommandEnvelope>,
        config: DriverConfig,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            sim,
            oracle,
            state,
            commands,
            completions_tx,
            completions_rx,
            config: DriverConfig {
                broadcast_every: config.broadcast_every.max(1),
                ..config
            },
            frame: 0,
        }
    }

    /// Run frames until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.config.frame_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            frame_interval = ?self.config.frame_interval,
            broadcast_every = self.config.broadcast_every,
            "driver loop started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => self.step().await,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(frames = self.frame, stats = ?self.sim.stats(), "driver loop stopped");
    }

    /// Run one frame.
    async fn step(&mut self) {
        self.drain_commands();
        self.drain_completions();

        let report = self.sim.tick(self.oracle.is_ready());
        if !report.deaths.is_empty() {
            debug!(deaths = report.deaths.len(), now = report.now, "deaths this frame");
        }
        if let Some(request) = report.thought {
            self.dispatch(request);
        }

        self.frame = self.frame.saturating_add(1);
        if self.frame.checked_rem(self.config.broadcast_every) == Some(0) {
            let receivers = self
                .state
                .publish(self.sim.snapshot(), self.oracle.stats(), self.frame)
                .await;
            debug!(frame = self.frame, receivers, "snapshot published");
        }
    }

    fn drain_commands(&mut self) {
        while let Ok(envelope) = self.commands.try_recv() {
            let result = self.sim.apply(envelope.command).map_err(|e| {
                warn!(error = %e, "command rejected");
                e.to_string()
            });
            if let Some(reply) = envelope.reply
                && reply.send(result).is_err()
            {
                debug!("command caller went away before the reply");
            }
        }
    }

    fn drain_completions(&mut self) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            self.apply_completion(completion);
        }
    }

    fn apply_completion(&mut self, completion: Completion) -> Resolution {
        let resolution = self
            .sim
            .resolve_thought(completion.ticket, completion.decision);
        debug!(ticket = completion.ticket, ?resolution, "thought resolved");
        resolution
    }

    /// Ask the oracle in the background. The answer comes back through the
    /// completion channel.
    fn dispatch(&self, request: ThoughtRequest) {
        info!(
            ticket = request.ticket,
            agent_id = %request.agent_id,
            agent_name = request.agent_name,
            "oracle request dispatched"
        );
        let oracle = Arc::clone(&self.oracle);
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let decision = oracle.generate_decision(&request.prompt).await;
            if completions
                .send(Completion {
                    ticket: request.ticket,
                    decision,
                })
                .is_err()
            {
                debug!(ticket = request.ticket, "driver stopped before the oracle answered");
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use abyss_core::{Command, CommandOutcome, ManualClock, SimulationConfig};
    use abyss_oracle::{LlmBackend, ScriptedBackend};
    use abyss_types::Intention;
    use tokio::sync::oneshot;

    use super::*;

    const START: u64 = 10_000;

    fn scripted_oracle(response: &str) -> Arc<OracleAdapter> {
        let backend = ScriptedBackend::new(vec![response.to_owned()], Duration::ZERO);
        Arc::new(OracleAdapter::from_backend(Some(LlmBackend::Scripted(
            backend,
        ))))
    }

    fn driver_with(
        oracle: Arc<OracleAdapter>,
        biobits: u32,
    ) -> (Driver, ManualClock, mpsc::Sender<CommandEnvelope>) {
        let clock = ManualClock::new(START);
        let mut config = SimulationConfig::default();
        config.arena.initial_biobits = biobits;
        config.arena.initial_nutrients = 0;
        config.nutrients.spawn_chance = 0.0;
        let mut sim = Simulation::seeded(config, Box::new(clock.clone()), 3).unwrap();
        sim.populate();
        let (tx, rx) = mpsc::channel(8);
        let driver = Driver::new(
            sim,
            oracle,
            Arc::new(AppState::with_commands(tx.clone())),
            rx,
            DriverConfig {
                frame_interval: Duration::from_millis(16),
                broadcast_every: 2,
            },
        );
        (driver, clock, tx)
    }

    #[tokio::test]
    async fn first_frame_dispatches_and_answer_is_applied() {
        let oracle = scripted_oracle(
            r#"{"intention":"flee","internal_monologue":"run","public_message":"...","move_direction":{"x":1,"y":0}}"#,
        );
        let (mut driver, clock, _tx) = driver_with(oracle, 1);

        driver.step().await;
        let thinker = driver.sim.thinking().unwrap();

        let completion = driver.completions_rx.recv().await.unwrap();
        clock.advance(16);
        let resolution = driver.apply_completion(completion);
        assert_eq!(
            resolution,
            Resolution::Applied {
                agent_id: thinker,
                intention: Intention::Flee,
            }
        );
        assert!(driver.sim.thinking().is_none());
        assert_eq!(driver.oracle.stats().generations, 1);
    }

    #[tokio::test]
    async fn disabled_oracle_never_dispatches() {
        let (mut driver, clock, _tx) = driver_with(Arc::new(OracleAdapter::disabled()), 2);
        for _ in 0..3 {
            driver.step().await;
            clock.advance(10_000);
        }
        assert!(driver.sim.thinking().is_none());
        assert!(driver.completions_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn commands_are_applied_and_answered() {
        let (mut driver, _clock, tx) = driver_with(Arc::new(OracleAdapter::disabled()), 0);
        let (reply, outcome) = oneshot::channel();
        tx.send(CommandEnvelope {
            command: Command::TogglePause,
            reply: Some(reply),
        })
        .await
        .unwrap();

        driver.step().await;

        assert_eq!(outcome.await.unwrap(), Ok(CommandOutcome::Paused { paused: true }));
        assert!(driver.sim.is_paused());
    }

    #[tokio::test]
    async fn rejected_command_reports_reason() {
        let (mut driver, _clock, tx) = driver_with(Arc::new(OracleAdapter::disabled()), 0);
        let (reply, outcome) = oneshot::channel();
        tx.send(CommandEnvelope {
            command: Command::SetEntropy { value: f64::NAN },
            reply: Some(reply),
        })
        .await
        .unwrap();

        driver.step().await;

        assert!(outcome.await.unwrap().is_err());
    }

    #[tokio::test]
    async fn snapshots_published_every_n_frames() {
        let (mut driver, clock, _tx) = driver_with(Arc::new(OracleAdapter::disabled()), 2);

        driver.step().await;
        assert!(driver.state.published.read().await.world.is_none());

        clock.advance(16);
        driver.step().await;
        let published = driver.state.published.read().await;
        assert_eq!(published.frame, 2);
        let world = published.world.as_deref().unwrap();
        assert_eq!(world.alive.len(), 2);
        assert_eq!(world.timestamp, START + 16);
        assert!(!published.oracle.ready);
    }

    #[tokio::test]
    async fn shutdown_stops_the_loop() {
        let (driver, _clock, _tx) = driver_with(Arc::new(OracleAdapter::disabled()), 1);
        let (stop, shutdown) = watch::channel(false);
        let handle = tokio::spawn(driver.run(shutdown));
        stop.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
