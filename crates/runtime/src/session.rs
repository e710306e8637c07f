//! Building and driving a combat session.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use combat_core::{Action, ActorId, ActorState, CombatState, OwnerId, Phase, rules};

use crate::api::{DecisionProvider, Result, RuntimeError, SessionHandle};
use crate::events::EventBus;
use crate::oracle::OracleBundle;
use crate::queue::{EventPayload, EventQueue};
use crate::worker::SessionWorker;

/// Tuning for the session plumbing.
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// Broadcast capacity per event topic.
    pub event_buffer_size: usize,
    /// Command channel depth between handles and the worker.
    pub command_buffer_size: usize,
    /// Age past which an unclaimed queue event is dropped.
    pub staleness: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 100,
            command_buffer_size: 32,
            staleness: EventQueue::DEFAULT_STALENESS,
        }
    }
}

/// What one [`CombatSession::step`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    /// The active actor was driven through one decision.
    Acted { actor: ActorId },
    /// The fight is over.
    Finished { winner: Option<OwnerId> },
}

/// Staged configuration for a [`CombatSession`].
pub struct SessionBuilder {
    config: SessionConfig,
    seed: Option<u64>,
    oracles: Option<OracleBundle>,
    actors: Vec<ActorState>,
    provider: Option<Box<dyn DecisionProvider>>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            seed: None,
            oracles: None,
            actors: Vec::new(),
            provider: None,
        }
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Fixes the game seed. Without one the seed is drawn at build time.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn oracles(mut self, oracles: OracleBundle) -> Self {
        self.oracles = Some(oracles);
        self
    }

    pub fn actor(mut self, actor: ActorState) -> Self {
        self.actors.push(actor);
        self
    }

    pub fn actors(mut self, actors: impl IntoIterator<Item = ActorState>) -> Self {
        self.actors.extend(actors);
        self
    }

    pub fn provider(mut self, provider: impl DecisionProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    /// Stages the roster, spawns the worker, and seeds the lifecycle.
    ///
    /// The queue starts with `GameInit` already enqueued; the first drain
    /// chains it through to the first open turn.
    pub async fn build(self) -> Result<CombatSession> {
        let oracles = self.oracles.ok_or(RuntimeError::MissingOracles)?;
        let seed = self.seed.unwrap_or_else(rand::random);

        let mut state = CombatState::new(seed);
        for actor in self.actors {
            state.add_actor(actor)?;
        }

        let event_bus = EventBus::new(self.config.event_buffer_size);
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size);

        let mut queue = EventQueue::with_staleness(self.config.staleness);
        queue.enqueue(EventPayload::Phase(Phase::GameInit));

        let worker = SessionWorker::new(state, oracles, queue, command_rx, event_bus.clone());
        let worker_task = tokio::spawn(worker.run());

        info!(seed, "combat session built");
        Ok(CombatSession {
            handle: SessionHandle::new(command_tx, event_bus),
            provider: self.provider,
            worker_task,
        })
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running combat: the worker task, a handle to it, and the step loop
/// that drives decisions through a [`DecisionProvider`].
pub struct CombatSession {
    handle: SessionHandle,
    provider: Option<Box<dyn DecisionProvider>>,
    worker_task: JoinHandle<()>,
}

impl CombatSession {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Handle for submitting events and subscribing from elsewhere.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn set_provider(&mut self, provider: impl DecisionProvider + 'static) {
        self.provider = Some(Box::new(provider));
    }

    /// Drives one decision: settle pending work, ask the provider for the
    /// active actor's action, submit it, and settle the follow-ups.
    ///
    /// A rejected action falls back to standby so a misbehaving provider
    /// cannot wedge the turn.
    pub async fn step(&mut self) -> Result<StepStatus> {
        self.handle.drain().await?;

        let state = self.handle.state().await?;
        if rules::is_game_over(&state) {
            return Ok(StepStatus::Finished {
                winner: rules::winner(&state),
            });
        }
        let Some(actor) = state.active_actor() else {
            return Err(RuntimeError::NoActiveTurn);
        };

        let provider = self.provider.as_ref().ok_or(RuntimeError::ProviderNotSet)?;
        let action = provider.provide_action(actor, &state).await?;
        let was_standby = matches!(action, Action::Standby(_));

        self.handle.submit_action(action).await?;
        let report = self.handle.drain().await?;
        if report.rejected > 0 && !was_standby {
            debug!(%actor, "provided action rejected, standing by instead");
            self.handle.submit_action(Action::standby(actor)).await?;
            self.handle.drain().await?;
        }
        Ok(StepStatus::Acted { actor })
    }

    /// Steps until the fight resolves; returns the winning side.
    pub async fn run(&mut self) -> Result<Option<OwnerId>> {
        loop {
            if let StepStatus::Finished { winner } = self.step().await? {
                return Ok(winner);
            }
        }
    }

    /// Stops the worker and waits for it to wind down.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.worker_task.await.map_err(RuntimeError::WorkerJoin)
    }
}
