//! Cloneable handle for talking to a running session worker.

use tokio::sync::{broadcast, mpsc, oneshot};

use combat_core::{Action, ActionResult, CombatState, Phase, compute_state_digest};

use crate::api::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::worker::Command;

/// What one claimed queue event came to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// The event passed validation; the state advanced.
    Executed(ActionResult),
    /// The event was rejected; the state is unchanged.
    Rejected,
}

/// Tally of one drain pass over the queue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub executed: u32,
    pub rejected: u32,
}

impl DrainReport {
    pub fn total(&self) -> u32 {
        self.executed + self.rejected
    }
}

/// Client-side handle to the session worker.
///
/// Cheap to clone; every clone talks to the same worker and bus. The handle
/// stays usable until the worker shuts down, after which every command
/// returns [`RuntimeError::CommandChannelClosed`].
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl SessionHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Queues an action for resolution.
    ///
    /// Returns once the worker accepted the action into its queue, not once
    /// it resolved; follow with [`Self::drain`] or watch the combat topic
    /// for the outcome.
    pub async fn submit_action(&self, action: Action) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::SubmitAction { action, reply }).await?;
        rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Queues a lifecycle phase directly. Normal play never needs this; the
    /// worker chains phases on its own.
    pub async fn enqueue_phase(&self, phase: Phase) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::EnqueuePhase { phase, reply }).await?;
        rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Claims and resolves the next queued event, if any.
    pub async fn step(&self) -> Result<Option<StepResult>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Step { reply }).await?;
        rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Resolves queued events until the queue runs dry, follow-ups included.
    pub async fn drain(&self) -> Result<DrainReport> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Drain { reply }).await?;
        rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Snapshot of the current authoritative state.
    pub async fn state(&self) -> Result<CombatState> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::QueryState { reply }).await?;
        rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Hex digest of the current authoritative state.
    pub async fn digest(&self) -> Result<String> {
        let state = self.state().await?;
        Ok(hex::encode(compute_state_digest(&state)))
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
